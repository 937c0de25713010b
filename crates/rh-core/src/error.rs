//! Error types for ratehist

use thiserror::Error;

/// ratehist error type
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid name, identifier, mode or schema
    #[error("Validation error: {0}")]
    Validation(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
