//! Error type for the Arrow bridge.

use std::path::PathBuf;

use rh_core::{ColumnType, TableIdent};

/// Error type for loading, persisting and aggregating tables.
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("failed to open {}: {source}", path.display())]
    Open { path: PathBuf, source: std::io::Error },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] ::csv::Error),

    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("Parquet read/write error: {0}")]
    Parquet(#[from] ::parquet::errors::ParquetError),

    #[error("line {line}: malformed value {value:?} for column '{column}' (expected {expected})")]
    Malformed { line: u64, column: String, expected: ColumnType, value: String },

    #[error("line {line}: null value in non-nullable column '{column}'")]
    NullViolation { line: u64, column: String },

    #[error("line {line}: expected {expected} fields, got {actual}")]
    FieldCount { line: u64, expected: usize, actual: usize },

    #[error("missing required column: {0}")]
    MissingColumn(String),

    #[error("column '{col}' has wrong type: expected {expected}, got {actual}")]
    WrongType { col: String, expected: String, actual: String },

    #[error("schema mismatch: {0}")]
    SchemaMismatch(String),

    #[error("table already exists: {0}")]
    TableExists(TableIdent),

    #[error("table not found: {0}")]
    TableNotFound(TableIdent),

    #[error(transparent)]
    Core(#[from] rh_core::Error),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, IngestError>;
