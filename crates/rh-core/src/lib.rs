//! # rh-core
//!
//! Core types shared by every ratehist crate.
//!
//! - [`schema`]: the fixed, ordered column declaration applied before reading data
//! - [`types`]: rating records, histogram rows, table identifiers and save modes
//! - [`error`]: the common error type

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod schema;
pub mod types;

pub use error::{Error, Result};
pub use schema::{ColumnDef, ColumnType, TableSchema};
pub use types::{RatingCount, RatingRecord, SaveMode, TableIdent};
