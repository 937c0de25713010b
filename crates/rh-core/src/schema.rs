//! Column schema declared upfront, before any data is read.
//!
//! The schema is never inferred from the input and never evolves: loaders
//! coerce every field to the declared type (or treat it as malformed).

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Name of the user identifier column.
pub const USER_ID: &str = "userid";
/// Name of the movie identifier column.
pub const MOVIE_ID: &str = "movieid";
/// Name of the rating column.
pub const RATING: &str = "rating";
/// Name of the timestamp column (seconds since the Unix epoch).
pub const EPOCH_TIME_SECONDS: &str = "epoch_time_seconds";

/// Logical column type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    /// 32-bit signed integer
    Int32,
    /// 64-bit signed integer
    Int64,
    /// 32-bit float
    Float32,
    /// 64-bit float
    Float64,
    /// UTF-8 string
    Utf8,
}

impl ColumnType {
    /// `true` for the integer and float types.
    pub fn is_numeric(self) -> bool {
        !matches!(self, ColumnType::Utf8)
    }

    /// `true` for the integer types.
    pub fn is_integer(self) -> bool {
        matches!(self, ColumnType::Int32 | ColumnType::Int64)
    }

    /// Short lowercase name, as used in JSON output.
    pub fn as_str(self) -> &'static str {
        match self {
            ColumnType::Int32 => "int32",
            ColumnType::Int64 => "int64",
            ColumnType::Float32 => "float32",
            ColumnType::Float64 => "float64",
            ColumnType::Utf8 => "utf8",
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One named, typed column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDef {
    /// Column name
    pub name: String,
    /// Column type
    #[serde(rename = "type")]
    pub ty: ColumnType,
    /// Whether nulls are allowed
    pub nullable: bool,
}

impl ColumnDef {
    /// Create a column definition.
    pub fn new(name: impl Into<String>, ty: ColumnType, nullable: bool) -> Self {
        Self { name: name.into(), ty, nullable }
    }
}

/// Fixed, ordered list of columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSchema {
    columns: Vec<ColumnDef>,
}

impl TableSchema {
    /// Build a schema, rejecting empty column lists and duplicate names.
    pub fn new(columns: Vec<ColumnDef>) -> Result<Self> {
        if columns.is_empty() {
            return Err(Error::Validation("schema must declare at least one column".into()));
        }
        let mut seen = HashSet::new();
        for c in &columns {
            if c.name.is_empty() {
                return Err(Error::Validation("column name must not be empty".into()));
            }
            if !seen.insert(c.name.as_str()) {
                return Err(Error::Validation(format!("duplicate column name: {}", c.name)));
            }
        }
        Ok(Self { columns })
    }

    /// The movie ratings schema: `userid`, `movieid`, `rating`, `epoch_time_seconds`.
    pub fn ratings() -> Self {
        Self {
            columns: vec![
                ColumnDef::new(USER_ID, ColumnType::Int32, true),
                ColumnDef::new(MOVIE_ID, ColumnType::Int32, true),
                ColumnDef::new(RATING, ColumnType::Float32, true),
                ColumnDef::new(EPOCH_TIME_SECONDS, ColumnType::Int64, true),
            ],
        }
    }

    /// Columns in declaration order.
    pub fn columns(&self) -> &[ColumnDef] {
        &self.columns
    }

    /// Number of columns.
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Always `false`: construction rejects empty schemas.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Position of a column by name.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    /// Column definition by name.
    pub fn column(&self, name: &str) -> Option<&ColumnDef> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Column names in order.
    pub fn names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ratings_schema_order() {
        let s = TableSchema::ratings();
        assert_eq!(s.names(), vec!["userid", "movieid", "rating", "epoch_time_seconds"]);
        assert_eq!(s.column("rating").unwrap().ty, ColumnType::Float32);
        assert_eq!(s.column("epoch_time_seconds").unwrap().ty, ColumnType::Int64);
        assert!(s.columns().iter().all(|c| c.nullable));
    }

    #[test]
    fn rejects_duplicates_and_empty() {
        assert!(TableSchema::new(vec![]).is_err());
        let dup = vec![
            ColumnDef::new("a", ColumnType::Int32, true),
            ColumnDef::new("a", ColumnType::Int64, true),
        ];
        assert!(TableSchema::new(dup).is_err());
    }

    #[test]
    fn index_lookup() {
        let s = TableSchema::ratings();
        assert_eq!(s.index_of("movieid"), Some(1));
        assert_eq!(s.index_of("missing"), None);
    }

    #[test]
    fn json_shape() {
        let s = TableSchema::ratings();
        let v = serde_json::to_value(&s).unwrap();
        assert_eq!(v["columns"][2]["type"], "float32");
        assert_eq!(v["columns"][2]["name"], "rating");
    }
}
