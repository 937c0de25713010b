//! Common data types for ratehist

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// One row of the ratings dataset. Fields are `None` where the input was null
/// or did not conform to the declared column type.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RatingRecord {
    /// User identifier
    pub user_id: Option<i32>,
    /// Movie identifier
    pub movie_id: Option<i32>,
    /// Rating in half-star steps, 0.5 to 5.0
    pub rating: Option<f32>,
    /// Seconds since the Unix epoch
    pub epoch_time_seconds: Option<i64>,
}

/// Aggregated histogram row: number of records per distinct rating.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RatingCount {
    /// Rating value; `None` is the group of records with a null rating.
    pub rating: Option<f32>,
    /// Number of records
    pub count: u64,
}

impl RatingCount {
    /// Create a histogram row.
    pub fn new(rating: Option<f32>, count: u64) -> Self {
        Self { rating, count }
    }
}

/// Two-part table identifier, `database.table`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TableIdent {
    database: String,
    table: String,
}

impl TableIdent {
    /// Build from separate parts. Names are stored lowercased.
    pub fn new(database: &str, table: &str) -> Result<Self> {
        validate_part(database, "database")?;
        validate_part(table, "table")?;
        Ok(Self { database: database.to_ascii_lowercase(), table: table.to_ascii_lowercase() })
    }

    /// Database (schema) part.
    pub fn database(&self) -> &str {
        &self.database
    }

    /// Table part.
    pub fn table(&self) -> &str {
        &self.table
    }
}

fn validate_part(part: &str, what: &str) -> Result<()> {
    if part.is_empty() {
        return Err(Error::Validation(format!("{what} name must not be empty")));
    }
    if !part.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(Error::Validation(format!(
            "invalid {what} name '{part}': only [A-Za-z0-9_] allowed"
        )));
    }
    Ok(())
}

impl FromStr for TableIdent {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let parts: Vec<&str> = s.split('.').collect();
        match parts.as_slice() {
            [db, table] => Self::new(db, table),
            _ => Err(Error::Validation(format!(
                "invalid table identifier '{s}': expected 'database.table'"
            ))),
        }
    }
}

impl TryFrom<String> for TableIdent {
    type Error = Error;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl From<TableIdent> for String {
    fn from(t: TableIdent) -> Self {
        t.to_string()
    }
}

impl fmt::Display for TableIdent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.database, self.table)
    }
}

/// What to do when saving to a table that already exists.
///
/// Config files accept the same spellings as the command line (`error`,
/// `errorifexists`, `error_if_exists`, `error-if-exists`, any case).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum SaveMode {
    /// Replace the existing table.
    Overwrite,
    /// Add the new rows to the existing table.
    Append,
    /// Fail if the table exists.
    #[default]
    ErrorIfExists,
    /// Leave the existing table untouched and skip the write.
    Ignore,
}

impl SaveMode {
    /// Canonical lowercase name.
    pub fn as_str(self) -> &'static str {
        match self {
            SaveMode::Overwrite => "overwrite",
            SaveMode::Append => "append",
            SaveMode::ErrorIfExists => "error_if_exists",
            SaveMode::Ignore => "ignore",
        }
    }
}

impl FromStr for SaveMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().replace(['_', '-'], "").as_str() {
            "overwrite" => Ok(SaveMode::Overwrite),
            "append" => Ok(SaveMode::Append),
            "error" | "errorifexists" => Ok(SaveMode::ErrorIfExists),
            "ignore" => Ok(SaveMode::Ignore),
            other => Err(Error::Validation(format!(
                "unknown save mode '{other}': expected overwrite, append, error or ignore"
            ))),
        }
    }
}

impl TryFrom<String> for SaveMode {
    type Error = Error;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl From<SaveMode> for String {
    fn from(m: SaveMode) -> Self {
        m.as_str().to_string()
    }
}

impl fmt::Display for SaveMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
