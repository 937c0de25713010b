//! Named Parquet tables under a warehouse directory.
//!
//! Layout:
//!
//! ```text
//! <warehouse>/
//!   <database>.db/
//!     <table>/
//!       part-00000.parquet
//!       part-00001.parquet   (appends)
//! ```
//!
//! Overwrites are staged: the new table is fully written into a sibling
//! directory first and only then swapped in, so a failed write leaves the
//! previous table readable.

use std::fs;
use std::path::{Path, PathBuf};

use arrow::datatypes::SchemaRef;
use arrow::record_batch::RecordBatch;
use rh_core::{SaveMode, TableIdent};
use serde::Serialize;

use crate::parquet::{read_parquet_batches, read_parquet_schema, write_parquet_with_schema};
use crate::schema::same_columns;
use crate::{IngestError, Result};

const PART_PREFIX: &str = "part-";
const PART_SUFFIX: &str = ".parquet";

/// What a save did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SaveAction {
    Created,
    Replaced,
    Appended,
    Skipped,
}

/// Result of [`Catalog::save_as_table`].
#[derive(Debug, Clone, Serialize)]
pub struct SaveOutcome {
    pub table: TableIdent,
    pub path: PathBuf,
    pub rows_written: usize,
    pub action: SaveAction,
}

/// Directory-backed table catalog.
#[derive(Debug, Clone)]
pub struct Catalog {
    root: PathBuf,
}

impl Catalog {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn database_path(&self, database: &str) -> PathBuf {
        self.root.join(format!("{database}.db"))
    }

    pub fn table_path(&self, ident: &TableIdent) -> PathBuf {
        self.database_path(ident.database()).join(ident.table())
    }

    pub fn table_exists(&self, ident: &TableIdent) -> bool {
        self.table_path(ident).is_dir()
    }

    /// Tables of a database, sorted by name. A missing database has no tables.
    pub fn list_tables(&self, database: &str) -> Result<Vec<TableIdent>> {
        let db_path = self.database_path(database);
        if !db_path.is_dir() {
            return Ok(vec![]);
        }
        let mut tables = Vec::new();
        for entry in fs::read_dir(&db_path)? {
            let entry = entry?;
            let name = entry.file_name();
            let Some(name) = name.to_str() else { continue };
            // Staging directories start with a dot.
            if name.starts_with('.') || !entry.file_type()?.is_dir() {
                continue;
            }
            if let Ok(ident) = TableIdent::new(database, name) {
                tables.push(ident);
            }
        }
        tables.sort_by(|a, b| a.table().cmp(b.table()));
        Ok(tables)
    }

    /// Persist `batches` as the table `ident`, applying `mode` if it already exists.
    pub fn save_as_table(
        &self,
        ident: &TableIdent,
        schema: &SchemaRef,
        batches: &[RecordBatch],
        mode: SaveMode,
    ) -> Result<SaveOutcome> {
        let path = self.table_path(ident);
        let exists = path.is_dir();
        tracing::info!(table = %ident, path = %path.display(), %mode, exists, "saving table");

        let outcome = |rows_written, action| SaveOutcome {
            table: ident.clone(),
            path: path.clone(),
            rows_written,
            action,
        };

        if !exists {
            let rows = self.write_staged(ident, schema, batches)?;
            return Ok(outcome(rows, SaveAction::Created));
        }

        match mode {
            SaveMode::ErrorIfExists => Err(IngestError::TableExists(ident.clone())),
            SaveMode::Ignore => {
                tracing::info!(table = %ident, "table exists; skipping write");
                Ok(outcome(0, SaveAction::Skipped))
            }
            SaveMode::Overwrite => {
                let rows = self.write_staged(ident, schema, batches)?;
                Ok(outcome(rows, SaveAction::Replaced))
            }
            SaveMode::Append => {
                let parts = part_files(&path)?;
                if let Some(first) = parts.first() {
                    let existing = read_parquet_schema(first)?;
                    if !same_columns(&existing, schema) {
                        return Err(IngestError::SchemaMismatch(format!(
                            "cannot append to {ident}: existing columns {:?}, new columns {:?}",
                            existing.fields().iter().map(|f| f.name()).collect::<Vec<_>>(),
                            schema.fields().iter().map(|f| f.name()).collect::<Vec<_>>(),
                        )));
                    }
                }
                let next = next_part_index(&parts);
                let rows = write_parquet_with_schema(&path.join(part_name(next)), schema, batches)?;
                Ok(outcome(rows, SaveAction::Appended))
            }
        }
    }

    /// Read every part file of a table, in part order.
    pub fn read_table(&self, ident: &TableIdent) -> Result<Vec<RecordBatch>> {
        let path = self.table_path(ident);
        if !path.is_dir() {
            return Err(IngestError::TableNotFound(ident.clone()));
        }
        let mut batches = Vec::new();
        for part in part_files(&path)? {
            batches.extend(read_parquet_batches(&part)?);
        }
        Ok(batches)
    }

    /// Remove a table. Returns `false` when it did not exist.
    pub fn drop_table(&self, ident: &TableIdent) -> Result<bool> {
        let path = self.table_path(ident);
        if !path.is_dir() {
            return Ok(false);
        }
        fs::remove_dir_all(&path)?;
        tracing::info!(table = %ident, "dropped table");
        Ok(true)
    }

    /// Write into `.<table>.staging`, then swap it into place.
    fn write_staged(
        &self,
        ident: &TableIdent,
        schema: &SchemaRef,
        batches: &[RecordBatch],
    ) -> Result<usize> {
        let db_path = self.database_path(ident.database());
        fs::create_dir_all(&db_path)?;

        let staging = db_path.join(format!(".{}.staging", ident.table()));
        if staging.exists() {
            fs::remove_dir_all(&staging)?;
        }
        fs::create_dir_all(&staging)?;

        let rows = match write_parquet_with_schema(&staging.join(part_name(0)), schema, batches) {
            Ok(rows) => rows,
            Err(e) => {
                let _ = fs::remove_dir_all(&staging);
                return Err(e);
            }
        };

        let target = db_path.join(ident.table());
        if target.exists() {
            let old = db_path.join(format!(".{}.old", ident.table()));
            if old.exists() {
                fs::remove_dir_all(&old)?;
            }
            fs::rename(&target, &old)?;
            fs::rename(&staging, &target)?;
            fs::remove_dir_all(&old)?;
        } else {
            fs::rename(&staging, &target)?;
        }

        tracing::info!(table = %ident, rows, "table written");
        Ok(rows)
    }
}

fn part_name(index: usize) -> String {
    format!("{PART_PREFIX}{index:05}{PART_SUFFIX}")
}

fn part_index(path: &Path) -> Option<usize> {
    let name = path.file_name()?.to_str()?;
    name.strip_prefix(PART_PREFIX)?.strip_suffix(PART_SUFFIX)?.parse().ok()
}

/// Part files of a table directory, sorted by part index.
fn part_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut parts: Vec<(usize, PathBuf)> = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if let Some(idx) = part_index(&path) {
            parts.push((idx, path));
        }
    }
    parts.sort_by_key(|(idx, _)| *idx);
    Ok(parts.into_iter().map(|(_, p)| p).collect())
}

fn next_part_index(parts: &[PathBuf]) -> usize {
    parts.iter().filter_map(|p| part_index(p)).max().map_or(0, |m| m + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn part_names_round_trip() {
        assert_eq!(part_name(3), "part-00003.parquet");
        assert_eq!(part_index(Path::new("/w/db.db/t/part-00003.parquet")), Some(3));
        assert_eq!(part_index(Path::new("/w/db.db/t/_SUCCESS")), None);
    }

    #[test]
    fn next_index_after_gap() {
        let parts = vec![PathBuf::from("part-00000.parquet"), PathBuf::from("part-00004.parquet")];
        assert_eq!(next_part_index(&parts), 5);
        assert_eq!(next_part_index(&[]), 0);
    }

    #[test]
    fn paths_follow_database_layout() {
        let c = Catalog::new("/warehouse");
        let t: TableIdent = "sundogdata.movielens_ratings".parse().unwrap();
        assert_eq!(c.table_path(&t), PathBuf::from("/warehouse/sundogdata.db/movielens_ratings"));
    }
}
