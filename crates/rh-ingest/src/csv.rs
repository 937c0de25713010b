//! Delimited text → Arrow RecordBatches under a declared schema.
//!
//! Column names and types always come from the [`TableSchema`]; the header row
//! (when present) is only checked, never used for inference. Fields that do not
//! conform to their column type, including fields that are not valid UTF-8, are
//! handled according to [`ParseMode`].

use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use arrow::array::{
    ArrayRef, Float32Builder, Float64Builder, Int32Builder, Int64Builder, StringBuilder,
};
use arrow::datatypes::SchemaRef;
use arrow::record_batch::RecordBatch;
use csv::{ByteRecord, ReaderBuilder};
use rh_core::{ColumnType, TableSchema};
use serde::{Deserialize, Serialize};

use crate::schema::to_arrow_schema;
use crate::{IngestError, Result};

/// How non-conforming rows are handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParseMode {
    /// Unparsable fields become null; short rows are padded with nulls and
    /// extra fields are ignored.
    #[default]
    Permissive,
    /// Rows with any unparsable field or a wrong field count are skipped.
    DropMalformed,
    /// The first malformed row aborts the load.
    FailFast,
}

impl ParseMode {
    /// Canonical lowercase name.
    pub fn as_str(self) -> &'static str {
        match self {
            ParseMode::Permissive => "permissive",
            ParseMode::DropMalformed => "drop_malformed",
            ParseMode::FailFast => "fail_fast",
        }
    }
}

impl FromStr for ParseMode {
    type Err = rh_core::Error;

    fn from_str(s: &str) -> rh_core::Result<Self> {
        match s.to_ascii_lowercase().replace(['_', '-'], "").as_str() {
            "permissive" => Ok(ParseMode::Permissive),
            "dropmalformed" => Ok(ParseMode::DropMalformed),
            "failfast" => Ok(ParseMode::FailFast),
            other => Err(rh_core::Error::Validation(format!(
                "unknown parse mode '{other}': expected permissive, drop_malformed or fail_fast"
            ))),
        }
    }
}

impl fmt::Display for ParseMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Options for reading a delimited text file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CsvReadOptions {
    /// First row is a header.
    pub has_header: bool,
    /// Field separator (ASCII).
    pub delimiter: char,
    /// Malformed-row policy.
    pub mode: ParseMode,
    /// Maximum rows per emitted batch.
    pub batch_size: usize,
    /// Field text that is read as null.
    pub null_value: String,
}

impl Default for CsvReadOptions {
    fn default() -> Self {
        Self {
            has_header: true,
            delimiter: ',',
            mode: ParseMode::Permissive,
            batch_size: 8192,
            null_value: String::new(),
        }
    }
}

/// Counters collected while loading.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadStats {
    /// Rows emitted into batches.
    pub rows_read: u64,
    /// Rows skipped as malformed.
    pub rows_dropped: u64,
    /// Fields replaced by null in permissive mode.
    pub malformed_fields: u64,
}

/// A fully loaded table.
#[derive(Debug, Clone)]
pub struct LoadedTable {
    /// Declared schema
    pub schema: TableSchema,
    /// Arrow form of the declared schema
    pub arrow_schema: SchemaRef,
    /// Loaded data
    pub batches: Vec<RecordBatch>,
    /// Load counters
    pub stats: LoadStats,
}

impl LoadedTable {
    /// Total number of rows across batches.
    pub fn num_rows(&self) -> usize {
        self.batches.iter().map(|b| b.num_rows()).sum()
    }
}

#[derive(Debug, Clone, Copy)]
enum Cell {
    Null,
    Int32(i32),
    Int64(i64),
    Float32(f32),
    Float64(f64),
    Utf8,
}

fn parse_cell(raw: &str, ty: ColumnType) -> Option<Cell> {
    let s = raw.trim();
    match ty {
        ColumnType::Int32 => s.parse().ok().map(Cell::Int32),
        ColumnType::Int64 => s.parse().ok().map(Cell::Int64),
        ColumnType::Float32 => s.parse().ok().map(Cell::Float32),
        ColumnType::Float64 => s.parse().ok().map(Cell::Float64),
        ColumnType::Utf8 => Some(Cell::Utf8),
    }
}

enum ColumnBuilder {
    Int32(Int32Builder),
    Int64(Int64Builder),
    Float32(Float32Builder),
    Float64(Float64Builder),
    Utf8(StringBuilder),
}

impl ColumnBuilder {
    fn new(ty: ColumnType, capacity: usize) -> Self {
        match ty {
            ColumnType::Int32 => Self::Int32(Int32Builder::with_capacity(capacity)),
            ColumnType::Int64 => Self::Int64(Int64Builder::with_capacity(capacity)),
            ColumnType::Float32 => Self::Float32(Float32Builder::with_capacity(capacity)),
            ColumnType::Float64 => Self::Float64(Float64Builder::with_capacity(capacity)),
            ColumnType::Utf8 => Self::Utf8(StringBuilder::with_capacity(capacity, capacity * 8)),
        }
    }

    fn append(&mut self, cell: Cell, raw: Option<&[u8]>) {
        match (self, cell) {
            (Self::Int32(b), Cell::Int32(v)) => b.append_value(v),
            (Self::Int64(b), Cell::Int64(v)) => b.append_value(v),
            (Self::Float32(b), Cell::Float32(v)) => b.append_value(v),
            (Self::Float64(b), Cell::Float64(v)) => b.append_value(v),
            // Utf8 cells are only produced for fields that decoded.
            (Self::Utf8(b), Cell::Utf8) => {
                b.append_value(raw.and_then(|r| std::str::from_utf8(r).ok()).unwrap_or_default())
            }
            (b, _) => b.append_null(),
        }
    }

    fn append_null(&mut self) {
        match self {
            Self::Int32(b) => b.append_null(),
            Self::Int64(b) => b.append_null(),
            Self::Float32(b) => b.append_null(),
            Self::Float64(b) => b.append_null(),
            Self::Utf8(b) => b.append_null(),
        }
    }

    fn finish(&mut self) -> ArrayRef {
        match self {
            Self::Int32(b) => Arc::new(b.finish()),
            Self::Int64(b) => Arc::new(b.finish()),
            Self::Float32(b) => Arc::new(b.finish()),
            Self::Float64(b) => Arc::new(b.finish()),
            Self::Utf8(b) => Arc::new(b.finish()),
        }
    }
}

/// Streaming reader yielding batches of at most `batch_size` rows.
pub struct CsvBatchReader<R: Read> {
    reader: csv::Reader<R>,
    schema: TableSchema,
    arrow_schema: SchemaRef,
    options: CsvReadOptions,
    record: ByteRecord,
    cells: Vec<Cell>,
    stats: LoadStats,
    done: bool,
}

impl CsvBatchReader<File> {
    /// Open a file for reading.
    pub fn from_path(path: &Path, schema: TableSchema, options: CsvReadOptions) -> Result<Self> {
        let file = File::open(path)
            .map_err(|source| IngestError::Open { path: path.to_path_buf(), source })?;
        tracing::debug!(path = %path.display(), "opened CSV input");
        Self::from_reader(file, schema, options)
    }
}

impl<R: Read> CsvBatchReader<R> {
    /// Wrap any reader.
    pub fn from_reader(rdr: R, schema: TableSchema, options: CsvReadOptions) -> Result<Self> {
        if !options.delimiter.is_ascii() {
            return Err(rh_core::Error::Validation(format!(
                "delimiter must be a single ASCII character, got {:?}",
                options.delimiter
            ))
            .into());
        }
        if options.batch_size == 0 {
            return Err(rh_core::Error::Validation("batch_size must be positive".into()).into());
        }

        let mut reader = ReaderBuilder::new()
            .delimiter(options.delimiter as u8)
            .has_headers(options.has_header)
            .flexible(true)
            .from_reader(rdr);

        if options.has_header {
            let headers = reader.byte_headers()?;
            let found: Vec<String> =
                headers.iter().map(|h| String::from_utf8_lossy(h).trim().to_string()).collect();
            let expected = schema.names();
            if found.len() != expected.len() {
                tracing::warn!(
                    expected = expected.len(),
                    found = found.len(),
                    "CSV header field count differs from the declared schema"
                );
            } else if found != expected {
                tracing::debug!(?found, ?expected, "CSV header names ignored; using declared names");
            }
        }

        let arrow_schema = to_arrow_schema(&schema);
        let n_cols = schema.len();
        Ok(Self {
            reader,
            schema,
            arrow_schema,
            options,
            record: ByteRecord::new(),
            cells: Vec::with_capacity(n_cols),
            stats: LoadStats::default(),
            done: false,
        })
    }

    /// Arrow schema of the emitted batches.
    pub fn arrow_schema(&self) -> SchemaRef {
        self.arrow_schema.clone()
    }

    /// Counters so far.
    pub fn stats(&self) -> &LoadStats {
        &self.stats
    }

    fn next_batch(&mut self) -> Result<Option<RecordBatch>> {
        let capacity = self.options.batch_size;
        let mut builders: Vec<ColumnBuilder> =
            self.schema.columns().iter().map(|c| ColumnBuilder::new(c.ty, capacity)).collect();

        let mut rows = 0usize;
        while rows < capacity {
            if !self.reader.read_byte_record(&mut self.record)? {
                break;
            }
            let line = self.record.position().map(|p| p.line()).unwrap_or(0);
            if !self.parse_row(line)? {
                continue;
            }
            for (i, (b, cell)) in builders.iter_mut().zip(&self.cells).enumerate() {
                b.append(*cell, self.record.get(i));
            }
            rows += 1;
        }

        if rows == 0 {
            return Ok(None);
        }

        self.stats.rows_read += rows as u64;
        let arrays: Vec<ArrayRef> = builders.iter_mut().map(ColumnBuilder::finish).collect();
        let batch = RecordBatch::try_new(self.arrow_schema.clone(), arrays)?;
        tracing::debug!(rows, total = self.stats.rows_read, "CSV batch");
        Ok(Some(batch))
    }

    /// Parse the current record into `self.cells`. `Ok(false)` means the row is dropped.
    fn parse_row(&mut self, line: u64) -> Result<bool> {
        let mode = self.options.mode;
        let expected = self.schema.len();
        let actual = self.record.len();

        if actual != expected {
            match mode {
                ParseMode::FailFast => {
                    return Err(IngestError::FieldCount { line, expected, actual });
                }
                ParseMode::DropMalformed => {
                    self.stats.rows_dropped += 1;
                    tracing::warn!(line, expected, actual, "dropping row with wrong field count");
                    return Ok(false);
                }
                ParseMode::Permissive => {
                    if actual < expected {
                        self.stats.malformed_fields += (expected - actual) as u64;
                    }
                }
            }
        }

        self.cells.clear();
        for (i, col) in self.schema.columns().iter().enumerate() {
            let cell = match self.record.get(i) {
                None => Cell::Null,
                Some(raw) if raw == self.options.null_value.as_bytes() => Cell::Null,
                Some(raw) => match std::str::from_utf8(raw).ok().and_then(|s| parse_cell(s, col.ty)) {
                    Some(c) => c,
                    None => match mode {
                        ParseMode::FailFast => {
                            return Err(IngestError::Malformed {
                                line,
                                column: col.name.clone(),
                                expected: col.ty,
                                value: String::from_utf8_lossy(raw).into_owned(),
                            });
                        }
                        ParseMode::DropMalformed => {
                            self.stats.rows_dropped += 1;
                            let value = String::from_utf8_lossy(raw);
                            tracing::warn!(line, column = %col.name, %value, "dropping malformed row");
                            return Ok(false);
                        }
                        ParseMode::Permissive => {
                            self.stats.malformed_fields += 1;
                            Cell::Null
                        }
                    },
                },
            };

            if matches!(cell, Cell::Null) && !col.nullable {
                if mode == ParseMode::FailFast {
                    return Err(IngestError::NullViolation { line, column: col.name.clone() });
                }
                self.stats.rows_dropped += 1;
                tracing::warn!(line, column = %col.name, "dropping row with null in non-nullable column");
                return Ok(false);
            }
            self.cells.push(cell);
        }
        Ok(true)
    }
}

impl<R: Read> Iterator for CsvBatchReader<R> {
    type Item = Result<RecordBatch>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.next_batch() {
            Ok(Some(batch)) => Some(Ok(batch)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

/// Load a whole file under the declared schema.
pub fn read_csv(path: &Path, schema: &TableSchema, options: &CsvReadOptions) -> Result<LoadedTable> {
    let reader = CsvBatchReader::from_path(path, schema.clone(), options.clone())?;
    let table = collect(reader)?;
    tracing::info!(
        path = %path.display(),
        rows = table.stats.rows_read,
        dropped = table.stats.rows_dropped,
        malformed_fields = table.stats.malformed_fields,
        "loaded CSV"
    );
    Ok(table)
}

/// Load CSV text held in memory.
pub fn read_csv_bytes(
    data: &[u8],
    schema: &TableSchema,
    options: &CsvReadOptions,
) -> Result<LoadedTable> {
    let reader = CsvBatchReader::from_reader(data, schema.clone(), options.clone())?;
    collect(reader)
}

fn collect<R: Read>(mut reader: CsvBatchReader<R>) -> Result<LoadedTable> {
    let mut batches = Vec::new();
    for batch in reader.by_ref() {
        batches.push(batch?);
    }
    Ok(LoadedTable {
        schema: reader.schema.clone(),
        arrow_schema: reader.arrow_schema(),
        batches,
        stats: reader.stats().clone(),
    })
}
