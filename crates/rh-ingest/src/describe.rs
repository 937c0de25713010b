//! Per-column summary statistics: `count`, `mean`, `stddev`, `min`, `max`.
//!
//! One streaming pass over the batches. Mean and variance use Welford's
//! update, so memory is constant per column regardless of input size.
//! `stddev` is the sample standard deviation (`n - 1` denominator).

use std::sync::Arc;

use arrow::array::{Array, ArrayRef, AsArray, StringBuilder};
use arrow::datatypes::{DataType, Field, Float32Type, Float64Type, Int32Type, Int64Type, Schema};
use arrow::record_batch::RecordBatch;
use rh_core::{ColumnType, TableSchema};
use serde::Serialize;

use crate::preview::format_table;
use crate::{IngestError, Result};

/// Row labels of the describe table, in order.
pub const SUMMARY_ROWS: [&str; 5] = ["count", "mean", "stddev", "min", "max"];

/// A min/max value in the column's own domain.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SummaryValue {
    Int(i64),
    Float(f64),
    Text(String),
}

/// Statistics for one column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnSummary {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: ColumnType,
    /// Non-null values.
    pub count: u64,
    pub mean: Option<f64>,
    pub stddev: Option<f64>,
    pub min: Option<SummaryValue>,
    pub max: Option<SummaryValue>,
}

impl ColumnSummary {
    /// Display form of a min/max value. Float32 columns print at f32 precision.
    pub fn format_value(&self, v: &SummaryValue) -> String {
        match v {
            SummaryValue::Int(i) => i.to_string(),
            SummaryValue::Float(f) if self.ty == ColumnType::Float32 => {
                format_float((*f as f32).to_string())
            }
            SummaryValue::Float(f) => format_float(f.to_string()),
            SummaryValue::Text(s) => s.clone(),
        }
    }
}

/// Keep a decimal point on integral floats: `5` → `5.0`.
fn format_float(s: String) -> String {
    if s.bytes().all(|b| b.is_ascii_digit() || b == b'-') { s + ".0" } else { s }
}

/// Result of [`describe`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DescribeTable {
    pub columns: Vec<ColumnSummary>,
}

impl DescribeTable {
    pub fn column(&self, name: &str) -> Option<&ColumnSummary> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Tabular form: a `summary` column plus one Utf8 column per described column.
    pub fn to_record_batch(&self) -> Result<RecordBatch> {
        let mut fields = vec![Field::new("summary", DataType::Utf8, false)];
        let mut arrays: Vec<ArrayRef> = Vec::with_capacity(self.columns.len() + 1);

        let mut labels = StringBuilder::new();
        for label in SUMMARY_ROWS {
            labels.append_value(label);
        }
        arrays.push(Arc::new(labels.finish()));

        for col in &self.columns {
            fields.push(Field::new(&col.name, DataType::Utf8, true));
            let mut b = StringBuilder::new();
            b.append_value(col.count.to_string());
            b.append_option(col.mean.map(|m| format_float(m.to_string())));
            b.append_option(col.stddev.map(|s| format_float(s.to_string())));
            b.append_option(col.min.as_ref().map(|v| col.format_value(v)));
            b.append_option(col.max.as_ref().map(|v| col.format_value(v)));
            arrays.push(Arc::new(b.finish()));
        }

        Ok(RecordBatch::try_new(Arc::new(Schema::new(fields)), arrays)?)
    }

    /// ASCII grid, as printed by the pipeline.
    pub fn show(&self) -> Result<String> {
        format_table(&[self.to_record_batch()?])
    }
}

#[derive(Debug, Clone, Default)]
struct Moments {
    count: u64,
    mean: f64,
    m2: f64,
}

impl Moments {
    fn push(&mut self, x: f64) {
        self.count += 1;
        let delta = x - self.mean;
        self.mean += delta / self.count as f64;
        self.m2 += delta * (x - self.mean);
    }

    fn mean(&self) -> Option<f64> {
        (self.count > 0).then_some(self.mean)
    }

    fn stddev(&self) -> Option<f64> {
        (self.count > 1).then(|| (self.m2 / (self.count - 1) as f64).sqrt())
    }
}

enum Accumulator {
    Int { moments: Moments, min: Option<i64>, max: Option<i64> },
    Float { moments: Moments, min: Option<f64>, max: Option<f64> },
    Text { count: u64, min: Option<String>, max: Option<String> },
}

impl Accumulator {
    fn new(ty: ColumnType) -> Self {
        match ty {
            ColumnType::Int32 | ColumnType::Int64 => {
                Self::Int { moments: Moments::default(), min: None, max: None }
            }
            ColumnType::Float32 | ColumnType::Float64 => {
                Self::Float { moments: Moments::default(), min: None, max: None }
            }
            ColumnType::Utf8 => Self::Text { count: 0, min: None, max: None },
        }
    }

    fn push_int(&mut self, v: i64) {
        if let Self::Int { moments, min, max } = self {
            moments.push(v as f64);
            *min = Some(min.map_or(v, |m| m.min(v)));
            *max = Some(max.map_or(v, |m| m.max(v)));
        }
    }

    fn push_float(&mut self, v: f64) {
        if let Self::Float { moments, min, max } = self {
            moments.push(v);
            *min = Some(min.map_or(v, |m| if v.total_cmp(&m).is_lt() { v } else { m }));
            *max = Some(max.map_or(v, |m| if v.total_cmp(&m).is_gt() { v } else { m }));
        }
    }

    fn push_text(&mut self, v: &str) {
        if let Self::Text { count, min, max } = self {
            *count += 1;
            if min.as_deref().is_none_or(|m| v < m) {
                *min = Some(v.to_string());
            }
            if max.as_deref().is_none_or(|m| v > m) {
                *max = Some(v.to_string());
            }
        }
    }

    fn finish(self, name: &str, ty: ColumnType) -> ColumnSummary {
        match self {
            Self::Int { moments, min, max } => ColumnSummary {
                name: name.to_string(),
                ty,
                count: moments.count,
                mean: moments.mean(),
                stddev: moments.stddev(),
                min: min.map(SummaryValue::Int),
                max: max.map(SummaryValue::Int),
            },
            Self::Float { moments, min, max } => ColumnSummary {
                name: name.to_string(),
                ty,
                count: moments.count,
                mean: moments.mean(),
                stddev: moments.stddev(),
                min: min.map(SummaryValue::Float),
                max: max.map(SummaryValue::Float),
            },
            Self::Text { count, min, max } => ColumnSummary {
                name: name.to_string(),
                ty,
                count,
                mean: None,
                stddev: None,
                min: min.map(SummaryValue::Text),
                max: max.map(SummaryValue::Text),
            },
        }
    }
}

/// Compute summary statistics for every column of `schema`.
pub fn describe(batches: &[RecordBatch], schema: &TableSchema) -> Result<DescribeTable> {
    let mut accs: Vec<Accumulator> =
        schema.columns().iter().map(|c| Accumulator::new(c.ty)).collect();

    for batch in batches {
        let batch_schema = batch.schema();
        for (col, acc) in schema.columns().iter().zip(accs.iter_mut()) {
            let idx = batch_schema
                .index_of(&col.name)
                .map_err(|_| IngestError::MissingColumn(col.name.clone()))?;
            let array = batch.column(idx);
            let mismatch = || IngestError::WrongType {
                col: col.name.clone(),
                expected: col.ty.to_string(),
                actual: format!("{:?}", array.data_type()),
            };
            match col.ty {
                ColumnType::Int32 => {
                    let a = array.as_primitive_opt::<Int32Type>().ok_or_else(mismatch)?;
                    a.iter().flatten().for_each(|v| acc.push_int(v as i64));
                }
                ColumnType::Int64 => {
                    let a = array.as_primitive_opt::<Int64Type>().ok_or_else(mismatch)?;
                    a.iter().flatten().for_each(|v| acc.push_int(v));
                }
                ColumnType::Float32 => {
                    let a = array.as_primitive_opt::<Float32Type>().ok_or_else(mismatch)?;
                    a.iter().flatten().for_each(|v| acc.push_float(v as f64));
                }
                ColumnType::Float64 => {
                    let a = array.as_primitive_opt::<Float64Type>().ok_or_else(mismatch)?;
                    a.iter().flatten().for_each(|v| acc.push_float(v));
                }
                ColumnType::Utf8 => {
                    let a = array.as_string_opt::<i32>().ok_or_else(mismatch)?;
                    a.iter().flatten().for_each(|v| acc.push_text(v));
                }
            }
        }
    }

    let columns = schema
        .columns()
        .iter()
        .zip(accs)
        .map(|(col, acc)| acc.finish(&col.name, col.ty))
        .collect::<Vec<_>>();
    tracing::info!(columns = columns.len(), "computed summary statistics");
    Ok(DescribeTable { columns })
}
