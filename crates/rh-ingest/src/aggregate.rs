//! Group-by-rating counts and their in-memory table form.

use std::collections::HashMap;
use std::sync::Arc;

use arrow::array::{Array, AsArray, Float32Builder, Int64Builder};
use arrow::datatypes::{DataType, Field, Float32Type, Schema};
use arrow::record_batch::RecordBatch;
use rh_core::RatingCount;

use crate::{IngestError, Result};

/// Grouping key: `-0.0` folds into `0.0`, every NaN into one canonical NaN.
fn group_key(v: f32) -> u32 {
    if v.is_nan() {
        f32::NAN.to_bits()
    } else if v == 0.0 {
        0.0_f32.to_bits()
    } else {
        v.to_bits()
    }
}

/// Count rows per distinct value of `column`, sorted by value ascending.
///
/// `column` must be `Float32`, the declared rating type; wider columns are
/// rejected rather than narrowed, which could merge distinct values.
/// Nulls form a single group that sorts first; NaN sorts after every number.
pub fn rating_counts(batches: &[RecordBatch], column: &str) -> Result<Vec<RatingCount>> {
    let mut groups: HashMap<u32, u64> = HashMap::new();
    let mut nulls = 0u64;

    for batch in batches {
        let idx = batch
            .schema()
            .index_of(column)
            .map_err(|_| IngestError::MissingColumn(column.to_string()))?;
        let array = batch.column(idx);
        nulls += array.null_count() as u64;

        match array.data_type() {
            DataType::Float32 => {
                for v in array.as_primitive::<Float32Type>().iter().flatten() {
                    *groups.entry(group_key(v)).or_default() += 1;
                }
            }
            other => {
                return Err(IngestError::WrongType {
                    col: column.to_string(),
                    expected: "Float32".into(),
                    actual: format!("{other:?}"),
                });
            }
        }
    }

    let mut counts: Vec<RatingCount> =
        groups.into_iter().map(|(bits, n)| RatingCount::new(Some(f32::from_bits(bits)), n)).collect();
    counts.sort_by(|a, b| match (a.rating, b.rating) {
        (Some(x), Some(y)) => x.total_cmp(&y),
        _ => std::cmp::Ordering::Equal,
    });
    if nulls > 0 {
        counts.insert(0, RatingCount::new(None, nulls));
    }

    tracing::info!(groups = counts.len(), column, "aggregated counts");
    Ok(counts)
}

/// Materialize counts as a two-column table: `rating: Float32`, `count: Int64`.
pub fn rating_counts_to_batch(counts: &[RatingCount]) -> Result<RecordBatch> {
    let mut ratings = Float32Builder::with_capacity(counts.len());
    let mut totals = Int64Builder::with_capacity(counts.len());
    for c in counts {
        ratings.append_option(c.rating);
        totals.append_value(i64::try_from(c.count).unwrap_or(i64::MAX));
    }
    let schema = Arc::new(Schema::new(vec![
        Field::new("rating", DataType::Float32, true),
        Field::new("count", DataType::Int64, false),
    ]));
    Ok(RecordBatch::try_new(schema, vec![Arc::new(ratings.finish()), Arc::new(totals.finish())])?)
}
