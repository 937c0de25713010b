//! First-N-rows and ASCII table rendering.

use arrow::array::{Array, AsArray};
use arrow::datatypes::{Float32Type, Int32Type, Int64Type};
use arrow::record_batch::RecordBatch;
use arrow::util::display::FormatOptions;
use arrow::util::pretty::pretty_format_batches_with_options;
use rh_core::RatingRecord;
use rh_core::schema::{EPOCH_TIME_SECONDS, MOVIE_ID, RATING, USER_ID};

use crate::{IngestError, Result};

/// The first `n` rows across `batches`, as zero-copy slices.
pub fn take(batches: &[RecordBatch], n: usize) -> Vec<RecordBatch> {
    let mut out = Vec::new();
    let mut remaining = n;
    for batch in batches {
        if remaining == 0 {
            break;
        }
        let len = batch.num_rows().min(remaining);
        if len > 0 {
            out.push(batch.slice(0, len));
        }
        remaining -= len;
    }
    out
}

/// Render batches as a `+---+` grid. Nulls print as `null`.
pub fn format_table(batches: &[RecordBatch]) -> Result<String> {
    let options = FormatOptions::default().with_null("null");
    Ok(pretty_format_batches_with_options(batches, &options)?.to_string())
}

/// Convert batches in the ratings layout to [`RatingRecord`]s.
pub fn rating_records(batches: &[RecordBatch]) -> Result<Vec<RatingRecord>> {
    let mut out = Vec::new();
    for batch in batches {
        let schema = batch.schema();
        let idx = |name: &str| {
            schema.index_of(name).map_err(|_| IngestError::MissingColumn(name.to_string()))
        };
        let users = batch
            .column(idx(USER_ID)?)
            .as_primitive_opt::<Int32Type>()
            .ok_or_else(|| wrong_type(batch, USER_ID, "Int32"))?;
        let movies = batch
            .column(idx(MOVIE_ID)?)
            .as_primitive_opt::<Int32Type>()
            .ok_or_else(|| wrong_type(batch, MOVIE_ID, "Int32"))?;
        let ratings = batch
            .column(idx(RATING)?)
            .as_primitive_opt::<Float32Type>()
            .ok_or_else(|| wrong_type(batch, RATING, "Float32"))?;
        let times = batch
            .column(idx(EPOCH_TIME_SECONDS)?)
            .as_primitive_opt::<Int64Type>()
            .ok_or_else(|| wrong_type(batch, EPOCH_TIME_SECONDS, "Int64"))?;

        for i in 0..batch.num_rows() {
            out.push(RatingRecord {
                user_id: users.is_valid(i).then(|| users.value(i)),
                movie_id: movies.is_valid(i).then(|| movies.value(i)),
                rating: ratings.is_valid(i).then(|| ratings.value(i)),
                epoch_time_seconds: times.is_valid(i).then(|| times.value(i)),
            });
        }
    }
    Ok(out)
}

fn wrong_type(batch: &RecordBatch, name: &str, expected: &str) -> IngestError {
    let actual = batch
        .schema()
        .field_with_name(name)
        .map(|f| format!("{:?}", f.data_type()))
        .unwrap_or_else(|_| "missing".into());
    IngestError::WrongType { col: name.into(), expected: expected.into(), actual }
}
