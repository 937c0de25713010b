//! # rh-ingest
//!
//! Apache Arrow bridge for the ratings pipeline. Every step works on
//! [`RecordBatch`](arrow::record_batch::RecordBatch)es so the input can be
//! streamed in bounded chunks.
//!
//! ```text
//! ratings.csv ──csv──▶ RecordBatch* ──┬──▶ describe  ──▶ DescribeTable
//!   (declared schema)                 ├──▶ catalog   ──▶ <warehouse>/<db>.db/<table>/part-*.parquet
//!                                     └──▶ aggregate ──▶ Vec<RatingCount> ──▶ RecordBatch
//! ```
//!
//! # Modules
//!
//! - [`schema`]: declared schema → Arrow schema
//! - [`csv`]: CSV load under a declared schema, with parse modes
//! - [`preview`]: `take` / ASCII table rendering
//! - [`describe`]: per-column summary statistics
//! - [`parquet`]: Parquet file read/write
//! - [`catalog`]: named tables with save modes
//! - [`aggregate`]: group-by-rating counts

pub mod aggregate;
pub mod catalog;
pub mod csv;
pub mod describe;
pub mod error;
pub mod parquet;
pub mod preview;
pub mod schema;

pub use error::{IngestError, Result};
