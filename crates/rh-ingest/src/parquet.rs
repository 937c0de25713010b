//! Parquet file read/write for ratings tables.

use std::fs::File;
use std::path::Path;

use arrow::datatypes::SchemaRef;
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;

use crate::{IngestError, Result};

/// Read a Parquet file into Arrow RecordBatches.
pub fn read_parquet_batches(path: &Path) -> Result<Vec<RecordBatch>> {
    let file =
        File::open(path).map_err(|source| IngestError::Open { path: path.to_path_buf(), source })?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;
    let reader = builder.build()?;
    let batches: std::result::Result<Vec<_>, _> = reader.collect();
    Ok(batches?)
}

/// Arrow schema stored in a Parquet file, without reading any rows.
pub fn read_parquet_schema(path: &Path) -> Result<SchemaRef> {
    let file =
        File::open(path).map_err(|source| IngestError::Open { path: path.to_path_buf(), source })?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;
    Ok(builder.schema().clone())
}

/// Read Parquet data from an in-memory byte slice into Arrow RecordBatches.
pub fn read_parquet_bytes(data: &[u8]) -> Result<Vec<RecordBatch>> {
    // `bytes::Bytes` implements `ChunkReader`.
    let buf = bytes::Bytes::copy_from_slice(data);
    let builder = ParquetRecordBatchReaderBuilder::try_new(buf)?;
    let reader = builder.build()?;
    let batches: std::result::Result<Vec<_>, _> = reader.collect();
    Ok(batches?)
}

fn default_compression() -> Compression {
    #[cfg(feature = "zstd")]
    {
        Compression::ZSTD(Default::default())
    }
    #[cfg(not(feature = "zstd"))]
    {
        Compression::SNAPPY
    }
}

fn writer_properties() -> WriterProperties {
    WriterProperties::builder().set_compression(default_compression()).build()
}

/// Write Arrow RecordBatches to a Parquet file. Zero batches write nothing.
pub fn write_parquet(path: &Path, batches: &[RecordBatch]) -> Result<()> {
    match batches.first() {
        Some(first) => write_parquet_with_schema(path, &first.schema(), batches).map(|_| ()),
        None => Ok(()),
    }
}

/// Write batches of a known schema. Zero batches still produce a valid, empty file.
/// Returns the number of rows written.
pub fn write_parquet_with_schema(
    path: &Path,
    schema: &SchemaRef,
    batches: &[RecordBatch],
) -> Result<usize> {
    let file = File::create(path)?;
    let mut writer = ArrowWriter::try_new(file, schema.clone(), Some(writer_properties()))?;

    let mut rows = 0;
    for batch in batches {
        writer.write(batch)?;
        rows += batch.num_rows();
    }

    writer.close()?;
    tracing::debug!(path = %path.display(), rows, "wrote Parquet file");
    Ok(rows)
}

/// Write Arrow RecordBatches to Parquet bytes in memory.
pub fn write_parquet_bytes(batches: &[RecordBatch]) -> Result<Vec<u8>> {
    let Some(first) = batches.first() else {
        return Ok(vec![]);
    };

    let mut buf = Vec::new();
    {
        let mut writer = ArrowWriter::try_new(&mut buf, first.schema(), Some(writer_properties()))?;
        for batch in batches {
            writer.write(batch)?;
        }
        writer.close()?;
    }

    Ok(buf)
}
