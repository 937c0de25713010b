//! Declared schema → Arrow schema, and batch validation against it.

use std::sync::Arc;

use arrow::datatypes::{DataType, Field, Schema, SchemaRef};
use arrow::record_batch::RecordBatch;
use rh_core::{ColumnType, TableSchema};

use crate::{IngestError, Result};

/// Arrow type for a declared column type.
pub fn arrow_type(ty: ColumnType) -> DataType {
    match ty {
        ColumnType::Int32 => DataType::Int32,
        ColumnType::Int64 => DataType::Int64,
        ColumnType::Float32 => DataType::Float32,
        ColumnType::Float64 => DataType::Float64,
        ColumnType::Utf8 => DataType::Utf8,
    }
}

/// Declared column type for an Arrow type, if it is one we handle.
pub fn column_type(dt: &DataType) -> Option<ColumnType> {
    match dt {
        DataType::Int32 => Some(ColumnType::Int32),
        DataType::Int64 => Some(ColumnType::Int64),
        DataType::Float32 => Some(ColumnType::Float32),
        DataType::Float64 => Some(ColumnType::Float64),
        DataType::Utf8 => Some(ColumnType::Utf8),
        _ => None,
    }
}

/// Build the Arrow schema for a declared schema.
pub fn to_arrow_schema(schema: &TableSchema) -> SchemaRef {
    let fields: Vec<Field> = schema
        .columns()
        .iter()
        .map(|c| Field::new(&c.name, arrow_type(c.ty), c.nullable))
        .collect();
    Arc::new(Schema::new(fields))
}

/// Recover a declared schema from an Arrow schema (e.g. a Parquet file).
pub fn from_arrow_schema(schema: &Schema) -> Result<TableSchema> {
    let mut columns = Vec::with_capacity(schema.fields().len());
    for f in schema.fields() {
        let ty = column_type(f.data_type()).ok_or_else(|| IngestError::WrongType {
            col: f.name().clone(),
            expected: "Int32, Int64, Float32, Float64 or Utf8".into(),
            actual: format!("{:?}", f.data_type()),
        })?;
        columns.push(rh_core::ColumnDef::new(f.name().clone(), ty, f.is_nullable()));
    }
    Ok(TableSchema::new(columns)?)
}

/// Check that a batch has exactly the declared columns, in order, with the declared types.
pub fn validate_batch_schema(batch: &RecordBatch, schema: &TableSchema) -> Result<()> {
    let actual = batch.schema();
    if actual.fields().len() != schema.len() {
        return Err(IngestError::SchemaMismatch(format!(
            "expected {} columns, got {}",
            schema.len(),
            actual.fields().len()
        )));
    }
    for (field, col) in actual.fields().iter().zip(schema.columns()) {
        if field.name() != &col.name {
            return Err(IngestError::SchemaMismatch(format!(
                "expected column '{}', got '{}'",
                col.name,
                field.name()
            )));
        }
        let expected = arrow_type(col.ty);
        if field.data_type() != &expected {
            return Err(IngestError::WrongType {
                col: col.name.clone(),
                expected: format!("{expected:?}"),
                actual: format!("{:?}", field.data_type()),
            });
        }
    }
    Ok(())
}

/// `true` when two Arrow schemas have the same column names and types.
/// Metadata and nullability are ignored.
pub fn same_columns(a: &Schema, b: &Schema) -> bool {
    a.fields().len() == b.fields().len()
        && a.fields()
            .iter()
            .zip(b.fields().iter())
            .all(|(x, y)| x.name() == y.name() && x.data_type() == y.data_type())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ratings_arrow_schema() {
        let s = to_arrow_schema(&TableSchema::ratings());
        assert_eq!(s.fields().len(), 4);
        assert_eq!(s.field(0).data_type(), &DataType::Int32);
        assert_eq!(s.field(2).data_type(), &DataType::Float32);
        assert_eq!(s.field(3).data_type(), &DataType::Int64);
        assert!(s.field(2).is_nullable());
    }

    #[test]
    fn arrow_schema_back_to_declared() {
        let declared = TableSchema::ratings();
        let back = from_arrow_schema(&to_arrow_schema(&declared)).unwrap();
        assert_eq!(back, declared);
    }

    #[test]
    fn unsupported_arrow_type() {
        let s = Schema::new(vec![Field::new("flag", DataType::Boolean, true)]);
        assert!(matches!(from_arrow_schema(&s), Err(IngestError::WrongType { .. })));
    }
}
