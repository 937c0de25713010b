//! Summary statistics artifact built from a describe table.

use rh_ingest::describe::DescribeTable;
use serde::{Deserialize, Serialize};

use crate::ArtifactMeta;

/// Schema identifier embedded in every summary artifact.
pub const SUMMARY_SCHEMA_V1: &str = "ratehist_summary_v1";

/// Statistics of one column. Non-finite numbers are `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryColumn {
    /// Column name
    pub name: String,
    /// Declared column type
    #[serde(rename = "type")]
    pub ty: String,
    /// Non-null values
    pub count: u64,
    /// Mean
    pub mean: Option<f64>,
    /// Sample standard deviation
    pub stddev: Option<f64>,
    /// Minimum, formatted in the column's domain
    pub min: Option<String>,
    /// Maximum, formatted in the column's domain
    pub max: Option<String>,
}

/// Describe output as an artifact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryArtifact {
    /// Always [`SUMMARY_SCHEMA_V1`]
    pub schema_version: String,
    /// Provenance
    pub meta: ArtifactMeta,
    /// One entry per described column, in schema order
    pub columns: Vec<SummaryColumn>,
}

impl SummaryArtifact {
    /// Build from a describe table.
    pub fn from_describe(table: &DescribeTable) -> Self {
        let finite = |v: Option<f64>| v.filter(|x| x.is_finite());
        let columns = table
            .columns
            .iter()
            .map(|c| SummaryColumn {
                name: c.name.clone(),
                ty: c.ty.to_string(),
                count: c.count,
                mean: finite(c.mean),
                stddev: finite(c.stddev),
                min: c.min.as_ref().map(|v| c.format_value(v)),
                max: c.max.as_ref().map(|v| c.format_value(v)),
            })
            .collect();
        Self { schema_version: SUMMARY_SCHEMA_V1.into(), meta: ArtifactMeta::now(), columns }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rh_core::ColumnType;
    use rh_ingest::describe::{ColumnSummary, SummaryValue};

    fn table() -> DescribeTable {
        DescribeTable {
            columns: vec![
                ColumnSummary {
                    name: "userid".into(),
                    ty: ColumnType::Int32,
                    count: 4,
                    mean: Some(2.5),
                    stddev: Some(1.29),
                    min: Some(SummaryValue::Int(1)),
                    max: Some(SummaryValue::Int(4)),
                },
                ColumnSummary {
                    name: "rating".into(),
                    ty: ColumnType::Float32,
                    count: 2,
                    mean: Some(f64::NAN),
                    stddev: None,
                    min: Some(SummaryValue::Float(0.5)),
                    max: Some(SummaryValue::Float(f64::NAN)),
                },
            ],
        }
    }

    #[test]
    fn columns_in_order() {
        let art = SummaryArtifact::from_describe(&table());
        assert_eq!(art.columns.len(), 2);
        assert_eq!(art.columns[0].name, "userid");
        assert_eq!(art.columns[0].ty, "int32");
        assert_relative_eq!(art.columns[0].mean.unwrap(), 2.5);
        assert_eq!(art.columns[0].max.as_deref(), Some("4"));
    }

    #[test]
    fn non_finite_becomes_null() {
        let art = SummaryArtifact::from_describe(&table());
        assert!(art.columns[1].mean.is_none());
        assert_eq!(art.columns[1].min.as_deref(), Some("0.5"));
        let json = serde_json::to_string(&art).unwrap();
        let back: SummaryArtifact = serde_json::from_str(&json).unwrap();
        assert_eq!(back.columns, art.columns);
    }
}
