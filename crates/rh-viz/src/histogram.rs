//! Rating-frequency histogram artifact (numbers-first).

use rh_core::RatingCount;
use serde::{Deserialize, Serialize};

use crate::ArtifactMeta;

/// Schema identifier embedded in every histogram artifact.
pub const HISTOGRAM_SCHEMA_V1: &str = "ratehist_histogram_v1";

/// One bar: a distinct rating and how many rows carry it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistogramBar {
    /// Category label on the x axis (`"4.0"`, `"3.14"`, `"NaN"` or `"null"`)
    pub label: String,
    /// Rating value; `None` for the null group. Non-finite values are
    /// written as the strings `"NaN"`, `"inf"` and `"-inf"`.
    #[serde(with = "rating_repr")]
    pub rating: Option<f32>,
    /// Number of rows
    pub count: u64,
}

/// Bar chart data: one bar per rating, in ascending rating order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistogramArtifact {
    /// Always [`HISTOGRAM_SCHEMA_V1`]
    pub schema_version: String,
    /// Provenance
    pub meta: ArtifactMeta,
    /// Horizontal axis label
    pub x_label: String,
    /// Vertical axis label
    pub y_label: String,
    /// Bars, left to right
    pub bars: Vec<HistogramBar>,
}

impl HistogramArtifact {
    /// Build from aggregated counts, keeping their order.
    pub fn from_counts(counts: &[RatingCount], x_label: &str, y_label: &str) -> Self {
        let bars = counts
            .iter()
            .map(|c| HistogramBar { label: bar_label(c.rating), rating: c.rating, count: c.count })
            .collect();
        Self {
            schema_version: HISTOGRAM_SCHEMA_V1.into(),
            meta: ArtifactMeta::now(),
            x_label: x_label.into(),
            y_label: y_label.into(),
            bars,
        }
    }

    /// Sum of all bar counts.
    pub fn total(&self) -> u64 {
        self.bars.iter().map(|b| b.count).sum()
    }

    /// Most frequent bar. The leftmost wins ties.
    pub fn mode(&self) -> Option<&HistogramBar> {
        self.bars.iter().fold(None, |best: Option<&HistogramBar>, b| match best {
            Some(m) if m.count >= b.count => Some(m),
            _ => Some(b),
        })
    }

    /// Largest bar count, 0 when empty.
    pub fn max_count(&self) -> u64 {
        self.bars.iter().map(|b| b.count).max().unwrap_or(0)
    }
}

/// Shortest text that reads back as the same `f32`, keeping `.0` on integral values.
fn bar_label(rating: Option<f32>) -> String {
    match rating {
        Some(r) if r.is_finite() && r.fract() == 0.0 => format!("{r:.1}"),
        Some(r) => r.to_string(),
        None => "null".into(),
    }
}

/// JSON has no NaN or infinity, and writing them as `null` would merge them
/// with the null group.
mod rating_repr {
    use serde::{Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Number(f32),
        Text(String),
    }

    pub fn serialize<S: Serializer>(rating: &Option<f32>, s: S) -> Result<S::Ok, S::Error> {
        match rating {
            None => s.serialize_none(),
            Some(r) if r.is_finite() => s.serialize_some(r),
            Some(r) => s.serialize_some(&r.to_string()),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f32>, D::Error> {
        match Option::<Repr>::deserialize(d)? {
            None => Ok(None),
            Some(Repr::Number(r)) => Ok(Some(r)),
            Some(Repr::Text(t)) => t.parse().map(Some).map_err(serde::de::Error::custom),
        }
    }
}
