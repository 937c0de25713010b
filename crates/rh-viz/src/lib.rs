//! # rh-viz
//!
//! Visualization data artifacts for ratehist.
//!
//! This crate only builds plot-friendly JSON structures (flat arrays, no
//! nesting beyond one level); drawing them is `rh-viz-render`'s job.

#![warn(missing_docs)]
#![warn(clippy::all)]

/// Rating-frequency histogram artifact.
pub mod histogram;

/// Summary statistics (describe) artifact.
pub mod summary;

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

pub use histogram::{HistogramArtifact, HistogramBar};
pub use summary::{SummaryArtifact, SummaryColumn};

/// Provenance block shared by all artifacts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactMeta {
    /// Producing tool
    pub tool: String,
    /// Tool version
    pub tool_version: String,
    /// Creation time, milliseconds since the Unix epoch
    pub created_unix_ms: u64,
}

impl ArtifactMeta {
    /// Metadata stamped with the current time.
    pub fn now() -> Self {
        Self {
            tool: "ratehist".into(),
            tool_version: env!("CARGO_PKG_VERSION").into(),
            created_unix_ms: SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_millis() as u64)
                .unwrap_or(0),
        }
    }
}
