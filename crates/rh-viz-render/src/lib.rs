//! # rh-viz-render
//!
//! Draws `rh-viz` artifacts. Everything renders to SVG first; PNG (feature
//! `png`) and PDF (feature `pdf`) are conversions of that SVG.

pub mod canvas;
pub mod color;
pub mod config;
pub mod header;
pub mod layout;
pub mod output;
pub mod plots;
pub mod primitives;
pub mod text;
pub mod theme;

use std::path::Path;

use config::VizConfig;
use rh_viz::histogram::HISTOGRAM_SCHEMA_V1;
use rh_viz::summary::SUMMARY_SCHEMA_V1;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("unknown artifact kind: {0}")]
    UnknownKind(String),
    #[error("unsupported output format: {0}")]
    UnknownFormat(String),
    #[error("artifact schema mismatch: expected {expected}, got {actual}")]
    SchemaVersion { expected: &'static str, actual: String },
    #[error("deserialization error: {0}")]
    Deserialize(#[from] serde_json::Error),
    #[error("config error: {0}")]
    Config(String),
    #[error("layout error: {0}")]
    Layout(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[cfg(feature = "png")]
    #[error("PNG encoding error: {0}")]
    Png(String),
    #[cfg(feature = "pdf")]
    #[error("PDF conversion error: {0}")]
    Pdf(String),
}

pub type Result<T> = std::result::Result<T, RenderError>;

fn check_schema(expected: &'static str, actual: &str) -> Result<()> {
    if actual == expected {
        Ok(())
    } else {
        Err(RenderError::SchemaVersion { expected, actual: actual.to_string() })
    }
}

/// Render an artifact JSON to SVG string.
pub fn render_svg(artifact_json: &str, kind: &str, config: &VizConfig) -> Result<String> {
    let svg = match kind {
        "histogram" | "bar" => {
            let art: rh_viz::HistogramArtifact = serde_json::from_str(artifact_json)?;
            check_schema(HISTOGRAM_SCHEMA_V1, &art.schema_version)?;
            plots::bar::render(&art, config)?
        }
        "summary" | "describe" => {
            let art: rh_viz::SummaryArtifact = serde_json::from_str(artifact_json)?;
            check_schema(SUMMARY_SCHEMA_V1, &art.schema_version)?;
            plots::summary::render(&art, config)?
        }
        other => return Err(RenderError::UnknownKind(other.to_string())),
    };
    tracing::debug!(kind, theme = %config.theme, bytes = svg.len(), "rendered svg");
    Ok(svg)
}

/// Fail unless this build can produce `format`.
pub fn check_format(format: &str) -> Result<()> {
    match format.to_ascii_lowercase().as_str() {
        "svg" => Ok(()),
        #[cfg(feature = "png")]
        "png" => Ok(()),
        #[cfg(feature = "pdf")]
        "pdf" => Ok(()),
        other => Err(RenderError::UnknownFormat(other.to_string())),
    }
}

/// Output format for `path`: its extension, else `config.output.format`.
pub fn format_for_path<'a>(path: &'a Path, config: &'a VizConfig) -> &'a str {
    path.extension().and_then(|e| e.to_str()).unwrap_or(config.output.format.as_str())
}

/// Render an artifact JSON to bytes in the specified format.
pub fn render_to_bytes(
    artifact_json: &str,
    kind: &str,
    format: &str,
    config: &VizConfig,
) -> Result<Vec<u8>> {
    // Fail on the format before doing any drawing.
    check_format(format)?;
    let svg = render_svg(artifact_json, kind, config)?;
    match format.to_ascii_lowercase().as_str() {
        #[cfg(feature = "png")]
        "png" => output::png::svg_to_png(&svg, config.output.dpi),
        #[cfg(feature = "pdf")]
        "pdf" => output::pdf::svg_to_pdf(&svg),
        _ => Ok(svg.into_bytes()),
    }
}

/// Render an artifact JSON to a file (format inferred from extension,
/// falling back to `config.output.format`).
pub fn render_to_file(
    artifact_json: &str,
    kind: &str,
    path: &Path,
    config: &VizConfig,
) -> Result<()> {
    let ext = format_for_path(path, config);
    check_format(ext)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    if ext.eq_ignore_ascii_case("svg") {
        let svg = render_svg(artifact_json, kind, config)?;
        output::svg::save_svg(&svg, path)?;
    } else {
        let bytes = render_to_bytes(artifact_json, kind, ext, config)?;
        std::fs::write(path, bytes)?;
    }
    tracing::info!(path = %path.display(), kind, "chart written");
    Ok(())
}

#[cfg(test)]
mod tests;
