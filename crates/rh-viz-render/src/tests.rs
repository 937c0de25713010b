use rh_core::RatingCount;
use rh_viz::HistogramArtifact;

use super::*;

fn histogram_json() -> String {
    let counts = vec![
        RatingCount::new(None, 1),
        RatingCount::new(Some(2.0), 4),
        RatingCount::new(Some(4.5), 7),
    ];
    let art = HistogramArtifact::from_counts(&counts, "rating", "count");
    serde_json::to_string(&art).unwrap()
}

#[test]
fn histogram_kind_and_alias() {
    let config = VizConfig::default();
    let a = render_svg(&histogram_json(), "histogram", &config).unwrap();
    let b = render_svg(&histogram_json(), "bar", &config).unwrap();
    assert!(a.starts_with("<svg"));
    assert!(a.contains(">null<"));
    assert!(a.contains(">4.5<"));
    assert_eq!(a, b);
}

#[test]
fn unknown_kind() {
    let err = render_svg(&histogram_json(), "pie", &VizConfig::default()).unwrap_err();
    assert!(matches!(err, RenderError::UnknownKind(k) if k == "pie"));
}

#[test]
fn wrong_artifact_for_kind() {
    let err = render_svg(&histogram_json(), "summary", &VizConfig::default()).unwrap_err();
    assert!(matches!(err, RenderError::Deserialize(_)));
}

#[test]
fn schema_version_checked() {
    let json = histogram_json().replace(HISTOGRAM_SCHEMA_V1, "ratehist_histogram_v0");
    let err = render_svg(&json, "histogram", &VizConfig::default()).unwrap_err();
    assert!(matches!(err, RenderError::SchemaVersion { .. }));
}

#[test]
fn unsupported_format() {
    let err = render_to_bytes(&histogram_json(), "histogram", "gif", &VizConfig::default())
        .unwrap_err();
    assert!(matches!(err, RenderError::UnknownFormat(f) if f == "gif"));
}

#[test]
fn svg_bytes_match_svg_string() {
    let config = VizConfig::default();
    let bytes = render_to_bytes(&histogram_json(), "histogram", "SVG", &config).unwrap();
    let svg = render_svg(&histogram_json(), "histogram", &config).unwrap();
    assert_eq!(bytes, svg.into_bytes());
}

#[test]
fn file_output_creates_parent_dirs() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("charts").join("rating_histogram.svg");
    render_to_file(&histogram_json(), "histogram", &path, &VizConfig::default()).unwrap();
    let svg = std::fs::read_to_string(&path).unwrap();
    assert!(svg.contains("</svg>"));
}

#[test]
fn themed_render() {
    let config = config::resolve_config(Some("theme: pandas\ntitle: MovieLens ratings\n")).unwrap();
    let svg = render_svg(&histogram_json(), "histogram", &config).unwrap();
    assert!(svg.contains("MovieLens ratings"));
    assert!(svg.contains("#1f77b4"));
    // pandas rotates category labels by default
    assert!(svg.contains("rotate(-90.0"));
}

#[cfg(feature = "png")]
#[test]
fn png_output() {
    let bytes = render_to_bytes(&histogram_json(), "histogram", "png", &VizConfig::default())
        .unwrap();
    assert_eq!(&bytes[..4], b"\x89PNG");
}

#[cfg(feature = "pdf")]
#[test]
fn pdf_output() {
    let bytes = render_to_bytes(&histogram_json(), "histogram", "pdf", &VizConfig::default())
        .unwrap();
    assert!(bytes.starts_with(b"%PDF"));
}
