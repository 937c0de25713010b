pub mod axes_draw;
pub mod bar;
pub mod summary;

/// Placeholder for artifacts with nothing to draw.
pub(crate) fn empty_svg(message: &str) -> String {
    format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="160" height="50"><text x="10" y="30">{message}</text></svg>"#
    )
}
