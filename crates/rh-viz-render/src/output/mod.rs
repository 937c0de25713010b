pub mod svg;

#[cfg(feature = "png")]
pub mod png;

#[cfg(feature = "pdf")]
pub mod pdf;

/// usvg options with the host's fonts loaded; SVG text needs them to rasterize.
#[cfg(any(feature = "png", feature = "pdf"))]
pub(crate) fn usvg_options() -> usvg::Options<'static> {
    let mut opt = usvg::Options::default();
    opt.font_family = "DejaVu Sans".into();
    let fontdb = opt.fontdb_mut();
    fontdb.load_system_fonts();
    if fontdb.is_empty() {
        tracing::warn!("no system fonts found; text will be missing from the output");
    }
    opt
}
