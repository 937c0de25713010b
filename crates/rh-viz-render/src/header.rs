use crate::canvas::Canvas;
use crate::config::VizConfig;
use crate::primitives::*;

/// Draw the chart title centered above the plot, if one is configured.
pub fn draw_title(canvas: &mut Canvas, config: &VizConfig) {
    let Some(title) = config.title.as_deref().filter(|t| !t.is_empty()) else {
        return;
    };
    let style = TextStyle {
        size: config.font.title_size,
        color: config.colors.text,
        weight: FontWeight::Bold,
        anchor: TextAnchor::Middle,
        baseline: TextBaseline::Alphabetic,
        ..Default::default()
    };
    canvas.text(canvas.width / 2.0, 10.0 + config.font.title_size, title, &style);
}
