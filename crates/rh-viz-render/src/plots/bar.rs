use rh_viz::histogram::HistogramArtifact;

use crate::canvas::Canvas;
use crate::config::VizConfig;
use crate::header::draw_title;
use crate::layout::axes::Axis;
use crate::layout::legend::{LegendEntry, draw_legend};
use crate::layout::margins::PlotArea;
use crate::plots::axes_draw::{draw_axes, draw_grid};
use crate::plots::empty_svg;
use crate::primitives::*;

/// Vertical bar chart, one bar per histogram category, y axis from zero.
pub fn render(artifact: &HistogramArtifact, config: &VizConfig) -> crate::Result<String> {
    if artifact.bars.is_empty() {
        return Ok(empty_svg("No histogram data"));
    }

    let labels: Vec<&str> = artifact.bars.iter().map(|b| b.label.as_str()).collect();
    // Room for the value labels above the tallest bar.
    let headroom = if config.bar.show_values { 1.08 } else { 1.0 };
    let x_axis = Axis::categorical(&labels)
        .with_label(artifact.x_label.as_str())
        .with_rotation(config.bar.rotate_labels);
    let y_axis = Axis::counts(artifact.max_count() as f64 * headroom, 6)
        .with_label(artifact.y_label.as_str());

    let mut canvas = Canvas::new(config.figure.width, config.figure.height)
        .with_background(config.figure.background);
    let area = PlotArea::auto(&canvas, &y_axis, &x_axis, config);

    draw_title(&mut canvas, config);
    draw_grid(&mut canvas, &area, &x_axis, &y_axis, config);

    let palette = config.palette_colors();
    let slot = x_axis.unit_pixels(area.left, area.right());
    let bar_w = slot * config.bar.effective_width_frac();
    let value_style = TextStyle {
        size: config.font.tick_size * 0.85,
        color: config.colors.text,
        anchor: TextAnchor::Middle,
        baseline: TextBaseline::Alphabetic,
        ..Default::default()
    };

    canvas.push_clip(area.left, area.top, area.width, area.height);
    for (i, bar) in artifact.bars.iter().enumerate() {
        let fill = if config.bar.color_by_category {
            palette.get(i % palette.len().max(1)).copied().unwrap_or(config.colors.bar)
        } else {
            config.colors.bar
        };
        let style = match config.colors.bar_edge {
            Some(edge) => Style::filled_outlined(fill, edge, 0.6),
            None => Style::filled(fill),
        };

        let cx = x_axis.data_to_pixel(i as f64 + 0.5, area.left, area.right());
        let top = y_axis.data_to_pixel(bar.count as f64, area.bottom(), area.top);
        canvas.rect(cx - bar_w / 2.0, top, bar_w, area.bottom() - top, &style);

        if config.bar.show_values {
            canvas.text(cx, top - 3.0, &group_thousands(bar.count), &value_style);
        }
    }
    canvas.pop_clip();

    // A single swatch would mislabel per-category colors.
    if config.legend.show && !config.bar.color_by_category {
        let entry = LegendEntry { label: artifact.y_label.clone(), color: config.colors.bar };
        draw_legend(
            &mut canvas,
            &area,
            &[entry],
            config.font.size,
            config.colors.text,
            config.legend.frame,
        );
    }

    draw_axes(&mut canvas, &area, &x_axis, &y_axis, config);
    tracing::debug!(bars = artifact.bars.len(), total = artifact.total(), "rendered bar chart");
    canvas.finish_svg()
}

/// `1234567` -> `1,234,567`.
fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
