use crate::canvas::Canvas;
use crate::config::VizConfig;
use crate::layout::axes::Axis;
use crate::layout::margins::{PlotArea, max_label_width};
use crate::primitives::*;

/// Dashed grid lines at major ticks of axes that ask for them.
pub fn draw_grid(
    canvas: &mut Canvas,
    area: &PlotArea,
    x_axis: &Axis,
    y_axis: &Axis,
    config: &VizConfig,
) {
    if !config.grid.show {
        return;
    }
    let grid_style = LineStyle {
        color: config.grid.color.with_alpha(config.grid.alpha),
        width: 0.5,
        dash: Some("3 3".into()),
    };
    if x_axis.grid {
        for &val in &x_axis.tick_positions {
            let px = x_axis.data_to_pixel(val, area.left, area.right());
            canvas.line(px, area.top, px, area.bottom(), &grid_style);
        }
    }
    if y_axis.grid {
        for &val in &y_axis.tick_positions {
            let py = y_axis.data_to_pixel(val, area.bottom(), area.top);
            if py < area.top - 0.5 || py > area.bottom() + 0.5 {
                continue;
            }
            canvas.line(area.left, py, area.right(), py, &grid_style);
        }
    }
}

/// Draw spines, ticks, tick labels and axis labels.
pub fn draw_axes(
    canvas: &mut Canvas,
    area: &PlotArea,
    x_axis: &Axis,
    y_axis: &Axis,
    config: &VizConfig,
) {
    let frame_color = config.colors.frame;
    let frame_style = LineStyle::solid(frame_color, 0.8);
    let tick_style_line = LineStyle::solid(frame_color, 0.6);
    let minor_tick_style = LineStyle::solid(frame_color, 0.4);

    let inward = config.axes.tick_direction == "in";
    let tl = config.axes.tick_length;
    let mtl = config.axes.minor_tick_length;

    canvas.line(area.left, area.bottom(), area.right(), area.bottom(), &frame_style);
    canvas.line(area.left, area.top, area.left, area.bottom(), &frame_style);
    if config.axes.full_frame {
        canvas.line(area.left, area.top, area.right(), area.top, &frame_style);
        canvas.line(area.right(), area.top, area.right(), area.bottom(), &frame_style);
    }

    let tick_size = config.font.tick_size;
    let rotation = x_axis.tick_label_rotation;
    let x_label_style = if rotation.abs() > f64::EPSILON {
        TextStyle {
            size: tick_size,
            color: config.colors.text,
            anchor: TextAnchor::End,
            baseline: TextBaseline::Central,
            ..Default::default()
        }
    } else {
        TextStyle {
            size: tick_size,
            color: config.colors.text,
            anchor: TextAnchor::Middle,
            baseline: TextBaseline::Hanging,
            ..Default::default()
        }
    };
    let x_label_y = if inward { area.bottom() + 3.0 } else { area.bottom() + tl + 3.0 };

    // --- X axis ticks ---
    for (i, &val) in x_axis.tick_positions.iter().enumerate() {
        let px = x_axis.data_to_pixel(val, area.left, area.right());
        if px < area.left - 0.5 || px > area.right() + 0.5 {
            continue;
        }

        if inward {
            canvas.line(px, area.bottom(), px, area.bottom() - tl, &tick_style_line);
        } else {
            canvas.line(px, area.bottom(), px, area.bottom() + tl, &tick_style_line);
        }
        if config.axes.show_top_ticks {
            if inward {
                canvas.line(px, area.top, px, area.top + tl, &tick_style_line);
            } else {
                canvas.line(px, area.top, px, area.top - tl, &tick_style_line);
            }
        }

        if let Some(label) = x_axis.tick_labels.get(i) {
            if rotation.abs() > f64::EPSILON {
                canvas.text_rotated(px, x_label_y, label, &x_label_style, -rotation);
            } else {
                canvas.text(px, x_label_y, label, &x_label_style);
            }
        }
    }

    for &val in &x_axis.minor_ticks {
        let px = x_axis.data_to_pixel(val, area.left, area.right());
        if px < area.left - 0.5 || px > area.right() + 0.5 {
            continue;
        }
        if inward {
            canvas.line(px, area.bottom(), px, area.bottom() - mtl, &minor_tick_style);
        } else {
            canvas.line(px, area.bottom(), px, area.bottom() + mtl, &minor_tick_style);
        }
    }

    // --- Y axis ticks ---
    let y_tick_label_style = TextStyle {
        size: tick_size,
        color: config.colors.text,
        anchor: TextAnchor::End,
        baseline: TextBaseline::Central,
        ..Default::default()
    };

    for (i, &val) in y_axis.tick_positions.iter().enumerate() {
        let py = y_axis.data_to_pixel(val, area.bottom(), area.top);
        if py < area.top - 0.5 || py > area.bottom() + 0.5 {
            continue;
        }

        if inward {
            canvas.line(area.left, py, area.left + tl, py, &tick_style_line);
        } else {
            canvas.line(area.left, py, area.left - tl, py, &tick_style_line);
        }
        if config.axes.show_right_ticks {
            if inward {
                canvas.line(area.right(), py, area.right() - tl, py, &tick_style_line);
            } else {
                canvas.line(area.right(), py, area.right() + tl, py, &tick_style_line);
            }
        }

        if let Some(label) = y_axis.tick_labels.get(i) {
            let label_x = if inward { area.left - 4.0 } else { area.left - tl - 4.0 };
            canvas.text(label_x, py, label, &y_tick_label_style);
        }
    }

    for &val in &y_axis.minor_ticks {
        let py = y_axis.data_to_pixel(val, area.bottom(), area.top);
        if py < area.top - 0.5 || py > area.bottom() + 0.5 {
            continue;
        }
        if inward {
            canvas.line(area.left, py, area.left + mtl, py, &minor_tick_style);
        } else {
            canvas.line(area.left, py, area.left - mtl, py, &minor_tick_style);
        }
    }

    // --- Axis labels ---
    let label_style = TextStyle {
        size: config.font.label_size,
        color: config.colors.text,
        anchor: TextAnchor::Middle,
        ..Default::default()
    };
    let tick_space = if inward { 4.0 } else { tl + 4.0 };

    if !x_axis.label.is_empty() {
        let tick_text = crate::layout::margins::x_tick_extent(canvas, x_axis, &x_label_style);
        let label_y = area.bottom() + tick_space + tick_text + config.font.label_size + 4.0;
        canvas.text(area.left + area.width / 2.0, label_y, &x_axis.label, &label_style);
    }

    if !y_axis.label.is_empty() {
        let tick_w = max_label_width(canvas, &y_axis.tick_labels, &y_tick_label_style);
        let label_x = area.left - tick_space - tick_w - 6.0;
        let label_y = area.top + area.height / 2.0;
        canvas.text_rotated(label_x, label_y, &y_axis.label, &label_style, -90.0);
    }
}

/// Draw axes frame only (no ticks), for table layouts.
pub fn draw_frame(canvas: &mut Canvas, area: &PlotArea, config: &VizConfig) {
    let style = LineStyle::solid(config.colors.frame, 0.8);
    canvas.line(area.left, area.top, area.right(), area.top, &style);
    canvas.line(area.left, area.bottom(), area.right(), area.bottom(), &style);
    canvas.line(area.left, area.top, area.left, area.bottom(), &style);
    canvas.line(area.right(), area.top, area.right(), area.bottom(), &style);
}
