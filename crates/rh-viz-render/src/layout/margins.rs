use crate::canvas::Canvas;
use crate::config::VizConfig;
use crate::layout::axes::Axis;
use crate::primitives::TextStyle;

/// Rectangular plot area within the canvas.
#[derive(Debug, Clone, Copy)]
pub struct PlotArea {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl PlotArea {
    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    /// Compute auto-margins from axis labels and config.
    pub fn auto(canvas: &Canvas, y_axis: &Axis, x_axis: &Axis, config: &VizConfig) -> Self {
        let tick_style = TextStyle { size: config.font.tick_size, ..Default::default() };
        let label_style = TextStyle { size: config.font.label_size, ..Default::default() };

        // Left margin: y-axis tick labels + axis label + padding
        let mut left = 15.0 + config.axes.tick_length;
        left += max_label_width(canvas, &y_axis.tick_labels, &tick_style) + 8.0;
        if !y_axis.label.is_empty() {
            left += label_style.size + 6.0; // axis label (rotated)
        }

        // Bottom margin: x-axis tick labels, possibly rotated, + axis label
        let mut bottom = 12.0 + config.axes.tick_length;
        bottom += x_tick_extent(canvas, x_axis, &tick_style) + 6.0;
        if !x_axis.label.is_empty() {
            bottom += label_style.size + 6.0;
        }

        let top = match config.title.as_deref() {
            Some(t) if !t.is_empty() => config.font.title_size * 1.2 + 22.0,
            _ => 14.0,
        };
        let right = 15.0;

        let width = canvas.width - left - right;
        let height = canvas.height - top - bottom;

        Self { left, top, width: width.max(50.0), height: height.max(50.0) }
    }

    /// Manual margins (tables and other axis-free layouts).
    pub fn manual(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self { left, top, width, height }
    }
}

pub(crate) fn max_label_width(canvas: &Canvas, labels: &[String], style: &TextStyle) -> f64 {
    labels.iter().map(|l| canvas.measure_text(l, style).width).fold(0.0_f64, f64::max)
}

/// Vertical space taken by x tick labels after rotation.
pub(crate) fn x_tick_extent(canvas: &Canvas, x_axis: &Axis, style: &TextStyle) -> f64 {
    let w = max_label_width(canvas, &x_axis.tick_labels, style);
    let h = style.size;
    let theta = x_axis.tick_label_rotation.to_radians();
    (w * theta.sin().abs() + h * theta.cos().abs()).max(h)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rotated_labels_need_more_room() {
        let canvas = Canvas::new(400.0, 300.0);
        let config = VizConfig::default();
        let y = Axis::counts(1000.0, 6).with_label("count");
        let labels = ["rating value one", "rating value two"];
        let flat = PlotArea::auto(&canvas, &y, &Axis::categorical(&labels), &config);
        let rotated =
            PlotArea::auto(&canvas, &y, &Axis::categorical(&labels).with_rotation(90.0), &config);
        assert!(rotated.height < flat.height);
        assert!(flat.bottom() <= 300.0);
    }

    #[test]
    fn title_reserves_top_space() {
        let canvas = Canvas::new(400.0, 300.0);
        let y = Axis::counts(10.0, 6);
        let x = Axis::categorical(&["a"]);
        let plain = PlotArea::auto(&canvas, &y, &x, &VizConfig::default());
        let titled = VizConfig { title: Some("Ratings".into()), ..VizConfig::default() };
        let with_title = PlotArea::auto(&canvas, &y, &x, &titled);
        assert!(with_title.top > plain.top);
    }
}
