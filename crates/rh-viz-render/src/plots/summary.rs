use rh_viz::summary::{SummaryArtifact, SummaryColumn};

use crate::canvas::Canvas;
use crate::config::VizConfig;
use crate::header::draw_title;
use crate::layout::margins::PlotArea;
use crate::plots::axes_draw::draw_frame;
use crate::plots::empty_svg;
use crate::primitives::*;

const STATS: [&str; 5] = ["count", "mean", "stddev", "min", "max"];

/// The describe table: one row per statistic, one column per dataset column.
pub fn render(artifact: &SummaryArtifact, config: &VizConfig) -> crate::Result<String> {
    let columns = &artifact.columns;
    if columns.is_empty() {
        return Ok(empty_svg("No summary data"));
    }

    let header_style = TextStyle {
        size: config.font.tick_size,
        color: config.colors.text,
        weight: FontWeight::Bold,
        anchor: TextAnchor::End,
        baseline: TextBaseline::Central,
        ..Default::default()
    };
    let cell_style = TextStyle { weight: FontWeight::Regular, ..header_style.clone() };
    let stat_style = TextStyle { anchor: TextAnchor::Start, ..header_style.clone() };

    let cells: Vec<Vec<String>> = columns.iter().map(column_cells).collect();

    let meter = Canvas::new(0.0, 0.0);
    let pad = 10.0;
    let stat_w = STATS
        .iter()
        .map(|s| meter.measure_text(s, &stat_style).width)
        .fold(meter.measure_text("summary", &stat_style).width, f64::max)
        + 2.0 * pad;
    let col_ws: Vec<f64> = columns
        .iter()
        .zip(&cells)
        .map(|(c, vals)| {
            vals.iter()
                .map(|v| meter.measure_text(v, &cell_style).width)
                .fold(meter.measure_text(&c.name, &header_style).width, f64::max)
                + 2.0 * pad
        })
        .collect();

    let row_h = config.font.tick_size * 2.0;
    let table_w = stat_w + col_ws.iter().sum::<f64>();
    let table_h = row_h * (STATS.len() + 1) as f64;
    let top = match config.title.as_deref() {
        Some(t) if !t.is_empty() => config.font.title_size * 1.2 + 22.0,
        _ => 15.0,
    };
    let fig_w = table_w + 30.0;
    let fig_h = top + table_h + 15.0;

    let mut canvas = Canvas::new(fig_w, fig_h).with_background(config.figure.background);
    let area = PlotArea::manual(15.0, top, table_w, table_h);
    draw_title(&mut canvas, config);

    // Striped body rows
    for r in 0..STATS.len() {
        if r % 2 == 0 {
            let y = area.top + (r + 1) as f64 * row_h;
            canvas.rect(area.left, y, area.width, row_h, &Style::filled(config.colors.stripe));
        }
    }

    // Header row
    let header_y = area.top + row_h / 2.0;
    canvas.text(area.left + pad, header_y, "summary", &stat_style);
    let mut x = area.left + stat_w;
    for (c, w) in columns.iter().zip(&col_ws) {
        canvas.text(x + w - pad, header_y, &c.name, &header_style);
        x += w;
    }
    let sep = area.top + row_h;
    canvas.line(area.left, sep, area.right(), sep, &LineStyle::solid(config.colors.frame, 0.6));

    // Body
    let body_stat_style = TextStyle { weight: FontWeight::Regular, ..stat_style.clone() };
    for (r, stat) in STATS.iter().enumerate() {
        let y = area.top + (r as f64 + 1.5) * row_h;
        canvas.text(area.left + pad, y, stat, &body_stat_style);
        let mut x = area.left + stat_w;
        for (vals, w) in cells.iter().zip(&col_ws) {
            canvas.text(x + w - pad, y, &vals[r], &cell_style);
            x += w;
        }
    }

    draw_frame(&mut canvas, &area, config);
    canvas.finish_svg()
}

/// Cell text for each statistic, in `STATS` order.
fn column_cells(c: &SummaryColumn) -> Vec<String> {
    let num = |v: Option<f64>| v.map_or_else(|| "null".to_string(), format_stat);
    vec![
        c.count.to_string(),
        num(c.mean),
        num(c.stddev),
        c.min.clone().unwrap_or_else(|| "null".into()),
        c.max.clone().unwrap_or_else(|| "null".into()),
    ]
}

/// Up to six decimals, trailing zeros trimmed.
fn format_stat(v: f64) -> String {
    let s = format!("{v:.6}");
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s == "-0" { "0".into() } else { s.into() }
}
