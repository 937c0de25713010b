//! Text measurement without a font rasterizer.
//!
//! Widths come from per-glyph advance classes of a generic sans-serif face,
//! in ems. Good enough for margins and label collision checks; the final
//! glyphs are drawn by whatever font the SVG consumer picks.

use crate::primitives::{FontWeight, TextStyle};

#[derive(Debug, Clone, Copy)]
pub struct TextMetrics {
    pub width: f64,
    pub height: f64,
    pub ascent: f64,
}

const ASCENT_EM: f64 = 0.93;
const DESCENT_EM: f64 = 0.24;
const BOLD_WIDEN: f64 = 1.06;

fn advance_em(ch: char) -> f64 {
    match ch {
        ' ' | '.' | ',' | ':' | ';' | '!' | '\'' | '|' => 0.28,
        'i' | 'j' | 'l' | 'I' => 0.24,
        'f' | 't' | 'r' | '(' | ')' | '[' | ']' | '-' => 0.34,
        '0'..='9' => 0.56,
        'm' | 'w' => 0.84,
        'M' | 'W' => 0.92,
        'A'..='Z' => 0.67,
        '\u{00B1}' | '=' | '+' | '<' | '>' => 0.58,
        c if c.is_ascii() => 0.52,
        // CJK and other wide scripts
        _ => 0.9,
    }
}

/// Measure text width and height in points.
pub fn measure_text(text: &str, size_pt: f64, weight: FontWeight) -> TextMetrics {
    let ems: f64 = text.chars().map(advance_em).sum();
    let widen = if weight == FontWeight::Bold { BOLD_WIDEN } else { 1.0 };
    TextMetrics {
        width: ems * size_pt * widen,
        height: (ASCENT_EM + DESCENT_EM) * size_pt,
        ascent: ASCENT_EM * size_pt,
    }
}

pub fn measure_styled(text: &str, style: &TextStyle) -> TextMetrics {
    measure_text(text, style.size, style.weight)
}
