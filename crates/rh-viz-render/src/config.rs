use serde::{Deserialize, Serialize};
use serde_yaml_ng::Value;

use crate::RenderError;
use crate::color::Color;
use crate::theme::BuiltinTheme;

/// Top-level visualization configuration (YAML or programmatic).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VizConfig {
    pub theme: String,
    /// Chart title; no title row when unset.
    pub title: Option<String>,
    pub figure: FigureConfig,
    pub font: FontConfig,
    pub axes: AxesConfig,
    pub grid: GridConfig,
    pub colors: ColorsConfig,
    pub palette: String,
    pub legend: LegendConfig,
    pub output: OutputConfig,
    pub bar: BarConfig,
}

impl Default for VizConfig {
    fn default() -> Self {
        BuiltinTheme::Ratehist.base_config()
    }
}

impl VizConfig {
    pub fn palette_colors(&self) -> Vec<Color> {
        crate::color::palette_colors(&self.palette)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FigureConfig {
    pub width: f64,
    pub height: f64,
    pub background: Color,
}

impl Default for FigureConfig {
    fn default() -> Self {
        Self {
            width: 460.8,  // 6.4" * 72
            height: 345.6, // 4.8" * 72
            background: Color::rgb(255, 255, 255),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FontConfig {
    pub size: f64,
    pub label_size: f64,
    pub tick_size: f64,
    pub title_size: f64,
}

impl Default for FontConfig {
    fn default() -> Self {
        Self { size: 10.0, label_size: 11.0, tick_size: 9.0, title_size: 13.0 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AxesConfig {
    pub tick_direction: String,
    pub show_top_ticks: bool,
    pub show_right_ticks: bool,
    pub tick_length: f64,
    pub minor_tick_length: f64,
    /// Draw top/right spines.
    pub full_frame: bool,
}

impl Default for AxesConfig {
    fn default() -> Self {
        Self {
            tick_direction: "out".into(),
            show_top_ticks: false,
            show_right_ticks: false,
            tick_length: 4.0,
            minor_tick_length: 2.0,
            full_frame: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    pub show: bool,
    pub color: Color,
    pub alpha: f64,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self { show: true, color: Color::hex("#CBD5E1"), alpha: 0.7 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorsConfig {
    pub bar: Color,
    pub bar_edge: Option<Color>,
    pub text: Color,
    pub frame: Color,
    /// Alternating row fill in tables.
    pub stripe: Color,
}

impl Default for ColorsConfig {
    fn default() -> Self {
        Self {
            bar: Color::hex("#4C78A8"),
            bar_edge: None,
            text: Color::hex("#111827"),
            frame: Color::hex("#111827"),
            stripe: Color::hex("#F3F4F6"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LegendConfig {
    pub show: bool,
    pub frame: bool,
}

impl Default for LegendConfig {
    fn default() -> Self {
        Self { show: true, frame: true }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub format: String,
    pub dpi: u32,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { format: "svg".into(), dpi: 144 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BarConfig {
    /// Bar width as a fraction of the category slot, clamped to (0, 1].
    pub width_frac: f64,
    /// Print each count above its bar.
    pub show_values: bool,
    /// Category label rotation in degrees (pandas `rot`).
    pub rotate_labels: f64,
    /// Cycle the palette across bars instead of using `colors.bar`.
    pub color_by_category: bool,
}

impl Default for BarConfig {
    fn default() -> Self {
        Self { width_frac: 0.8, show_values: false, rotate_labels: 0.0, color_by_category: false }
    }
}

impl BarConfig {
    pub fn effective_width_frac(&self) -> f64 {
        if self.width_frac.is_finite() && self.width_frac > 0.0 {
            self.width_frac.min(1.0)
        } else {
            BarConfig::default().width_frac
        }
    }
}

/// Resolve a VizConfig from an optional YAML string.
///
/// The document's `theme` key picks the base preset; every other key is
/// deep-merged over that preset, so a file only needs the values it changes.
pub fn resolve_config(user_yaml: Option<&str>) -> crate::Result<VizConfig> {
    let Some(yaml) = user_yaml else {
        return Ok(VizConfig::default());
    };
    let user: Value = serde_yaml_ng::from_str(yaml).map_err(config_err)?;
    if user.is_null() {
        return Ok(VizConfig::default());
    }
    if !user.is_mapping() {
        return Err(RenderError::Config("viz config must be a YAML mapping".into()));
    }

    let theme_name = user.get("theme").and_then(Value::as_str).unwrap_or("ratehist");
    let theme = match BuiltinTheme::parse(theme_name) {
        Some(t) => t,
        None => {
            tracing::warn!(theme = theme_name, "unknown theme; using ratehist");
            BuiltinTheme::Ratehist
        }
    };

    let mut merged = serde_yaml_ng::to_value(theme.base_config()).map_err(config_err)?;
    merge_yaml(&mut merged, user);
    let mut config: VizConfig = serde_yaml_ng::from_value(merged).map_err(config_err)?;
    config.theme = theme.name().into();
    Ok(config)
}

fn config_err(e: serde_yaml_ng::Error) -> RenderError {
    RenderError::Config(e.to_string())
}

/// Recursively overlay `overlay` onto `base`; mappings merge, everything else replaces.
fn merge_yaml(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Mapping(b), Value::Mapping(o)) => {
            for (k, v) in o {
                match b.get_mut(&k) {
                    Some(slot) => merge_yaml(slot, v),
                    None => {
                        b.insert(k, v);
                    }
                }
            }
        }
        (slot, v) => *slot = v,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_yaml_gives_default_theme() {
        let c = resolve_config(None).unwrap();
        assert_eq!(c.theme, "ratehist");
        assert!(c.title.is_none());
    }

    #[test]
    fn partial_yaml_keeps_theme_values() {
        let c = resolve_config(Some("theme: pandas\nbar:\n  show_values: true\n")).unwrap();
        let pandas = BuiltinTheme::Pandas.base_config();
        assert_eq!(c.theme, "pandas");
        assert!(c.bar.show_values);
        assert_eq!(c.bar.rotate_labels, pandas.bar.rotate_labels);
        assert_eq!(c.colors.bar, pandas.colors.bar);
        assert_eq!(c.figure.width, pandas.figure.width);
    }

    #[test]
    fn title_and_colors_override() {
        let yaml = "title: Ratings\ncolors:\n  bar: '#ff0000'\nfigure:\n  width: 300\n";
        let c = resolve_config(Some(yaml)).unwrap();
        assert_eq!(c.title.as_deref(), Some("Ratings"));
        assert_eq!(c.colors.bar, Color::rgb(255, 0, 0));
        assert_eq!(c.figure.width, 300.0);
        assert_eq!(c.figure.height, VizConfig::default().figure.height);
    }

    #[test]
    fn unknown_theme_falls_back() {
        let c = resolve_config(Some("theme: neon\n")).unwrap();
        assert_eq!(c.theme, "ratehist");
    }

    #[test]
    fn empty_document_is_default() {
        let c = resolve_config(Some("")).unwrap();
        assert_eq!(c.theme, "ratehist");
    }

    #[test]
    fn scalar_document_rejected() {
        assert!(matches!(resolve_config(Some("42")), Err(RenderError::Config(_))));
    }

    #[test]
    fn width_frac_clamped() {
        let mut bar = BarConfig { width_frac: 1.7, ..Default::default() };
        assert_eq!(bar.effective_width_frac(), 1.0);
        bar.width_frac = -1.0;
        assert_eq!(bar.effective_width_frac(), 0.8);
    }
}
