use crate::color::Color;
use crate::config::*;

/// Built-in theme presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuiltinTheme {
    Ratehist,
    /// Looks like `DataFrame.plot(kind="bar")` with matplotlib defaults.
    Pandas,
    Minimal,
}

impl BuiltinTheme {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "ratehist" | "default" => Some(Self::Ratehist),
            "pandas" | "matplotlib" => Some(Self::Pandas),
            "minimal" => Some(Self::Minimal),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Ratehist => "ratehist",
            Self::Pandas => "pandas",
            Self::Minimal => "minimal",
        }
    }

    pub fn base_config(self) -> VizConfig {
        match self {
            Self::Ratehist => ratehist(),
            Self::Pandas => pandas(),
            Self::Minimal => minimal(),
        }
    }
}

fn ratehist() -> VizConfig {
    VizConfig {
        theme: "ratehist".into(),
        title: None,
        figure: FigureConfig::default(),
        font: FontConfig::default(),
        axes: AxesConfig::default(),
        grid: GridConfig::default(),
        colors: ColorsConfig::default(),
        palette: "ratehist".into(),
        legend: LegendConfig::default(),
        output: OutputConfig::default(),
        bar: BarConfig { show_values: true, ..BarConfig::default() },
    }
}

fn pandas() -> VizConfig {
    VizConfig {
        theme: "pandas".into(),
        font: FontConfig { size: 10.0, label_size: 10.0, tick_size: 10.0, title_size: 12.0 },
        axes: AxesConfig {
            tick_direction: "out".into(),
            show_top_ticks: false,
            show_right_ticks: false,
            tick_length: 3.5,
            minor_tick_length: 2.0,
            full_frame: true,
        },
        grid: GridConfig { show: false, ..GridConfig::default() },
        colors: ColorsConfig {
            bar: Color::hex("#1f77b4"),
            bar_edge: None,
            text: Color::rgb(0, 0, 0),
            frame: Color::rgb(0, 0, 0),
            stripe: Color::hex("#F5F5F5"),
        },
        palette: "tab10".into(),
        // pandas bar plots default to rot=90
        bar: BarConfig {
            width_frac: 0.5,
            show_values: false,
            rotate_labels: 90.0,
            color_by_category: false,
        },
        ..ratehist()
    }
}

fn minimal() -> VizConfig {
    VizConfig {
        theme: "minimal".into(),
        figure: FigureConfig { width: 432.0, height: 302.4, ..FigureConfig::default() },
        font: FontConfig { size: 9.0, label_size: 10.0, tick_size: 8.0, title_size: 11.0 },
        axes: AxesConfig { full_frame: false, ..AxesConfig::default() },
        grid: GridConfig { show: false, ..GridConfig::default() },
        colors: ColorsConfig { bar: Color::hex("#6B7280"), ..ColorsConfig::default() },
        palette: "grayscale".into(),
        legend: LegendConfig { show: false, frame: false },
        bar: BarConfig::default(),
        ..ratehist()
    }
}
