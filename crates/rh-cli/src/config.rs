//! Pipeline configuration file (`ratehist run --config`).

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rh_core::{SaveMode, TableIdent};
use rh_ingest::csv::CsvReadOptions;
use rh_viz_render::config::{VizConfig, resolve_config};
use serde::{Deserialize, Serialize};

pub const DEFAULT_TABLE: &str = "sundogdata.movielens_ratings";
pub const DEFAULT_WAREHOUSE: &str = "spark-warehouse";
pub const DEFAULT_CHART: &str = "rating_histogram.svg";
pub const DEFAULT_PREVIEW_ROWS: usize = 5;

/// On-disk form. Every key is optional.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    /// Ratings CSV.
    pub input: Option<PathBuf>,
    /// Warehouse root for saved tables.
    pub warehouse: PathBuf,
    /// `database.table`
    pub table: String,
    pub mode: SaveMode,
    /// Chart path; the extension picks the format.
    pub chart: PathBuf,
    pub preview_rows: usize,
    /// JSON run report path.
    pub output: Option<PathBuf>,
    pub csv: CsvReadOptions,
    /// Chart styling, same keys as a standalone viz config file.
    pub viz: Option<serde_yaml_ng::Value>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            input: None,
            warehouse: DEFAULT_WAREHOUSE.into(),
            table: DEFAULT_TABLE.into(),
            mode: SaveMode::Overwrite,
            chart: DEFAULT_CHART.into(),
            preview_rows: DEFAULT_PREVIEW_ROWS,
            output: None,
            csv: CsvReadOptions::default(),
            viz: None,
        }
    }
}

/// Everything a run needs, validated.
#[derive(Debug, Clone)]
pub struct ResolvedRun {
    pub input: PathBuf,
    pub warehouse: PathBuf,
    pub table: TableIdent,
    pub mode: SaveMode,
    pub chart: PathBuf,
    pub preview_rows: usize,
    pub output: Option<PathBuf>,
    pub csv: CsvReadOptions,
    pub viz: VizConfig,
}

impl PipelineConfig {
    pub fn resolve(self) -> Result<ResolvedRun> {
        let input = self
            .input
            .context("no input file: pass --input or set `input` in the config file")?;
        let table: TableIdent =
            self.table.parse().with_context(|| format!("invalid table name '{}'", self.table))?;
        let viz = match &self.viz {
            Some(v) => {
                let yaml = serde_yaml_ng::to_string(v).context("re-encoding viz section")?;
                resolve_config(Some(&yaml)).context("invalid viz section")?
            }
            None => VizConfig::default(),
        };
        // Reject an unwritable chart format before anything is persisted.
        rh_viz_render::check_format(rh_viz_render::format_for_path(&self.chart, &viz))
            .with_context(|| format!("invalid chart path {}", self.chart.display()))?;
        Ok(ResolvedRun {
            input,
            warehouse: self.warehouse,
            table,
            mode: self.mode,
            chart: self.chart,
            preview_rows: self.preview_rows,
            output: self.output,
            csv: self.csv,
            viz,
        })
    }
}

/// Read YAML (default) or JSON (`.json` extension).
pub fn read_pipeline_config(path: &Path) -> Result<PipelineConfig> {
    let bytes =
        std::fs::read(path).with_context(|| format!("reading config {}", path.display()))?;
    let ext = path.extension().and_then(|s| s.to_str()).unwrap_or("").to_ascii_lowercase();
    let cfg: PipelineConfig = if ext == "json" {
        serde_json::from_slice(&bytes)
            .with_context(|| format!("parsing config {}", path.display()))?
    } else if bytes.iter().all(u8::is_ascii_whitespace) {
        PipelineConfig::default()
    } else {
        serde_yaml_ng::from_slice(&bytes)
            .with_context(|| format!("parsing config {}", path.display()))?
    };
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rh_ingest::csv::ParseMode;

    #[test]
    fn defaults_mirror_the_notebook() {
        let cfg = PipelineConfig { input: Some("ratings.csv".into()), ..Default::default() };
        let run = cfg.resolve().unwrap();
        assert_eq!(run.table.to_string(), DEFAULT_TABLE);
        assert_eq!(run.mode, SaveMode::Overwrite);
        assert_eq!(run.preview_rows, 5);
        assert_eq!(run.chart, PathBuf::from("rating_histogram.svg"));
        assert_eq!(run.viz.theme, "ratehist");
    }

    #[test]
    fn missing_input_is_an_error() {
        let err = PipelineConfig::default().resolve().unwrap_err();
        assert!(err.to_string().contains("no input file"));
    }

    #[test]
    fn yaml_with_nested_sections() {
        let yaml = r#"
input: data/ratings.csv
table: movies.ratings
mode: append
csv:
  delimiter: "\t"
  mode: drop_malformed
viz:
  theme: minimal
  title: Ratings
"#;
        let cfg: PipelineConfig = serde_yaml_ng::from_str(yaml).unwrap();
        let run = cfg.resolve().unwrap();
        assert_eq!(run.table.database(), "movies");
        assert_eq!(run.mode, SaveMode::Append);
        assert_eq!(run.csv.delimiter, '\t');
        assert_eq!(run.csv.mode, ParseMode::DropMalformed);
        assert!(run.csv.has_header);
        assert_eq!(run.viz.theme, "minimal");
        assert_eq!(run.viz.title.as_deref(), Some("Ratings"));
    }

    #[test]
    fn unknown_keys_rejected() {
        let res: std::result::Result<PipelineConfig, _> = serde_yaml_ng::from_str("inptu: x.csv\n");
        assert!(res.is_err());
    }

    #[test]
    fn unsupported_chart_format_rejected() {
        let cfg = PipelineConfig {
            input: Some("r.csv".into()),
            chart: "chart.bmp".into(),
            ..Default::default()
        };
        let err = cfg.resolve().unwrap_err();
        assert!(format!("{err:#}").contains("unsupported output format: bmp"), "{err:#}");
    }

    #[test]
    fn yaml_save_mode_spellings() {
        let cfg: PipelineConfig =
            serde_yaml_ng::from_str("input: r.csv\nmode: errorifexists\n").unwrap();
        assert_eq!(cfg.resolve().unwrap().mode, SaveMode::ErrorIfExists);
    }

    #[test]
    fn bad_table_name() {
        let cfg = PipelineConfig {
            input: Some("r.csv".into()),
            table: "just_a_table".into(),
            ..Default::default()
        };
        assert!(cfg.resolve().is_err());
    }
}
