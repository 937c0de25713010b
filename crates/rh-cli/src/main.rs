//! ratehist CLI

mod config;
mod pipeline;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use arrow::record_batch::RecordBatch;
use clap::{Args, Parser, Subcommand};
use rh_core::schema::RATING;
use rh_core::{SaveMode, TableIdent, TableSchema};
use rh_ingest::csv::{CsvReadOptions, ParseMode, read_csv};
use rh_ingest::parquet::{read_parquet_batches, read_parquet_schema};
use rh_ingest::schema::from_arrow_schema;
use rh_viz::{HistogramArtifact, SummaryArtifact};

use crate::config::{PipelineConfig, read_pipeline_config};

#[derive(Parser)]
#[command(name = "ratehist")]
#[command(about = "ratehist - movie ratings: describe, store as Parquet, chart the rating histogram")]
#[command(version)]
struct Cli {
    /// Log verbosity level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "warn")]
    log_level: tracing::Level,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Full pipeline: load, preview, describe, save table, aggregate, chart
    Run(RunArgs),

    /// Print the declared ratings schema (JSON)
    Schema,

    /// Per-column summary statistics of a ratings CSV or Parquet file
    Describe {
        /// Ratings CSV, or a `.parquet` file
        #[arg(short, long)]
        input: PathBuf,

        /// Print the summary artifact as JSON instead of a table
        #[arg(long)]
        json: bool,

        #[command(flatten)]
        csv: CsvArgs,
    },

    /// Rating-frequency histogram artifact (plot-friendly JSON)
    Histogram {
        /// Ratings CSV, or a `.parquet` file
        #[arg(short, long)]
        input: PathBuf,

        /// Output file (pretty JSON). Defaults to stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        csv: CsvArgs,
    },

    /// Render an artifact JSON to SVG (PNG/PDF when built with those features)
    Render {
        /// Artifact JSON (from `histogram` or `describe --json`)
        #[arg(short, long)]
        input: PathBuf,

        /// Artifact kind
        #[arg(long, default_value = "histogram", value_parser = ["histogram", "bar", "summary", "describe"])]
        kind: String,

        /// Output file; the extension picks the format
        #[arg(short, long)]
        output: PathBuf,

        /// Viz config YAML (theme, colors, bar settings, ...)
        #[arg(long)]
        viz_config: Option<PathBuf>,
    },

    /// List the tables of a warehouse database
    Tables {
        /// Warehouse root
        #[arg(long, default_value = config::DEFAULT_WAREHOUSE)]
        warehouse: PathBuf,

        /// Database name
        #[arg(long)]
        database: String,
    },

    /// Print version information
    Version,
}

/// `run` flags. Each one overrides the config file.
#[derive(Args)]
struct RunArgs {
    /// Ratings CSV
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Pipeline config (YAML, or JSON by extension)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Warehouse root [default: spark-warehouse]
    #[arg(long)]
    warehouse: Option<PathBuf>,

    /// Target table, `database.table` [default: sundogdata.movielens_ratings]
    #[arg(long)]
    table: Option<TableIdent>,

    /// Save mode: overwrite, append, error_if_exists, ignore [default: overwrite]
    #[arg(long)]
    mode: Option<SaveMode>,

    /// Chart output (.svg, .png, .pdf) [default: rating_histogram.svg]
    #[arg(long)]
    chart: Option<PathBuf>,

    /// Rows shown in the preview [default: 5]
    #[arg(long)]
    preview_rows: Option<usize>,

    /// Malformed-row policy: permissive, drop_malformed, fail_fast [default: permissive]
    #[arg(long)]
    parse_mode: Option<ParseMode>,

    /// Field delimiter [default: ,]
    #[arg(long)]
    delimiter: Option<char>,

    /// Input has no header row
    #[arg(long)]
    no_header: bool,

    /// Write a JSON run report here
    #[arg(short, long)]
    output: Option<PathBuf>,
}

impl RunArgs {
    fn apply(self, cfg: &mut PipelineConfig) {
        if let Some(v) = self.input {
            cfg.input = Some(v);
        }
        if let Some(v) = self.warehouse {
            cfg.warehouse = v;
        }
        if let Some(v) = self.table {
            cfg.table = v.to_string();
        }
        if let Some(v) = self.mode {
            cfg.mode = v;
        }
        if let Some(v) = self.chart {
            cfg.chart = v;
        }
        if let Some(v) = self.preview_rows {
            cfg.preview_rows = v;
        }
        if let Some(v) = self.parse_mode {
            cfg.csv.mode = v;
        }
        if let Some(v) = self.delimiter {
            cfg.csv.delimiter = v;
        }
        if self.no_header {
            cfg.csv.has_header = false;
        }
        if let Some(v) = self.output {
            cfg.output = Some(v);
        }
    }
}

/// CSV reading flags shared by `describe` and `histogram`.
#[derive(Args)]
struct CsvArgs {
    /// Malformed-row policy: permissive, drop_malformed, fail_fast
    #[arg(long, default_value = "permissive")]
    parse_mode: ParseMode,

    /// Field delimiter
    #[arg(long, default_value = ",")]
    delimiter: char,

    /// Input has no header row
    #[arg(long)]
    no_header: bool,
}

impl CsvArgs {
    fn options(&self) -> CsvReadOptions {
        CsvReadOptions {
            has_header: !self.no_header,
            delimiter: self.delimiter,
            mode: self.parse_mode,
            ..CsvReadOptions::default()
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(cli.log_level)
        .with_target(false)
        .init();

    match cli.command {
        Commands::Run(args) => cmd_run(args),
        Commands::Schema => write_json(None, serde_json::to_value(TableSchema::ratings())?),
        Commands::Describe { input, json, csv } => cmd_describe(&input, json, &csv.options()),
        Commands::Histogram { input, output, csv } => {
            cmd_histogram(&input, output.as_deref(), &csv.options())
        }
        Commands::Render { input, kind, output, viz_config } => {
            cmd_render(&input, &kind, &output, viz_config.as_deref())
        }
        Commands::Tables { warehouse, database } => cmd_tables(&warehouse, &database),
        Commands::Version => {
            println!("ratehist {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

fn cmd_run(args: RunArgs) -> Result<()> {
    let mut cfg = match &args.config {
        Some(path) => read_pipeline_config(path)?,
        None => PipelineConfig::default(),
    };
    args.apply(&mut cfg);
    let run = cfg.resolve()?;

    let stdout = std::io::stdout();
    let report = pipeline::run_pipeline(&run, &mut stdout.lock())?;

    if let Some(path) = &run.output {
        write_json(Some(path), serde_json::to_value(&report)?)?;
        tracing::info!(path = %path.display(), "run report written");
    }
    Ok(())
}

fn cmd_describe(input: &Path, json: bool, csv: &CsvReadOptions) -> Result<()> {
    let (schema, batches) = load_input(input, csv)?;
    let table = rh_ingest::describe::describe(&batches, &schema).context("describing input")?;
    if json {
        write_json(None, serde_json::to_value(SummaryArtifact::from_describe(&table))?)
    } else {
        println!("{}", table.show()?);
        Ok(())
    }
}

fn cmd_histogram(input: &Path, output: Option<&Path>, csv: &CsvReadOptions) -> Result<()> {
    let (_, batches) = load_input(input, csv)?;
    let counts = rh_ingest::aggregate::rating_counts(&batches, RATING)?;
    let artifact = HistogramArtifact::from_counts(&counts, RATING, "count");
    write_json(output, serde_json::to_value(artifact)?)
}

fn cmd_render(input: &Path, kind: &str, output: &Path, viz_config: Option<&Path>) -> Result<()> {
    let json = std::fs::read_to_string(input)
        .with_context(|| format!("reading artifact {}", input.display()))?;
    let yaml = viz_config
        .map(|p| {
            std::fs::read_to_string(p).with_context(|| format!("reading viz config {}", p.display()))
        })
        .transpose()?;
    let config = rh_viz_render::config::resolve_config(yaml.as_deref())?;
    rh_viz_render::render_to_file(&json, kind, output, &config)
        .with_context(|| format!("rendering {}", output.display()))?;
    eprintln!("wrote {}", output.display());
    Ok(())
}

fn cmd_tables(warehouse: &Path, database: &str) -> Result<()> {
    let catalog = rh_ingest::catalog::Catalog::new(warehouse);
    for table in catalog.list_tables(database)? {
        println!("{table}");
    }
    Ok(())
}

/// Load a CSV under the ratings schema, or a Parquet file under its own schema.
fn load_input(path: &Path, csv: &CsvReadOptions) -> Result<(TableSchema, Vec<RecordBatch>)> {
    let is_parquet = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("parquet"));
    if is_parquet {
        let schema = read_parquet_schema(path)
            .with_context(|| format!("reading schema of {}", path.display()))?;
        let batches = read_parquet_batches(path)
            .with_context(|| format!("reading {}", path.display()))?;
        Ok((from_arrow_schema(&schema)?, batches))
    } else {
        let schema = TableSchema::ratings();
        let loaded =
            read_csv(path, &schema, csv).with_context(|| format!("loading {}", path.display()))?;
        Ok((schema, loaded.batches))
    }
}

fn write_json(output: Option<&Path>, value: serde_json::Value) -> Result<()> {
    if let Some(path) = output {
        std::fs::write(path, serde_json::to_string_pretty(&value)?)
            .with_context(|| format!("writing {}", path.display()))?;
    } else {
        println!("{}", serde_json::to_string_pretty(&value)?);
    }
    Ok(())
}
