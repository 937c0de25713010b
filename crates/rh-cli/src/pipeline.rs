//! `ratehist run`: load, preview, describe, persist, aggregate, chart.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use rh_core::TableSchema;
use rh_core::schema::RATING;
use rh_ingest::aggregate::{rating_counts, rating_counts_to_batch};
use rh_ingest::catalog::{Catalog, SaveAction};
use rh_ingest::csv::{LoadStats, read_csv};
use rh_ingest::describe::describe;
use rh_ingest::preview::{format_table, take};
use rh_viz::{HistogramArtifact, SummaryArtifact};
use serde::Serialize;

use crate::config::ResolvedRun;

/// Machine-readable summary of a run (`--output`).
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub input: PathBuf,
    pub table: String,
    pub table_path: PathBuf,
    pub save_action: SaveAction,
    pub rows_written: usize,
    pub load: LoadStats,
    pub summary: SummaryArtifact,
    pub histogram: HistogramArtifact,
    pub chart: PathBuf,
}

/// Run every step in order, printing the human-readable output to `out`.
pub fn run_pipeline<W: Write>(run: &ResolvedRun, out: &mut W) -> Result<RunReport> {
    // 1. Schema
    let schema = TableSchema::ratings();

    // 2. Load
    tracing::info!(path = %run.input.display(), mode = %run.csv.mode, "loading ratings");
    let loaded = read_csv(&run.input, &schema, &run.csv)
        .with_context(|| format!("loading {}", run.input.display()))?;
    if loaded.stats.rows_dropped > 0 {
        tracing::warn!(rows = loaded.stats.rows_dropped, "dropped malformed rows");
    }

    // 3. Preview
    let head = take(&loaded.batches, run.preview_rows);
    writeln!(out, "{}", format_table(&head).context("formatting preview")?)?;
    if loaded.num_rows() > run.preview_rows {
        writeln!(out, "only showing top {} rows", run.preview_rows)?;
    }
    writeln!(out)?;

    // 4. Describe
    let described = describe(&loaded.batches, &schema).context("describing ratings")?;
    writeln!(out, "{}", described.show().context("formatting describe table")?)?;
    writeln!(out)?;

    // 5. Persist
    let catalog = Catalog::new(&run.warehouse);
    let saved = catalog
        .save_as_table(&run.table, &loaded.arrow_schema, &loaded.batches, run.mode)
        .with_context(|| format!("saving table {}", run.table))?;
    tracing::info!(
        table = %saved.table,
        path = %saved.path.display(),
        rows = saved.rows_written,
        action = ?saved.action,
        "table saved"
    );

    // 6. Aggregate the loaded rows, whatever the save mode did with them.
    let counts = rating_counts(&loaded.batches, RATING).context("aggregating ratings")?;

    // 7. Materialize
    let counts_batch = rating_counts_to_batch(&counts).context("materializing counts")?;
    writeln!(out, "{}", format_table(&[counts_batch]).context("formatting counts")?)?;

    // 8. Visualize
    let histogram = HistogramArtifact::from_counts(&counts, RATING, "count");
    let json = serde_json::to_string(&histogram)?;
    rh_viz_render::render_to_file(&json, "histogram", &run.chart, &run.viz)
        .with_context(|| format!("rendering chart {}", run.chart.display()))?;
    writeln!(out, "chart written to {}", run.chart.display())?;

    Ok(RunReport {
        input: run.input.clone(),
        table: run.table.to_string(),
        table_path: saved.path,
        save_action: saved.action,
        rows_written: saved.rows_written,
        load: loaded.stats,
        summary: SummaryArtifact::from_describe(&described),
        histogram,
        chart: run.chart.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PipelineConfig;
    use rh_core::SaveMode;

    const CSV: &str = "userId,movieId,rating,timestamp\n\
                       1,31,2.5,1260759144\n\
                       1,1029,3.0,1260759179\n\
                       2,10,4.0,835355493\n\
                       3,60,3.0,1298861675\n\
                       4,10,oops,949810582\n";

    fn resolved(dir: &std::path::Path, mode: SaveMode) -> ResolvedRun {
        let input = dir.join("ratings.csv");
        std::fs::write(&input, CSV).unwrap();
        PipelineConfig {
            input: Some(input),
            warehouse: dir.join("warehouse"),
            chart: dir.join("chart.svg"),
            mode,
            preview_rows: 2,
            ..Default::default()
        }
        .resolve()
        .unwrap()
    }

    #[test]
    fn end_to_end_in_memory() {
        let dir = tempfile::tempdir().unwrap();
        let run = resolved(dir.path(), SaveMode::Overwrite);
        let mut out = Vec::new();
        let report = run_pipeline(&run, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.contains("only showing top 2 rows"));
        assert!(text.contains("stddev"));
        assert_eq!(report.rows_written, 5);
        assert_eq!(report.save_action, SaveAction::Created);
        assert_eq!(report.load.malformed_fields, 1);

        // null group first, then ascending
        let labels: Vec<&str> = report.histogram.bars.iter().map(|b| b.label.as_str()).collect();
        assert_eq!(labels, vec!["null", "2.5", "3.0", "4.0"]);
        assert_eq!(report.histogram.total(), 5);
        assert!(run.chart.exists());
        assert!(report.table_path.join("part-00000.parquet").exists());
    }

    #[test]
    fn rerun_overwrites_and_append_doubles() {
        let dir = tempfile::tempdir().unwrap();
        let run = resolved(dir.path(), SaveMode::Overwrite);
        run_pipeline(&run, &mut Vec::new()).unwrap();
        let again = run_pipeline(&run, &mut Vec::new()).unwrap();
        assert_eq!(again.save_action, SaveAction::Replaced);
        assert_eq!(again.histogram.total(), 5);

        let append = ResolvedRun { mode: SaveMode::Append, ..run };
        let report = run_pipeline(&append, &mut Vec::new()).unwrap();
        assert_eq!(report.save_action, SaveAction::Appended);
        assert_eq!(report.histogram.total(), 5);
        let stored: usize = Catalog::new(&append.warehouse)
            .read_table(&append.table)
            .unwrap()
            .iter()
            .map(|b| b.num_rows())
            .sum();
        assert_eq!(stored, 10);
    }

    #[test]
    fn ignore_mode_still_counts_the_loaded_rows() {
        let dir = tempfile::tempdir().unwrap();
        let run = resolved(dir.path(), SaveMode::Overwrite);
        run_pipeline(&run, &mut Vec::new()).unwrap();

        let other = dir.path().join("other.csv");
        std::fs::write(&other, "userId,movieId,rating,timestamp\n9,1,5.0,1\n9,2,5.0,2\n").unwrap();
        let ignore = ResolvedRun { input: other, mode: SaveMode::Ignore, ..run };
        let mut out = Vec::new();
        let report = run_pipeline(&ignore, &mut out).unwrap();

        assert_eq!(report.save_action, SaveAction::Skipped);
        assert_eq!(report.rows_written, 0);
        let bars: Vec<(&str, u64)> =
            report.histogram.bars.iter().map(|b| (b.label.as_str(), b.count)).collect();
        assert_eq!(bars, vec![("5.0", 2)]);
        let text = String::from_utf8(out).unwrap();
        assert!(!text.contains("2.5"));
    }

    #[test]
    fn error_if_exists_fails_second_run() {
        let dir = tempfile::tempdir().unwrap();
        let run = resolved(dir.path(), SaveMode::ErrorIfExists);
        run_pipeline(&run, &mut Vec::new()).unwrap();
        let err = run_pipeline(&run, &mut Vec::new()).unwrap_err();
        assert!(format!("{err:#}").contains("already exists"));
    }
}
