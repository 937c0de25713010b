use std::path::PathBuf;
use std::process::{Command, Output};

fn bin_path() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_ratehist"))
}

fn repo_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../..").canonicalize().unwrap()
}

fn fixture_path(name: &str) -> PathBuf {
    repo_root().join("tests/fixtures").join(name)
}

fn run(args: &[&str]) -> Output {
    Command::new(bin_path())
        .args(args)
        .output()
        .unwrap_or_else(|e| panic!("failed to run {:?} {:?}: {}", bin_path(), args, e))
}

fn s(p: &std::path::Path) -> String {
    p.to_string_lossy().into_owned()
}

#[test]
fn run_pipeline_end_to_end() {
    let input = fixture_path("ratings_small.csv");
    assert!(input.exists(), "missing fixture: {}", input.display());
    let tmp = tempfile::tempdir().unwrap();
    let warehouse = tmp.path().join("warehouse");
    let chart = tmp.path().join("rating_histogram.svg");
    let report = tmp.path().join("report.json");

    let out = run(&[
        "run",
        "--input",
        &s(&input),
        "--warehouse",
        &s(&warehouse),
        "--chart",
        &s(&chart),
        "--output",
        &s(&report),
    ]);
    assert!(
        out.status.success(),
        "run should succeed, stderr={}",
        String::from_utf8_lossy(&out.stderr)
    );

    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("only showing top 5 rows"), "stdout={stdout}");
    for needle in ["userid", "summary", "stddev", "epoch_time_seconds", "count"] {
        assert!(stdout.contains(needle), "missing {needle} in stdout={stdout}");
    }

    let table_dir = warehouse.join("sundogdata.db").join("movielens_ratings");
    assert!(table_dir.join("part-00000.parquet").exists());

    let svg = std::fs::read_to_string(&chart).unwrap();
    assert!(svg.starts_with("<svg"));
    assert!(svg.contains(">rating<"));

    let v: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&report).unwrap()).unwrap();
    assert_eq!(v["table"], "sundogdata.movielens_ratings");
    assert_eq!(v["rows_written"], 20);
    assert_eq!(v["save_action"], "created");
    let bars = v["histogram"]["bars"].as_array().unwrap();
    let labels: Vec<&str> = bars.iter().map(|b| b["label"].as_str().unwrap()).collect();
    assert_eq!(labels, vec!["0.5", "2.0", "2.5", "3.0", "3.5", "4.0", "5.0"]);
    let counts: Vec<u64> = bars.iter().map(|b| b["count"].as_u64().unwrap()).collect();
    assert_eq!(counts, vec![1, 1, 1, 5, 1, 7, 4]);
    assert_eq!(v["summary"]["columns"][0]["count"], 20);
}

#[test]
fn run_twice_overwrites_by_default() {
    let input = fixture_path("ratings_small.csv");
    let tmp = tempfile::tempdir().unwrap();
    let warehouse = tmp.path().join("wh");
    let chart = tmp.path().join("c.svg");
    let report = tmp.path().join("r.json");
    let args = [
        "run",
        "--input",
        &s(&input),
        "--warehouse",
        &s(&warehouse),
        "--chart",
        &s(&chart),
        "--output",
        &s(&report),
    ];

    assert!(run(&args).status.success());
    let out = run(&args);
    assert!(out.status.success(), "stderr={}", String::from_utf8_lossy(&out.stderr));
    let v: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&report).unwrap()).unwrap();
    assert_eq!(v["save_action"], "replaced");
    assert_eq!(v["histogram"]["bars"][5]["count"], 7);
}

#[test]
fn run_error_if_exists_fails_on_second_run() {
    let input = fixture_path("ratings_small.csv");
    let tmp = tempfile::tempdir().unwrap();
    let warehouse = tmp.path().join("wh");
    let chart = tmp.path().join("c.svg");
    let args = [
        "run",
        "--input",
        &s(&input),
        "--warehouse",
        &s(&warehouse),
        "--chart",
        &s(&chart),
        "--mode",
        "error_if_exists",
    ];

    assert!(run(&args).status.success());
    let out = run(&args);
    assert!(!out.status.success());
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("already exists"), "stderr={stderr}");
}

#[test]
fn run_with_config_file() {
    let input = fixture_path("ratings_small.csv");
    let config = fixture_path("pipeline.yaml");
    let tmp = tempfile::tempdir().unwrap();
    let warehouse = tmp.path().join("wh");
    let chart = tmp.path().join("c.svg");

    let out = run(&[
        "run",
        "--config",
        &s(&config),
        "--input",
        &s(&input),
        "--warehouse",
        &s(&warehouse),
        "--chart",
        &s(&chart),
    ]);
    assert!(out.status.success(), "stderr={}", String::from_utf8_lossy(&out.stderr));
    assert!(String::from_utf8_lossy(&out.stdout).contains("only showing top 3 rows"));
    let svg = std::fs::read_to_string(&chart).unwrap();
    assert!(svg.contains(">Ratings<"));
}

#[test]
fn run_fail_fast_on_malformed_input() {
    let input = fixture_path("ratings_malformed.csv");
    let tmp = tempfile::tempdir().unwrap();
    let out = run(&[
        "run",
        "--input",
        &s(&input),
        "--warehouse",
        &s(&tmp.path().join("wh")),
        "--chart",
        &s(&tmp.path().join("c.svg")),
        "--parse-mode",
        "fail_fast",
    ]);
    assert!(!out.status.success());
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("line 3"), "stderr={stderr}");
    assert!(!tmp.path().join("wh").exists());
}

#[test]
fn run_requires_input() {
    let out = run(&["run"]);
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("no input file"));
}

#[test]
fn run_rejects_bad_table_name() {
    let input = fixture_path("ratings_small.csv");
    let out = run(&["run", "--input", &s(&input), "--table", "no_database"]);
    assert!(!out.status.success());
}

#[test]
fn run_rejects_unsupported_chart_format_before_saving() {
    let input = fixture_path("ratings_small.csv");
    let tmp = tempfile::tempdir().unwrap();
    let out = run(&[
        "run",
        "--input",
        &s(&input),
        "--warehouse",
        &s(&tmp.path().join("wh")),
        "--chart",
        &s(&tmp.path().join("chart.bmp")),
    ]);
    assert!(!out.status.success());
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("unsupported output format"), "stderr={stderr}");
    assert!(!tmp.path().join("wh").exists());
}

#[test]
fn run_ignore_mode_charts_the_loaded_input() {
    let tmp = tempfile::tempdir().unwrap();
    let warehouse = tmp.path().join("wh");
    let first = run(&[
        "run",
        "--input",
        &s(&fixture_path("ratings_small.csv")),
        "--warehouse",
        &s(&warehouse),
        "--chart",
        &s(&tmp.path().join("first.svg")),
    ]);
    assert!(first.status.success(), "stderr={}", String::from_utf8_lossy(&first.stderr));

    let second_input = tmp.path().join("two.csv");
    std::fs::write(&second_input, "userId,movieId,rating,timestamp\n7,1,5.0,1\n8,2,5.0,2\n").unwrap();
    let report_path = tmp.path().join("report.json");
    let second = run(&[
        "run",
        "--input",
        &s(&second_input),
        "--warehouse",
        &s(&warehouse),
        "--mode",
        "ignore",
        "--chart",
        &s(&tmp.path().join("second.svg")),
        "--output",
        &s(&report_path),
    ]);
    assert!(second.status.success(), "stderr={}", String::from_utf8_lossy(&second.stderr));

    let report: serde_json::Value =
        serde_json::from_slice(&std::fs::read(&report_path).unwrap()).unwrap();
    assert_eq!(report["save_action"], "skipped");
    let bars = report["histogram"]["bars"].as_array().unwrap();
    assert_eq!(bars.len(), 1);
    assert_eq!(bars[0]["label"], "5.0");
    assert_eq!(bars[0]["count"], 2);
}
