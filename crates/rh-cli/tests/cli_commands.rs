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

fn stdout_json(out: &Output) -> serde_json::Value {
    assert!(out.status.success(), "stderr={}", String::from_utf8_lossy(&out.stderr));
    serde_json::from_slice(&out.stdout).expect("stdout should be valid JSON")
}

#[test]
fn schema_lists_declared_columns() {
    let v = stdout_json(&run(&["schema"]));
    let cols = v["columns"].as_array().unwrap();
    let names: Vec<&str> = cols.iter().map(|c| c["name"].as_str().unwrap()).collect();
    assert_eq!(names, vec!["userid", "movieid", "rating", "epoch_time_seconds"]);
    assert_eq!(cols[2]["type"], "float32");
}

#[test]
fn describe_json_contract() {
    let input = fixture_path("ratings_small.csv");
    let v = stdout_json(&run(&["describe", "--input", input.to_str().unwrap(), "--json"]));
    assert_eq!(v["schema_version"], "ratehist_summary_v1");
    let rating = &v["columns"][2];
    assert_eq!(rating["name"], "rating");
    assert_eq!(rating["count"], 20);
    assert_eq!(rating["min"], "0.5");
    assert_eq!(rating["max"], "5.0");
    let mean = rating["mean"].as_f64().unwrap();
    assert!((mean - 3.575).abs() < 1e-9, "mean={mean}");
}

#[test]
fn describe_table_output() {
    let input = fixture_path("ratings_small.csv");
    let out = run(&["describe", "--input", input.to_str().unwrap()]);
    assert!(out.status.success());
    let text = String::from_utf8_lossy(&out.stdout);
    for row in ["count", "mean", "stddev", "min", "max"] {
        assert!(text.contains(row), "missing {row}: {text}");
    }
}

#[test]
fn describe_drop_malformed() {
    let input = fixture_path("ratings_malformed.csv");
    let out = run(&[
        "describe",
        "--input",
        input.to_str().unwrap(),
        "--json",
        "--parse-mode",
        "drop_malformed",
    ]);
    // warnings go to stderr, leaving stdout parseable
    let v = stdout_json(&out);
    assert_eq!(v["columns"][0]["count"], 2);
    assert!(String::from_utf8_lossy(&out.stderr).contains("dropping"));
}

#[test]
fn histogram_then_render() {
    let tmp = tempfile::tempdir().unwrap();
    let input = fixture_path("ratings_malformed.csv");
    let art_path = tmp.path().join("hist.json");
    let out = run(&[
        "histogram",
        "--input",
        input.to_str().unwrap(),
        "--output",
        art_path.to_str().unwrap(),
    ]);
    assert!(out.status.success(), "stderr={}", String::from_utf8_lossy(&out.stderr));

    let v: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&art_path).unwrap()).unwrap();
    let bars = v["bars"].as_array().unwrap();
    // permissive: the unparsable rating forms the null group, sorted first
    assert_eq!(bars[0]["label"], "null");
    assert_eq!(bars[0]["count"], 1);
    assert_eq!(bars.len(), 4);

    let svg_path = tmp.path().join("hist.svg");
    let viz = fixture_path("viz_pandas.yaml");
    let out = run(&[
        "render",
        "--input",
        art_path.to_str().unwrap(),
        "--kind",
        "histogram",
        "--output",
        svg_path.to_str().unwrap(),
        "--viz-config",
        viz.to_str().unwrap(),
    ]);
    assert!(out.status.success(), "stderr={}", String::from_utf8_lossy(&out.stderr));
    let svg = std::fs::read_to_string(&svg_path).unwrap();
    assert!(svg.contains("MovieLens rating frequency"));
    assert!(svg.contains("#1f77b4"));

}

#[test]
fn render_summary_artifact() {
    let tmp = tempfile::tempdir().unwrap();
    let input = fixture_path("ratings_small.csv");
    let out = run(&["describe", "--input", input.to_str().unwrap(), "--json"]);
    assert!(out.status.success());
    let art_path = tmp.path().join("summary.json");
    std::fs::write(&art_path, &out.stdout).unwrap();

    let svg_path = tmp.path().join("summary.svg");
    let out = run(&[
        "render",
        "--input",
        art_path.to_str().unwrap(),
        "--kind",
        "summary",
        "--output",
        svg_path.to_str().unwrap(),
    ]);
    assert!(out.status.success(), "stderr={}", String::from_utf8_lossy(&out.stderr));
    let svg = std::fs::read_to_string(&svg_path).unwrap();
    assert!(svg.contains(">epoch_time_seconds<"));

}

#[test]
fn render_rejects_unknown_kind() {
    let out = run(&["render", "--input", "x.json", "--kind", "pie", "--output", "x.svg"]);
    assert!(!out.status.success());
}

#[test]
fn tables_lists_saved_table() {
    let tmp = tempfile::tempdir().unwrap();
    let input = fixture_path("ratings_small.csv");
    let dir = tmp.path().join("warehouse");
    let chart = tmp.path().join("chart.svg");
    let out = run(&[
        "run",
        "--input",
        input.to_str().unwrap(),
        "--warehouse",
        dir.to_str().unwrap(),
        "--chart",
        chart.to_str().unwrap(),
        "--table",
        "Movies.Ratings",
    ]);
    assert!(out.status.success(), "stderr={}", String::from_utf8_lossy(&out.stderr));

    let out = run(&["tables", "--warehouse", dir.to_str().unwrap(), "--database", "movies"]);
    assert!(out.status.success());
    assert_eq!(String::from_utf8_lossy(&out.stdout).trim(), "movies.ratings");

    // histogram straight from the stored Parquet part
    let part = dir.join("movies.db/ratings/part-00000.parquet");
    let v = stdout_json(&run(&["histogram", "--input", part.to_str().unwrap()]));
    assert_eq!(v["bars"].as_array().unwrap().len(), 7);

}

#[test]
fn version_prints_name() {
    let out = run(&["version"]);
    assert!(out.status.success());
    assert!(String::from_utf8_lossy(&out.stdout).starts_with("ratehist "));
}
