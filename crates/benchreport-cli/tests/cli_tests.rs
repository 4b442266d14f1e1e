//! End-to-end tests for the benchreport binary

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::{tempdir, TempDir};

fn benchreport_cmd() -> Command {
    Command::cargo_bin("benchreport").expect("Failed to find benchreport binary")
}

fn benchmark_json(streams: u64, latency: f64) -> String {
    format!(
        r#"{{"benchmarks": [{{
            "type_": "generative_benchmark",
            "start_time": 1700000000.0,
            "end_time": 1700000010.0,
            "args": {{"strategy": {{"type_": "concurrent", "streams": {streams}}}}},
            "requests": {{
                "successful": [
                    {{"prompt_tokens": 128, "output_tokens": 64, "start_time": 1700000000.5,
                      "end_time": 1700000001.5, "request_latency": {latency},
                      "time_to_first_token_ms": 42.0, "inter_token_latency_ms": 7.5,
                      "time_per_output_token_ms": 8.0}},
                    {{"prompt_tokens": 128, "output_tokens": 96, "start_time": 1700000002.0,
                      "end_time": 1700000003.0, "request_latency": {latency},
                      "time_to_first_token_ms": 55.0, "inter_token_latency_ms": 8.5,
                      "time_per_output_token_ms": 9.0}}
                ],
                "errored": [{{"request_latency": 0.1}}]
            }}
        }}]}}"#
    )
}

/// Write two single-run files per platform and a config that covers them.
fn setup_workspace() -> TempDir {
    let dir = tempdir().expect("Failed to create temp dir");
    for (platform, scale) in [("vllm", 1.0), ("llmd", 0.8)] {
        let run_dir = dir.path().join(platform);
        fs::create_dir_all(&run_dir).expect("Failed to create run dir");
        for streams in [1, 8] {
            fs::write(
                run_dir.join(format!("c{streams}.json")),
                benchmark_json(streams, scale * streams as f64),
            )
            .expect("Failed to write benchmark file");
        }
    }
    fs::write(
        dir.path().join("report.yaml"),
        r#"title: Platform comparison
output: out/report.html
color_by: platform
data_groups:
  - name: vLLM baseline
    files: ["vllm/*.json"]
    extra_metadata:
      platform: vllm
  - name: llm-d
    files: ["llmd/*.json"]
    extra_metadata:
      platform: llm-d
"#,
    )
    .expect("Failed to write config");
    dir
}

fn config_path(dir: &Path) -> String {
    dir.join("report.yaml").to_string_lossy().into_owned()
}

#[test]
fn generate_writes_html_report() {
    let dir = setup_workspace();
    benchreport_cmd()
        .args(["generate", "--config", &config_path(dir.path())])
        .assert()
        .success()
        .stdout(predicate::str::contains("4 run(s)"));

    let html = fs::read_to_string(dir.path().join("out/report.html")).expect("report written");
    assert!(html.starts_with("<!DOCTYPE html>"));
    assert!(html.contains("Platform comparison"));
    assert!(html.contains("chart-time_to_first_token_ms"));
    assert!(html.contains("llm-d"));
}

#[test]
fn generate_honours_output_and_csv_overrides() {
    let dir = setup_workspace();
    let output = dir.path().join("custom.html");
    let csv = dir.path().join("tables/summary.csv");
    benchreport_cmd()
        .args(["generate", "-c", &config_path(dir.path())])
        .arg("--output")
        .arg(&output)
        .arg("--summary-csv")
        .arg(&csv)
        .assert()
        .success();

    assert!(output.exists());
    assert!(!dir.path().join("out/report.html").exists());
    let csv = fs::read_to_string(csv).expect("csv written");
    assert!(csv.starts_with("group,color_key,level"));
    assert_eq!(csv.lines().count(), 5);
}

#[test]
fn generate_fails_on_missing_config() {
    let dir = tempdir().expect("Failed to create temp dir");
    benchreport_cmd()
        .args(["generate", "--config"])
        .arg(dir.path().join("missing.yaml"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error:"));
}

#[test]
fn generate_fails_on_invalid_config() {
    let dir = tempdir().expect("Failed to create temp dir");
    let config = dir.path().join("bad.yaml");
    fs::write(&config, "title: Empty\ndata_groups: []\nhistogram_bins: 0\n")
        .expect("Failed to write config");
    benchreport_cmd()
        .args(["generate", "--config"])
        .arg(&config)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Config error"));
}

#[test]
fn generate_fails_when_group_has_no_data() {
    let dir = tempdir().expect("Failed to create temp dir");
    let config = dir.path().join("report.yaml");
    fs::write(
        &config,
        "data_groups:\n  - name: ghost\n    files: [\"nothing/*.json\"]\n",
    )
    .expect("Failed to write config");
    benchreport_cmd()
        .args(["generate", "--config"])
        .arg(&config)
        .assert()
        .failure()
        .stderr(predicate::str::contains("No data"));
}

#[test]
fn summary_table_lists_every_run() {
    let dir = setup_workspace();
    benchreport_cmd()
        .args(["summary", "--config", &config_path(dir.path())])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("group"))
        .stdout(predicate::str::contains("vLLM baseline"))
        .stdout(predicate::str::contains("Concurrency"));
}

#[test]
fn summary_csv_prints_header() {
    let dir = setup_workspace();
    benchreport_cmd()
        .args(["summary", "--config", &config_path(dir.path()), "--format", "csv"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("group,color_key,level,strategy"));
}

#[test]
fn summary_json_is_parseable() {
    let dir = setup_workspace();
    let output = benchreport_cmd()
        .args(["summary", "--config", &config_path(dir.path()), "-f", "json"])
        .output()
        .expect("Failed to run benchreport");
    assert!(output.status.success());
    let rows: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout should be JSON");
    let rows = rows.as_array().expect("array of rows");
    assert_eq!(rows.len(), 4);
    assert_eq!(rows[0]["successful_requests"], 2);
    assert_eq!(rows[0]["errored_requests"], 1);
}

#[test]
fn merge_combines_directory_into_one_file() {
    let dir = setup_workspace();
    let output = dir.path().join("merged/vllm.json");
    benchreport_cmd()
        .arg("merge")
        .arg("--input-dir")
        .arg(dir.path().join("vllm"))
        .arg("--output")
        .arg(&output)
        .assert()
        .success()
        .stdout(predicate::str::contains("Merged 2 benchmark(s)"));

    let merged: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&output).expect("merged file written"))
            .expect("merged file should be JSON");
    let benchmarks = merged["benchmarks"].as_array().expect("benchmarks array");
    assert_eq!(benchmarks.len(), 2);
    assert_eq!(benchmarks[0]["__source_file"], "c1.json");
    assert_eq!(benchmarks[1]["__combined_from"], "vllm");
    assert_eq!(
        benchmarks[0]["args"]["profile"]["streams"],
        serde_json::json!([1, 8])
    );
}

#[test]
fn merge_fails_on_missing_directory() {
    let dir = tempdir().expect("Failed to create temp dir");
    benchreport_cmd()
        .arg("merge")
        .arg("--input-dir")
        .arg(dir.path().join("nope"))
        .arg("--output")
        .arg(dir.path().join("out.json"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("input directory not found"));
}

#[test]
fn help_lists_subcommands() {
    benchreport_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("generate"))
        .stdout(predicate::str::contains("summary"))
        .stdout(predicate::str::contains("merge"));
}
