//! Combine a directory of single-run benchmark files into one file.
//!
//! Each input contributes its first benchmark. Every output benchmark keeps
//! its own strategy but carries one combined sweep profile built from all
//! inputs, so the merged file reads like a single sweep.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde_json::{json, Map, Value};

use crate::data::benchmark_values;
use crate::error::ReportError;

/// Return the first benchmark object of a file, or `None` (with a warning)
/// when the file cannot be read or holds no benchmark.
pub async fn load_first_benchmark(path: &Path) -> Option<Value> {
    let content = match tokio::fs::read_to_string(path).await {
        Ok(content) => content,
        Err(e) => {
            tracing::warn!(file = %path.display(), "failed to read: {e}");
            return None;
        }
    };
    let document: Value = match serde_json::from_str(&content) {
        Ok(doc) => doc,
        Err(e) => {
            tracing::warn!(file = %path.display(), "failed to parse: {e}");
            return None;
        }
    };
    match benchmark_values(document) {
        Ok(list) => list.into_iter().next(),
        Err(e) => {
            tracing::warn!(file = %path.display(), "no benchmark found: {e}");
            None
        }
    }
}

/// Merge every regular file in `dir`, in file-name order.
pub async fn merge_benchmark_files(dir: &Path) -> Result<Value, ReportError> {
    let mut files: Vec<PathBuf> = Vec::new();
    let mut entries = tokio::fs::read_dir(dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        if entry.file_type().await?.is_file() {
            files.push(entry.path());
        }
    }
    files.sort();

    let mut benchmarks = Vec::with_capacity(files.len());
    for path in &files {
        let Some(mut benchmark) = load_first_benchmark(path).await else {
            tracing::info!(file = %path.display(), "skipping (no benchmark found)");
            continue;
        };
        if let Value::Object(obj) = &mut benchmark {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            obj.insert("__source_file".to_string(), Value::String(name));
        }
        benchmarks.push(benchmark);
    }

    let combined_from = dir
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| dir.display().to_string());
    combine_benchmarks(benchmarks, &combined_from)
}

/// Attach a combined sweep profile to every benchmark.
pub fn combine_benchmarks(
    benchmarks: Vec<Value>,
    combined_from: &str,
) -> Result<Value, ReportError> {
    if benchmarks.is_empty() {
        return Err(ReportError::NoData(format!(
            "no benchmark entries found in {combined_from}"
        )));
    }

    let mut measured_rates = Vec::new();
    let mut measured_concurrencies = Vec::new();
    let mut streams = Vec::new();
    let mut strategy_types = Vec::new();

    for b in &benchmarks {
        let args = b.get("args");
        let profile = args.and_then(|a| a.get("profile"));
        let field = |key: &str| profile.and_then(|p| p.get(key));

        collect_values(&mut measured_rates, field("measured_rates"));
        collect_values(&mut measured_concurrencies, field("measured_concurrencies"));
        let stream_source = field("streams")
            .filter(|v| !v.is_null())
            .or_else(|| args.and_then(|a| a.get("strategy")).and_then(|s| s.get("streams")));
        collect_values(&mut streams, stream_source);
        collect_values(&mut strategy_types, field("strategy_types"));
    }

    let mut profile = Map::new();
    profile.insert("type_".to_string(), json!("concurrent"));
    profile.insert("completed_strategies".to_string(), json!(benchmarks.len()));
    let measured_rates = uniq(measured_rates);
    if !measured_rates.is_empty() {
        profile.insert("measured_rates".to_string(), Value::Array(measured_rates));
    }
    let measured_concurrencies = uniq(measured_concurrencies);
    if !measured_concurrencies.is_empty() {
        profile.insert(
            "measured_concurrencies".to_string(),
            Value::Array(measured_concurrencies),
        );
    }
    let streams = uniq(streams);
    if !streams.is_empty() {
        profile.insert("streams".to_string(), Value::Array(sort_if_uniform(streams)));
    }
    let strategy_types = uniq(strategy_types);
    if !strategy_types.is_empty() {
        profile.insert("strategy_types".to_string(), Value::Array(strategy_types));
    }
    let profile = Value::Object(profile);

    let merged: Vec<Value> = benchmarks
        .into_iter()
        .map(|mut b| {
            if let Value::Object(obj) = &mut b {
                let args = obj
                    .entry("args")
                    .or_insert_with(|| Value::Object(Map::new()));
                if let Value::Object(args) = args {
                    args.insert("profile".to_string(), profile.clone());
                }
                obj.insert(
                    "__combined_from".to_string(),
                    Value::String(combined_from.to_string()),
                );
            }
            b
        })
        .collect();

    tracing::info!(
        benchmarks = merged.len(),
        combined_from = %combined_from,
        "merged benchmark files"
    );
    Ok(json!({ "benchmarks": merged }))
}

/// Write a merged document as pretty JSON, creating parent directories.
pub async fn write_merged(path: impl AsRef<Path>, merged: &Value) -> Result<(), ReportError> {
    let content = serde_json::to_string_pretty(merged)?;
    crate::report::write_report(path, &content).await
}

fn collect_values(out: &mut Vec<Value>, value: Option<&Value>) {
    match value {
        None | Some(Value::Null) => {}
        Some(Value::Array(list)) => out.extend(list.iter().cloned()),
        Some(other) => out.push(other.clone()),
    }
}

/// De-duplicate, keeping first-seen order.
fn uniq(values: Vec<Value>) -> Vec<Value> {
    let mut seen = HashSet::new();
    values
        .into_iter()
        .filter(|v| seen.insert(dedup_key(v)))
        .collect()
}

fn dedup_key(value: &Value) -> String {
    match value {
        // 4 and 4.0 are the same level.
        Value::Number(n) => n
            .as_f64()
            .map(|f| format!("n:{f}"))
            .unwrap_or_else(|| n.to_string()),
        other => other.to_string(),
    }
}

/// Sort numerically when every entry is a number, lexically when every
/// entry is a string, and leave mixed lists untouched.
fn sort_if_uniform(mut values: Vec<Value>) -> Vec<Value> {
    if values.iter().all(Value::is_number) {
        values.sort_by(|a, b| {
            let a = a.as_f64().unwrap_or(f64::NAN);
            let b = b.as_f64().unwrap_or(f64::NAN);
            a.total_cmp(&b)
        });
    } else if values.iter().all(Value::is_string) {
        values.sort_by(|a, b| a.as_str().cmp(&b.as_str()));
    }
    values
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
