use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use crate::config::{DataGroupConfig, ReportConfig};
use crate::data::model::{BenchmarkRun, DataGroup};
use crate::data::parser::parse_benchmark_document;
use crate::error::ReportError;

/// Expand a group's glob patterns into a sorted, de-duplicated file list.
pub fn resolve_group_files(group: &DataGroupConfig) -> Result<Vec<PathBuf>, ReportError> {
    let mut files = BTreeSet::new();

    for pattern in &group.files {
        let mut matched = 0usize;
        for entry in glob::glob(pattern)? {
            match entry {
                Ok(path) if path.is_file() => {
                    files.insert(path);
                    matched += 1;
                }
                Ok(_) => {}
                Err(e) => tracing::warn!(group = %group.name, "unreadable glob entry: {e}"),
            }
        }
        if matched == 0 {
            tracing::warn!(group = %group.name, pattern = %pattern, "pattern matched no files");
        }
    }

    Ok(files.into_iter().collect())
}

/// Read a single benchmark file and tag each run with its source name.
pub async fn read_benchmark_file(path: &Path) -> Result<Vec<BenchmarkRun>, ReportError> {
    let content = tokio::fs::read_to_string(path).await?;
    let mut runs = parse_benchmark_document(&content)?;

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    for run in &mut runs {
        if run.source_file.is_none() {
            run.source_file = Some(file_name.clone());
        }
    }
    Ok(runs)
}

/// Load every benchmark file of a data group.
///
/// Files that fail to read or parse are skipped with a warning. A group
/// that ends up with no runs at all is an error.
pub async fn load_group(
    group: &DataGroupConfig,
    color_by: Option<&str>,
) -> Result<DataGroup, ReportError> {
    let files = resolve_group_files(group)?;
    let mut runs = Vec::new();

    for path in &files {
        match read_benchmark_file(path).await {
            Ok(parsed) => {
                tracing::debug!(
                    group = %group.name,
                    file = %path.display(),
                    runs = parsed.len(),
                    "parsed benchmark file"
                );
                runs.extend(parsed);
            }
            Err(e) => {
                tracing::warn!(group = %group.name, file = %path.display(), "skipping file: {e}");
            }
        }
    }

    if runs.is_empty() {
        return Err(ReportError::NoData(format!(
            "data group '{}' has no parseable benchmark runs ({} file(s) matched)",
            group.name,
            files.len()
        )));
    }

    let color_key = group.color_key(color_by);
    tracing::info!(
        group = %group.name,
        color_key = %color_key,
        files = files.len(),
        runs = runs.len(),
        "loaded data group"
    );

    Ok(DataGroup {
        name: group.name.clone(),
        color_key,
        extra_metadata: group.extra_metadata.clone(),
        runs,
    })
}

/// Load every data group named in the config, in config order.
pub async fn load_groups(config: &ReportConfig) -> Result<Vec<DataGroup>, ReportError> {
    let mut groups = Vec::with_capacity(config.data_groups.len());
    for group in &config.data_groups {
        groups.push(load_group(group, config.color_by()).await?);
    }
    Ok(groups)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
