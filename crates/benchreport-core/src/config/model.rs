use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::stats::Metric;

// ---------------------------------------------------------------------------
// XAxis
// ---------------------------------------------------------------------------

/// Which run property is plotted along the x axis of level-keyed charts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum XAxis {
    /// Number of concurrent streams the load generator held open.
    #[default]
    Concurrency,
    /// Target (or measured) requests per second.
    Rps,
}

impl XAxis {
    pub fn label(&self) -> &'static str {
        match self {
            XAxis::Concurrency => "Concurrency",
            XAxis::Rps => "Requests per second",
        }
    }
}

impl std::fmt::Display for XAxis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            XAxis::Concurrency => "concurrency",
            XAxis::Rps => "rps",
        };
        write!(f, "{s}")
    }
}

// ---------------------------------------------------------------------------
// Statistic
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Statistic {
    Mean,
    Median,
    P95,
    P99,
}

impl Statistic {
    pub const ALL: [Statistic; 4] = [
        Statistic::Mean,
        Statistic::Median,
        Statistic::P95,
        Statistic::P99,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Statistic::Mean => "mean",
            Statistic::Median => "median",
            Statistic::P95 => "p95",
            Statistic::P99 => "p99",
        }
    }
}

impl std::fmt::Display for Statistic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

// ---------------------------------------------------------------------------
// DataGroupConfig
// ---------------------------------------------------------------------------

/// A named set of benchmark files that share metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataGroupConfig {
    pub name: String,
    /// Glob patterns. Relative patterns are resolved against the config
    /// file's directory when the config is read from disk.
    #[serde(default)]
    pub files: Vec<String>,
    /// Free-form key/value pairs, e.g. `platform: vllm-x2`.
    #[serde(default)]
    pub extra_metadata: BTreeMap<String, String>,
}

impl DataGroupConfig {
    /// The key used to color and group this data group's series.
    ///
    /// Falls back to the group name when `color_by` is unset or the
    /// metadata key is missing.
    pub fn color_key(&self, color_by: Option<&str>) -> String {
        color_by
            .and_then(|key| self.extra_metadata.get(key))
            .cloned()
            .unwrap_or_else(|| self.name.clone())
    }
}

// ---------------------------------------------------------------------------
// ReportConfig
// ---------------------------------------------------------------------------

/// Top-level report configuration, loaded from YAML.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub title: String,
    pub output: PathBuf,
    pub x_axis: XAxis,
    /// Metadata key whose values color the chart series.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color_by: Option<String>,
    pub statistics: Vec<Statistic>,
    /// Metrics to chart. Empty means all of them.
    pub metrics: Vec<Metric>,
    pub histogram_bins: usize,
    /// Optional path for a CSV copy of the summary table.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary_csv: Option<PathBuf>,
    pub data_groups: Vec<DataGroupConfig>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            title: "Benchmark Report".to_string(),
            output: PathBuf::from("report.html"),
            x_axis: XAxis::default(),
            color_by: None,
            statistics: Statistic::ALL.to_vec(),
            metrics: Vec::new(),
            histogram_bins: 30,
            summary_csv: None,
            data_groups: Vec::new(),
        }
    }
}

impl ReportConfig {
    pub fn includes_metric(&self, metric: Metric) -> bool {
        self.metrics.is_empty() || self.metrics.contains(&metric)
    }

    pub fn color_by(&self) -> Option<&str> {
        self.color_by.as_deref()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
