use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::XAxis;
use crate::data::{BenchmarkRun, DataGroup};
use crate::stats::aggregate::point_stats;
use crate::stats::{Metric, StatSummary};

/// One row of the tabular summary: a single benchmark run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct SummaryRow {
    pub group: String,
    pub color_key: String,
    pub level: Option<f64>,
    pub strategy: String,
    pub source_file: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    pub duration_secs: Option<f64>,
    pub successful_requests: u64,
    pub errored_requests: u64,
    pub incomplete_requests: u64,
    /// Keyed by the metric's summary key.
    pub metrics: BTreeMap<String, StatSummary>,
}

impl SummaryRow {
    /// Headline metrics shown as mean columns in condensed tables.
    pub const TABLE_METRICS: [Metric; 4] = [
        Metric::TimeToFirstToken,
        Metric::InterTokenLatency,
        Metric::RequestLatency,
        Metric::OutputTokensPerSecond,
    ];

    pub fn from_run(group: &DataGroup, run: &BenchmarkRun, axis: XAxis) -> Self {
        let metrics = Metric::ALL
            .iter()
            .filter_map(|metric| {
                point_stats(*metric, &[run]).map(|s| (metric.summary_key().to_string(), s))
            })
            .collect();

        Self {
            group: group.name.clone(),
            color_key: group.color_key.clone(),
            level: run.level(axis),
            strategy: run.strategy_type().to_string(),
            source_file: run.source_file.clone().unwrap_or_default(),
            started_at: run.started_at().and_then(epoch_to_datetime),
            duration_secs: run.duration_secs(),
            successful_requests: run.successful_count(),
            errored_requests: run.errored_count(),
            incomplete_requests: run.incomplete_count(),
            metrics,
        }
    }

    pub fn metric(&self, metric: Metric) -> Option<&StatSummary> {
        self.metrics.get(metric.summary_key())
    }

    pub fn total_requests(&self) -> u64 {
        self.successful_requests + self.errored_requests + self.incomplete_requests
    }

    /// Fraction of requests that errored, in `[0, 1]`.
    pub fn error_rate(&self) -> f64 {
        let total = self.total_requests();
        if total > 0 {
            self.errored_requests as f64 / total as f64
        } else {
            0.0
        }
    }
}

/// Build one summary row per run, ordered by group then level.
///
/// Runs without a level sort after every leveled run of their group.
pub fn summary_rows(groups: &[DataGroup], axis: XAxis) -> Vec<SummaryRow> {
    let mut rows = Vec::new();
    for group in groups {
        let mut group_rows: Vec<SummaryRow> = group
            .runs
            .iter()
            .map(|run| SummaryRow::from_run(group, run, axis))
            .collect();
        group_rows.sort_by(|a, b| match (a.level, b.level) {
            (Some(x), Some(y)) => x.total_cmp(&y),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => std::cmp::Ordering::Equal,
        });
        rows.extend(group_rows);
    }
    rows
}

fn epoch_to_datetime(secs: f64) -> Option<DateTime<Utc>> {
    if !secs.is_finite() {
        return None;
    }
    let whole = secs.floor();
    let nanos = ((secs - whole) * 1e9) as u32;
    DateTime::from_timestamp(whole as i64, nanos)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
