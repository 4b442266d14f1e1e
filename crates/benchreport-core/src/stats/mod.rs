//! Statistical aggregation over benchmark runs.
//!
//! Everything here is pure computation over in-memory data: percentiles,
//! level-keyed series, histograms and the tabular summary.

pub mod aggregate;
pub mod histogram;
pub mod metric;
pub mod summary;

use serde::{Deserialize, Serialize};

use crate::config::Statistic;

pub use aggregate::{aggregate, runs_without_level, AggregatedSeries, SeriesPoint};
pub use histogram::{histogram, request_distribution, Histogram, HistogramSeries};
pub use metric::Metric;
pub use summary::{summary_rows, SummaryRow};

// ---------------------------------------------------------------------------
// StatSummary
// ---------------------------------------------------------------------------

/// Summary statistics of one metric over a set of values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct StatSummary {
    pub count: usize,
    pub mean: Option<f64>,
    pub median: Option<f64>,
    pub p95: Option<f64>,
    pub p99: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl StatSummary {
    pub fn get(&self, stat: Statistic) -> Option<f64> {
        match stat {
            Statistic::Mean => self.mean,
            Statistic::Median => self.median,
            Statistic::P95 => self.p95,
            Statistic::P99 => self.p99,
        }
    }
}

/// Arithmetic mean. `None` for an empty slice.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Median of unsorted values. `None` for an empty slice.
pub fn median(values: &[f64]) -> Option<f64> {
    let sorted = sorted_copy(values);
    percentile(&sorted, 50.0)
}

/// Calculate the p-th percentile of an ascending-sorted slice.
///
/// Uses linear interpolation between the two closest ranks
/// (`rank = p / 100 * (n - 1)`). `p` is clamped to `[0, 100]`.
/// Returns `None` when the slice is empty.
pub fn percentile(sorted: &[f64], p: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let rank = (p.clamp(0.0, 100.0) / 100.0) * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    let weight = rank - lower as f64;
    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * weight)
}

/// Compute mean, median, p95, p99, min and max over `values`.
pub fn summarize(values: &[f64]) -> Option<StatSummary> {
    let sorted = sorted_copy(values);
    let first = *sorted.first()?;
    let last = *sorted.last()?;
    Some(StatSummary {
        count: sorted.len(),
        mean: mean(&sorted),
        median: percentile(&sorted, 50.0),
        p95: percentile(&sorted, 95.0),
        p99: percentile(&sorted, 99.0),
        min: Some(first),
        max: Some(last),
    })
}

fn sorted_copy(values: &[f64]) -> Vec<f64> {
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    sorted.sort_by(f64::total_cmp);
    sorted
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
