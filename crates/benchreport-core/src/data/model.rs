use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::config::{Statistic, XAxis};

// ---------------------------------------------------------------------------
// DistributionSummary — summary statistics as written by the load generator
// ---------------------------------------------------------------------------

/// Summary statistics for one metric and one request status.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DistributionSummary {
    pub mean: Option<f64>,
    pub median: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub std_dev: Option<f64>,
    pub count: Option<f64>,
    /// Keyed `p50`, `p95`, `p99`, ...
    pub percentiles: BTreeMap<String, Option<f64>>,
}

impl DistributionSummary {
    pub fn percentile(&self, key: &str) -> Option<f64> {
        self.percentiles.get(key).copied().flatten()
    }

    pub fn statistic(&self, stat: Statistic) -> Option<f64> {
        match stat {
            Statistic::Mean => self.mean,
            Statistic::Median => self.median.or_else(|| self.percentile("p50")),
            Statistic::P95 => self.percentile("p95"),
            Statistic::P99 => self.percentile("p99"),
        }
    }
}

/// A metric's summaries split by request status.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StatusDistribution {
    pub successful: Option<DistributionSummary>,
    pub errored: Option<DistributionSummary>,
    pub incomplete: Option<DistributionSummary>,
    pub total: Option<DistributionSummary>,
}

// ---------------------------------------------------------------------------
// RequestRecord
// ---------------------------------------------------------------------------

/// Timing fields for a single served request. Every field is optional on
/// input; missing values are skipped by the aggregator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RequestRecord {
    pub prompt_tokens: Option<f64>,
    pub output_tokens: Option<f64>,
    /// Epoch seconds.
    pub start_time: Option<f64>,
    /// Epoch seconds.
    pub end_time: Option<f64>,
    /// Total request latency in seconds.
    pub request_latency: Option<f64>,
    pub time_to_first_token_ms: Option<f64>,
    pub inter_token_latency_ms: Option<f64>,
    pub time_per_output_token_ms: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RequestSets {
    pub successful: Vec<RequestRecord>,
    pub errored: Vec<RequestRecord>,
    pub incomplete: Vec<RequestRecord>,
}

// ---------------------------------------------------------------------------
// Strategy / args
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Strategy {
    #[serde(rename = "type_")]
    pub kind: Option<String>,
    /// Concurrent streams for `concurrent` strategies.
    pub streams: Option<f64>,
    /// Target requests per second for rate-based strategies.
    pub rate: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BenchmarkArgs {
    pub strategy: Strategy,
    /// Sweep profile. Kept opaque; only the merge tool rewrites it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RequestCounts {
    pub successful: Option<u64>,
    pub errored: Option<u64>,
    pub incomplete: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RunStats {
    pub requests_made: RequestCounts,
}

// ---------------------------------------------------------------------------
// BenchmarkRun
// ---------------------------------------------------------------------------

/// One benchmark entry: a single test run at one concurrency/RPS level.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BenchmarkRun {
    #[serde(rename = "type_")]
    pub kind: Option<String>,
    pub args: BenchmarkArgs,
    pub run_stats: RunStats,
    /// Epoch seconds.
    pub start_time: Option<f64>,
    /// Epoch seconds.
    pub end_time: Option<f64>,
    /// Metric key (e.g. `time_to_first_token_ms`) to status summaries.
    pub metrics: BTreeMap<String, StatusDistribution>,
    pub requests: RequestSets,
    /// File the run was loaded from. Set by the merge tool, or by the
    /// loader when absent.
    #[serde(rename = "__source_file", skip_serializing_if = "Option::is_none")]
    pub source_file: Option<String>,
}

impl BenchmarkRun {
    /// Summary of successful requests for `key`, if the file carries one.
    pub fn summary(&self, key: &str) -> Option<&DistributionSummary> {
        self.metrics.get(key).and_then(|m| m.successful.as_ref())
    }

    pub fn strategy_type(&self) -> &str {
        self.args.strategy.kind.as_deref().unwrap_or("unknown")
    }

    /// The x-axis value of this run, if it can be determined.
    pub fn level(&self, axis: XAxis) -> Option<f64> {
        match axis {
            XAxis::Concurrency => self.args.strategy.streams.or_else(|| {
                self.summary("request_concurrency").and_then(|s| s.mean)
            }),
            XAxis::Rps => self.args.strategy.rate.or_else(|| {
                self.summary("requests_per_second").and_then(|s| s.mean)
            }),
        }
    }

    /// Requests that feed latency and token statistics.
    pub fn request_records(&self) -> &[RequestRecord] {
        &self.requests.successful
    }

    pub fn successful_count(&self) -> u64 {
        count_or(self.run_stats.requests_made.successful, &self.requests.successful)
    }

    pub fn errored_count(&self) -> u64 {
        count_or(self.run_stats.requests_made.errored, &self.requests.errored)
    }

    pub fn incomplete_count(&self) -> u64 {
        count_or(self.run_stats.requests_made.incomplete, &self.requests.incomplete)
    }

    /// Wall-clock duration of the run in seconds.
    ///
    /// Uses the recorded run bounds, falling back to the span of the
    /// successful requests' timestamps.
    pub fn duration_secs(&self) -> Option<f64> {
        if let (Some(start), Some(end)) = (self.start_time, self.end_time) {
            if end > start {
                return Some(end - start);
            }
        }
        let first_start = self
            .request_records()
            .iter()
            .filter_map(|r| r.start_time)
            .reduce(f64::min)?;
        let last_end = self
            .request_records()
            .iter()
            .filter_map(|r| r.end_time)
            .reduce(f64::max)?;
        (last_end > first_start).then(|| last_end - first_start)
    }

    /// Earliest known start timestamp (epoch seconds).
    pub fn started_at(&self) -> Option<f64> {
        self.start_time.or_else(|| {
            self.request_records()
                .iter()
                .filter_map(|r| r.start_time)
                .reduce(f64::min)
        })
    }
}

fn count_or(recorded: Option<u64>, requests: &[RequestRecord]) -> u64 {
    if requests.is_empty() {
        recorded.unwrap_or(0)
    } else {
        requests.len() as u64
    }
}

// ---------------------------------------------------------------------------
// DataGroup
// ---------------------------------------------------------------------------

/// A named collection of benchmark runs sharing `extra_metadata`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DataGroup {
    pub name: String,
    /// Value used to color and group series (the `color_by` metadata value,
    /// or the group name).
    pub color_key: String,
    pub extra_metadata: BTreeMap<String, String>,
    pub runs: Vec<BenchmarkRun>,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
