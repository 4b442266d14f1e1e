use serde::{Deserialize, Serialize};

use crate::config::Statistic;
use crate::data::{BenchmarkRun, RequestRecord};

/// Every metric the report knows how to chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    RequestLatency,
    TimeToFirstToken,
    InterTokenLatency,
    TimePerOutputToken,
    OutputTokensPerSecond,
    TotalTokensPerSecond,
    RequestsPerSecond,
    RequestConcurrency,
    PromptTokens,
    OutputTokens,
}

impl Metric {
    pub const ALL: [Metric; 10] = [
        Metric::RequestLatency,
        Metric::TimeToFirstToken,
        Metric::InterTokenLatency,
        Metric::TimePerOutputToken,
        Metric::OutputTokensPerSecond,
        Metric::TotalTokensPerSecond,
        Metric::RequestsPerSecond,
        Metric::RequestConcurrency,
        Metric::PromptTokens,
        Metric::OutputTokens,
    ];

    /// Key of the metric inside a benchmark's `metrics` section.
    pub fn summary_key(&self) -> &'static str {
        match self {
            Metric::RequestLatency => "request_latency",
            Metric::TimeToFirstToken => "time_to_first_token_ms",
            Metric::InterTokenLatency => "inter_token_latency_ms",
            Metric::TimePerOutputToken => "time_per_output_token_ms",
            Metric::OutputTokensPerSecond => "output_tokens_per_second",
            Metric::TotalTokensPerSecond => "tokens_per_second",
            Metric::RequestsPerSecond => "requests_per_second",
            Metric::RequestConcurrency => "request_concurrency",
            Metric::PromptTokens => "prompt_token_count",
            Metric::OutputTokens => "output_token_count",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Metric::RequestLatency => "Request Latency",
            Metric::TimeToFirstToken => "Time to First Token",
            Metric::InterTokenLatency => "Inter-Token Latency",
            Metric::TimePerOutputToken => "Time per Output Token",
            Metric::OutputTokensPerSecond => "Output Tokens per Second",
            Metric::TotalTokensPerSecond => "Total Tokens per Second",
            Metric::RequestsPerSecond => "Requests per Second",
            Metric::RequestConcurrency => "Request Concurrency",
            Metric::PromptTokens => "Prompt Tokens",
            Metric::OutputTokens => "Output Tokens",
        }
    }

    pub fn unit(&self) -> &'static str {
        match self {
            Metric::RequestLatency => "s",
            Metric::TimeToFirstToken
            | Metric::InterTokenLatency
            | Metric::TimePerOutputToken => "ms",
            Metric::OutputTokensPerSecond | Metric::TotalTokensPerSecond => "tok/s",
            Metric::RequestsPerSecond => "req/s",
            Metric::RequestConcurrency => "req",
            Metric::PromptTokens | Metric::OutputTokens => "tokens",
        }
    }

    /// Whether individual request records carry this metric.
    pub fn is_per_request(&self) -> bool {
        matches!(
            self,
            Metric::RequestLatency
                | Metric::TimeToFirstToken
                | Metric::InterTokenLatency
                | Metric::TimePerOutputToken
                | Metric::PromptTokens
                | Metric::OutputTokens
        )
    }

    pub fn request_value(&self, request: &RequestRecord) -> Option<f64> {
        let value = match self {
            Metric::RequestLatency => request.request_latency,
            Metric::TimeToFirstToken => request.time_to_first_token_ms,
            Metric::InterTokenLatency => request.inter_token_latency_ms,
            Metric::TimePerOutputToken => request.time_per_output_token_ms,
            Metric::PromptTokens => request.prompt_tokens,
            Metric::OutputTokens => request.output_tokens,
            _ => None,
        };
        value.filter(|v| v.is_finite())
    }

    /// Values of this metric for every successful request of `run`.
    pub fn request_values(&self, run: &BenchmarkRun) -> Vec<f64> {
        run.request_records()
            .iter()
            .filter_map(|r| self.request_value(r))
            .collect()
    }

    /// Value of `stat` for one run: the file's own summary when present,
    /// otherwise a value derived from the request records.
    ///
    /// A summary that lacks `stat` yields `None`; derived values only stand
    /// in for a missing summary.
    pub fn run_statistic(&self, run: &BenchmarkRun, stat: Statistic) -> Option<f64> {
        match run.summary(self.summary_key()) {
            Some(summary) => summary.statistic(stat),
            None => self.derived_value(run),
        }
        .filter(|v| v.is_finite())
    }

    /// Run-level value computed from request records and run duration.
    pub fn derived_value(&self, run: &BenchmarkRun) -> Option<f64> {
        let requests = run.request_records();
        if self.is_per_request() {
            let values = self.request_values(run);
            return super::mean(&values);
        }
        let duration = run.duration_secs()?;
        let total = match self {
            Metric::RequestsPerSecond => run.successful_count() as f64,
            Metric::OutputTokensPerSecond => {
                requests.iter().filter_map(|r| r.output_tokens).sum()
            }
            Metric::TotalTokensPerSecond => requests
                .iter()
                .map(|r| r.prompt_tokens.unwrap_or(0.0) + r.output_tokens.unwrap_or(0.0))
                .sum(),
            // Little's law: mean number of requests in flight.
            Metric::RequestConcurrency => {
                requests.iter().filter_map(|r| r.request_latency).sum()
            }
            _ => return None,
        };
        Some(total / duration)
    }
}

impl std::fmt::Display for Metric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.title())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
