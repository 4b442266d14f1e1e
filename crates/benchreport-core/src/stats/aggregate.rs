use std::cmp::Ordering;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::config::{Statistic, XAxis};
use crate::data::{BenchmarkRun, DataGroup};
use crate::stats::{mean, summarize, Metric, StatSummary};

// ---------------------------------------------------------------------------
// AggregatedSeries
// ---------------------------------------------------------------------------

/// One (color key, level) point of a series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct SeriesPoint {
    pub level: f64,
    /// Number of benchmark runs that contributed to this point.
    pub runs: usize,
    pub stats: StatSummary,
}

impl SeriesPoint {
    pub fn value(&self, stat: Statistic) -> Option<f64> {
        self.stats.get(stat)
    }
}

/// Per-level statistics of one metric for one color key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct AggregatedSeries {
    pub metric: Metric,
    pub color_key: String,
    /// Sorted by level, ascending.
    pub points: Vec<SeriesPoint>,
}

// ---------------------------------------------------------------------------
// Level — total-ordered f64 map key
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy)]
struct Level(f64);

impl PartialEq for Level {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Level {}

impl PartialOrd for Level {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Level {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

// ---------------------------------------------------------------------------
// aggregate
// ---------------------------------------------------------------------------

/// Group every run by (color key, level) and summarize `metric` per point.
///
/// Per-request metrics pool the successful requests of every run sharing a
/// point. Points whose runs carry no request records, and run-level metrics,
/// average each run's own summary statistic instead.
///
/// Series are ordered by first appearance of their color key; runs without
/// a level are left out silently (see [`runs_without_level`]).
pub fn aggregate(groups: &[DataGroup], metric: Metric, axis: XAxis) -> Vec<AggregatedSeries> {
    let mut buckets: Vec<(String, BTreeMap<Level, Vec<&BenchmarkRun>>)> = Vec::new();

    for group in groups {
        let idx = match buckets.iter().position(|(key, _)| *key == group.color_key) {
            Some(idx) => idx,
            None => {
                buckets.push((group.color_key.clone(), BTreeMap::new()));
                buckets.len() - 1
            }
        };
        for run in &group.runs {
            if let Some(level) = finite_level(run, axis) {
                buckets[idx].1.entry(Level(level)).or_default().push(run);
            }
        }
    }

    buckets
        .into_iter()
        .map(|(color_key, levels)| AggregatedSeries {
            metric,
            color_key,
            points: levels
                .into_iter()
                .filter_map(|(level, runs)| {
                    point_stats(metric, &runs).map(|stats| SeriesPoint {
                        level: level.0,
                        runs: runs.len(),
                        stats,
                    })
                })
                .collect(),
        })
        .filter(|series| !series.points.is_empty())
        .collect()
}

/// Runs that cannot be placed on the x axis, with their group.
pub fn runs_without_level(
    groups: &[DataGroup],
    axis: XAxis,
) -> Vec<(&DataGroup, &BenchmarkRun)> {
    groups
        .iter()
        .flat_map(|g| g.runs.iter().map(move |r| (g, r)))
        .filter(|(_, run)| finite_level(run, axis).is_none())
        .collect()
}

fn finite_level(run: &BenchmarkRun, axis: XAxis) -> Option<f64> {
    run.level(axis).filter(|l| l.is_finite())
}

/// Summarize `metric` over a set of runs that share a point.
pub fn point_stats(metric: Metric, runs: &[&BenchmarkRun]) -> Option<StatSummary> {
    if metric.is_per_request() {
        let pooled: Vec<f64> = runs.iter().flat_map(|r| metric.request_values(r)).collect();
        if let Some(stats) = summarize(&pooled) {
            return Some(stats);
        }
    }
    summary_average(metric, runs)
}

fn summary_average(metric: Metric, runs: &[&BenchmarkRun]) -> Option<StatSummary> {
    let average = |stat: Statistic| {
        let values: Vec<f64> = runs
            .iter()
            .filter_map(|r| metric.run_statistic(r, stat))
            .collect();
        mean(&values)
    };

    let stats = StatSummary {
        count: runs
            .iter()
            .filter(|r| metric.run_statistic(r, Statistic::Mean).is_some())
            .count(),
        mean: average(Statistic::Mean),
        median: average(Statistic::Median),
        p95: average(Statistic::P95),
        p99: average(Statistic::P99),
        min: runs
            .iter()
            .filter_map(|r| r.summary(metric.summary_key()).and_then(|s| s.min))
            .reduce(f64::min),
        max: runs
            .iter()
            .filter_map(|r| r.summary(metric.summary_key()).and_then(|s| s.max))
            .reduce(f64::max),
    };

    let empty = Statistic::ALL.iter().all(|s| stats.get(*s).is_none());
    (!empty).then_some(stats)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{DistributionSummary, RequestRecord, StatusDistribution};
    use std::collections::BTreeMap;

    fn make_run(streams: Option<f64>, ttfts: &[f64]) -> BenchmarkRun {
        let mut run = BenchmarkRun::default();
        run.args.strategy.streams = streams;
        run.requests.successful = ttfts
            .iter()
            .map(|t| RequestRecord {
                time_to_first_token_ms: Some(*t),
                ..Default::default()
            })
            .collect();
        run
    }

    fn with_rps_summary(mut run: BenchmarkRun, mean: f64, p95: f64) -> BenchmarkRun {
        let mut percentiles = BTreeMap::new();
        percentiles.insert("p95".to_string(), Some(p95));
        run.metrics.insert(
            "requests_per_second".to_string(),
            StatusDistribution {
                successful: Some(DistributionSummary {
                    mean: Some(mean),
                    min: Some(mean - 1.0),
                    max: Some(p95 + 1.0),
                    percentiles,
                    ..Default::default()
                }),
                ..Default::default()
            },
        );
        run
    }

    fn make_group(name: &str, color_key: &str, runs: Vec<BenchmarkRun>) -> DataGroup {
        DataGroup {
            name: name.to_string(),
            color_key: color_key.to_string(),
            extra_metadata: BTreeMap::new(),
            runs,
        }
    }

    #[test]
    fn points_are_sorted_by_level() {
        let group = make_group(
            "g",
            "g",
            vec![
                make_run(Some(16.0), &[30.0]),
                make_run(Some(1.0), &[10.0]),
                make_run(Some(4.0), &[20.0]),
            ],
        );
        let series = aggregate(&[group], Metric::TimeToFirstToken, XAxis::Concurrency);
        assert_eq!(series.len(), 1);
        let levels: Vec<f64> = series[0].points.iter().map(|p| p.level).collect();
        assert_eq!(levels, vec![1.0, 4.0, 16.0]);
    }

    #[test]
    fn runs_at_same_level_pool_requests() {
        let group = make_group(
            "g",
            "g",
            vec![
                make_run(Some(8.0), &[10.0, 20.0]),
                make_run(Some(8.0), &[30.0, 40.0]),
            ],
        );
        let series = aggregate(&[group], Metric::TimeToFirstToken, XAxis::Concurrency);
        let point = &series[0].points[0];
        assert_eq!(point.runs, 2);
        assert_eq!(point.stats.count, 4);
        assert_eq!(point.value(Statistic::Mean), Some(25.0));
        assert_eq!(point.value(Statistic::Median), Some(25.0));
    }

    #[test]
    fn groups_sharing_color_key_merge_into_one_series() {
        let a = make_group("a", "vllm", vec![make_run(Some(1.0), &[10.0])]);
        let b = make_group("b", "llm-d", vec![make_run(Some(1.0), &[50.0])]);
        let c = make_group("c", "vllm", vec![make_run(Some(2.0), &[20.0])]);
        let series = aggregate(&[a, b, c], Metric::TimeToFirstToken, XAxis::Concurrency);

        let keys: Vec<&str> = series.iter().map(|s| s.color_key.as_str()).collect();
        assert_eq!(keys, vec!["vllm", "llm-d"]);
        assert_eq!(series[0].points.len(), 2);
    }

    #[test]
    fn runs_without_level_are_excluded() {
        let group = make_group(
            "g",
            "g",
            vec![make_run(None, &[10.0]), make_run(Some(2.0), &[20.0])],
        );
        let groups = [group];
        let series = aggregate(&groups, Metric::TimeToFirstToken, XAxis::Concurrency);
        assert_eq!(series[0].points.len(), 1);
        assert_eq!(series[0].points[0].level, 2.0);

        let missing = runs_without_level(&groups, XAxis::Concurrency);
        assert_eq!(missing.len(), 1);
        assert_eq!(missing[0].1.args.strategy.streams, None);
    }

    #[test]
    fn non_finite_level_counts_as_missing() {
        let group = make_group("g", "g", vec![make_run(Some(f64::NAN), &[10.0])]);
        let groups = [group];
        assert!(aggregate(&groups, Metric::TimeToFirstToken, XAxis::Concurrency).is_empty());
        assert_eq!(runs_without_level(&groups, XAxis::Concurrency).len(), 1);
    }

    #[test]
    fn run_level_metric_averages_summaries() {
        let group = make_group(
            "g",
            "g",
            vec![
                with_rps_summary(make_run(Some(4.0), &[]), 2.0, 3.0),
                with_rps_summary(make_run(Some(4.0), &[]), 4.0, 5.0),
            ],
        );
        let series = aggregate(&[group], Metric::RequestsPerSecond, XAxis::Concurrency);
        let point = &series[0].points[0];
        assert_eq!(point.value(Statistic::Mean), Some(3.0));
        assert_eq!(point.value(Statistic::P95), Some(4.0));
        assert_eq!(point.stats.min, Some(1.0));
        assert_eq!(point.stats.max, Some(6.0));
        assert_eq!(point.stats.count, 2);
    }

    #[test]
    fn metric_without_any_data_yields_no_series() {
        let group = make_group("g", "g", vec![make_run(Some(1.0), &[10.0])]);
        let series = aggregate(&[group], Metric::InterTokenLatency, XAxis::Concurrency);
        assert!(series.is_empty());
    }

    #[test]
    fn per_request_metric_falls_back_to_summary_without_requests() {
        let mut run = make_run(Some(2.0), &[]);
        run.metrics.insert(
            "time_to_first_token_ms".to_string(),
            StatusDistribution {
                successful: Some(DistributionSummary {
                    mean: Some(80.0),
                    median: Some(75.0),
                    ..Default::default()
                }),
                ..Default::default()
            },
        );
        let group = make_group("g", "g", vec![run]);
        let series = aggregate(&[group], Metric::TimeToFirstToken, XAxis::Concurrency);
        let point = &series[0].points[0];
        assert_eq!(point.value(Statistic::Mean), Some(80.0));
        assert_eq!(point.value(Statistic::Median), Some(75.0));
    }
}
