use serde::{Deserialize, Serialize};

use crate::data::DataGroup;
use crate::stats::Metric;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct HistogramSeries {
    pub color_key: String,
    /// One count per bucket; same length for every series.
    pub counts: Vec<u64>,
}

/// Equal-width histogram with edges shared by every series, so the series
/// can be overlaid on one chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Histogram {
    pub metric: Metric,
    /// `bins + 1` ascending edges. The last bucket is closed on both ends.
    pub edges: Vec<f64>,
    pub series: Vec<HistogramSeries>,
}

impl Histogram {
    pub fn bins(&self) -> usize {
        self.edges.len().saturating_sub(1)
    }

    pub fn midpoints(&self) -> Vec<f64> {
        self.edges.windows(2).map(|w| (w[0] + w[1]) / 2.0).collect()
    }
}

/// Collect per-request values of `metric` from every successful request,
/// grouped by color key in order of first appearance.
pub fn request_distribution(groups: &[DataGroup], metric: Metric) -> Vec<(String, Vec<f64>)> {
    let mut out: Vec<(String, Vec<f64>)> = Vec::new();
    for group in groups {
        let values = group.runs.iter().flat_map(|run| metric.request_values(run));
        match out.iter_mut().find(|(key, _)| *key == group.color_key) {
            Some((_, existing)) => existing.extend(values),
            None => out.push((group.color_key.clone(), values.collect())),
        }
    }
    out.retain(|(_, values)| !values.is_empty());
    out
}

/// Bucket every series into `bins` equal-width buckets over the global
/// `[min, max]` of all values.
///
/// When every value is identical a single bucket is produced. Returns
/// `None` when there are no finite values at all.
pub fn histogram(metric: Metric, inputs: &[(String, Vec<f64>)], bins: usize) -> Option<Histogram> {
    let finite = || {
        inputs
            .iter()
            .flat_map(|(_, values)| values.iter().copied())
            .filter(|v| v.is_finite())
    };
    let min = finite().reduce(f64::min)?;
    let max = finite().reduce(f64::max)?;

    let bins = if max > min { bins.max(1) } else { 1 };
    let width = (max - min) / bins as f64;
    let edges: Vec<f64> = (0..=bins)
        .map(|i| if i == bins { max } else { min + width * i as f64 })
        .collect();

    let series = inputs
        .iter()
        .map(|(color_key, values)| {
            let mut counts = vec![0u64; bins];
            for v in values.iter().copied().filter(|v| v.is_finite()) {
                let idx = if width > 0.0 {
                    (((v - min) / width).floor() as usize).min(bins - 1)
                } else {
                    0
                };
                counts[idx] += 1;
            }
            HistogramSeries {
                color_key: color_key.clone(),
                counts,
            }
        })
        .collect();

    Some(Histogram {
        metric,
        edges,
        series,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
