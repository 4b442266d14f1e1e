//! Chart figures and their Chart.js serialization.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::config::{Statistic, XAxis};
use crate::stats::{AggregatedSeries, Histogram, Metric};

/// Series colors, assigned by color-key ordinal.
pub const PALETTE: &[&str] = &[
    "#1976d2", "#e53935", "#43a047", "#fb8c00", "#8e24aa", "#00acc1", "#6d4c41", "#546e7a",
    "#c0ca33", "#d81b60",
];

pub fn palette_color(index: usize) -> &'static str {
    PALETTE[index % PALETTE.len()]
}

/// Report-wide color assignment: each color key keeps the palette slot of
/// its first appearance, whatever subset of keys a given chart shows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColorMap {
    keys: Vec<String>,
}

impl ColorMap {
    pub fn new<'a>(keys: impl IntoIterator<Item = &'a str>) -> Self {
        let mut map = ColorMap::default();
        for key in keys {
            if !map.keys.iter().any(|k| k == key) {
                map.keys.push(key.to_string());
            }
        }
        map
    }

    /// Palette color for `key`. Unknown keys share the first unused slot.
    pub fn color(&self, key: &str) -> &'static str {
        let idx = self
            .keys
            .iter()
            .position(|k| k == key)
            .unwrap_or(self.keys.len());
        palette_color(idx)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    Line,
    Bar,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    pub label: String,
    pub color: String,
    pub dashed: bool,
    /// `(x, y)` pairs. Bar charts use `x` only as a category label.
    pub points: Vec<(f64, f64)>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Figure {
    /// DOM id of the canvas; unique within a report.
    pub id: String,
    pub title: String,
    pub kind: ChartKind,
    pub x_label: String,
    pub y_label: String,
    pub log_x: bool,
    pub datasets: Vec<Dataset>,
}

impl Figure {
    pub fn is_empty(&self) -> bool {
        self.datasets.iter().all(|d| d.points.is_empty())
    }

    /// Chart.js configuration object for this figure.
    pub fn to_chartjs(&self) -> Value {
        match self.kind {
            ChartKind::Line => self.line_config(),
            ChartKind::Bar => self.bar_config(),
        }
    }

    fn line_config(&self) -> Value {
        let datasets: Vec<Value> = self
            .datasets
            .iter()
            .map(|d| {
                let data: Vec<Value> = d.points.iter().map(|(x, y)| json!({"x": x, "y": y})).collect();
                json!({
                    "label": d.label,
                    "data": data,
                    "borderColor": d.color,
                    "backgroundColor": d.color,
                    "borderDash": if d.dashed { json!([6, 4]) } else { json!([]) },
                    "pointRadius": 3,
                    "tension": 0.1,
                    "fill": false,
                })
            })
            .collect();

        json!({
            "type": "line",
            "data": {"datasets": datasets},
            "options": {
                "responsive": true,
                "maintainAspectRatio": false,
                "interaction": {"mode": "nearest", "intersect": false},
                "plugins": {
                    "title": {"display": true, "text": self.title},
                    "legend": {"position": "bottom"},
                },
                "scales": {
                    "x": {
                        "type": if self.log_x { "logarithmic" } else { "linear" },
                        "title": {"display": true, "text": self.x_label},
                    },
                    "y": {
                        "beginAtZero": true,
                        "title": {"display": true, "text": self.y_label},
                    },
                },
            },
        })
    }

    fn bar_config(&self) -> Value {
        let labels: Vec<String> = self
            .datasets
            .first()
            .map(|d| d.points.iter().map(|(x, _)| format_tick(*x)).collect())
            .unwrap_or_default();
        let datasets: Vec<Value> = self
            .datasets
            .iter()
            .map(|d| {
                let data: Vec<f64> = d.points.iter().map(|(_, y)| *y).collect();
                json!({
                    "label": d.label,
                    "data": data,
                    "backgroundColor": format!("{}b3", d.color),
                    "borderColor": d.color,
                    "borderWidth": 1,
                })
            })
            .collect();

        json!({
            "type": "bar",
            "data": {"labels": labels, "datasets": datasets},
            "options": {
                "responsive": true,
                "maintainAspectRatio": false,
                "plugins": {
                    "title": {"display": true, "text": self.title},
                    "legend": {"position": "bottom"},
                },
                "scales": {
                    "x": {"title": {"display": true, "text": self.x_label}},
                    "y": {
                        "beginAtZero": true,
                        "title": {"display": true, "text": self.y_label},
                    },
                },
            },
        })
    }
}

/// Short label for a bucket midpoint.
pub fn format_tick(value: f64) -> String {
    let abs = value.abs();
    if abs >= 100.0 || abs == 0.0 {
        format!("{value:.0}")
    } else if abs >= 1.0 {
        format!("{value:.1}")
    } else {
        format!("{value:.3}")
    }
}

fn axis_label(metric: Metric) -> String {
    format!("{} ({})", metric.title(), metric.unit())
}

fn slug(metric: Metric) -> &'static str {
    metric.summary_key()
}

/// One line chart for `metric`: a dataset per (color key, statistic).
///
/// Colors come from `colors`; the mean is drawn solid and every other
/// statistic dashed.
pub fn metric_figure(
    metric: Metric,
    series: &[AggregatedSeries],
    statistics: &[Statistic],
    axis: XAxis,
    colors: &ColorMap,
) -> Figure {
    let mut datasets = Vec::new();
    for s in series {
        for stat in statistics {
            let points: Vec<(f64, f64)> = s
                .points
                .iter()
                .filter_map(|p| p.value(*stat).map(|v| (p.level, v)))
                .collect();
            if points.is_empty() {
                continue;
            }
            datasets.push(Dataset {
                label: format!("{} ({})", s.color_key, stat),
                color: colors.color(&s.color_key).to_string(),
                dashed: *stat != Statistic::Mean,
                points,
            });
        }
    }

    Figure {
        id: format!("chart-{}", slug(metric)),
        title: format!("{} vs {}", metric.title(), axis.label()),
        kind: ChartKind::Line,
        x_label: axis.label().to_string(),
        y_label: axis_label(metric),
        log_x: axis == XAxis::Concurrency && spans_decades(series),
        datasets,
    }
}

/// Bar chart of a per-request distribution, one dataset per color key.
pub fn histogram_figure(histogram: &Histogram, colors: &ColorMap) -> Figure {
    let midpoints = histogram.midpoints();
    let datasets = histogram
        .series
        .iter()
        .map(|s| Dataset {
            label: s.color_key.clone(),
            color: colors.color(&s.color_key).to_string(),
            dashed: false,
            points: midpoints
                .iter()
                .zip(s.counts.iter())
                .map(|(x, c)| (*x, *c as f64))
                .collect(),
        })
        .collect();

    Figure {
        id: format!("hist-{}", slug(histogram.metric)),
        title: format!("{} Distribution", histogram.metric.title()),
        kind: ChartKind::Bar,
        x_label: axis_label(histogram.metric),
        y_label: "Requests".to_string(),
        log_x: false,
        datasets,
    }
}

/// Concurrency sweeps like 1, 2, 4, ..., 256 read better on a log axis.
fn spans_decades(series: &[AggregatedSeries]) -> bool {
    let levels = || series.iter().flat_map(|s| s.points.iter().map(|p| p.level));
    let min = levels().filter(|l| *l > 0.0).reduce(f64::min);
    let max = levels().reduce(f64::max);
    match (min, max) {
        (Some(min), Some(max)) => max / min >= 100.0,
        _ => false,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::{summarize, SeriesPoint};

    fn make_series(key: &str, levels: &[f64]) -> AggregatedSeries {
        AggregatedSeries {
            metric: Metric::TimeToFirstToken,
            color_key: key.to_string(),
            points: levels
                .iter()
                .map(|l| SeriesPoint {
                    level: *l,
                    runs: 1,
                    stats: summarize(&[*l * 10.0, *l * 20.0]).expect("non-empty"),
                })
                .collect(),
        }
    }

    fn make_histogram() -> Histogram {
        crate::stats::histogram(
            Metric::RequestLatency,
            &[
                ("vllm".to_string(), vec![1.0, 2.0, 3.0]),
                ("llm-d".to_string(), vec![2.0, 4.0]),
            ],
            3,
        )
        .expect("has data")
    }

    fn make_colors() -> ColorMap {
        ColorMap::new(["vllm", "llm-d"])
    }

    #[test]
    fn palette_wraps() {
        assert_eq!(palette_color(0), palette_color(PALETTE.len()));
    }

    #[test]
    fn color_map_keeps_first_appearance_order() {
        let colors = ColorMap::new(["vllm", "llm-d", "vllm", "sglang"]);
        assert_eq!(colors.color("vllm"), palette_color(0));
        assert_eq!(colors.color("llm-d"), palette_color(1));
        assert_eq!(colors.color("sglang"), palette_color(2));
        assert_eq!(colors.color("other"), palette_color(3));
    }

    #[test]
    fn key_keeps_its_color_when_earlier_key_has_no_data() {
        let colors = make_colors();
        let both = [make_series("vllm", &[1.0]), make_series("llm-d", &[1.0])];
        let only_second = [make_series("llm-d", &[1.0])];
        let stats = [Statistic::Mean];
        let full = metric_figure(Metric::TimeToFirstToken, &both, &stats, XAxis::Rps, &colors);
        let partial = metric_figure(
            Metric::InterTokenLatency,
            &only_second,
            &stats,
            XAxis::Rps,
            &colors,
        );
        assert_eq!(full.datasets[1].color, partial.datasets[0].color);
        assert_eq!(partial.datasets[0].color, palette_color(1));

        let hist = crate::stats::histogram(
            Metric::InterTokenLatency,
            &[("llm-d".to_string(), vec![1.0, 2.0])],
            2,
        )
        .expect("has data");
        assert_eq!(histogram_figure(&hist, &colors).datasets[0].color, palette_color(1));
    }

    #[test]
    fn metric_figure_has_dataset_per_key_and_stat() {
        let series = [make_series("vllm", &[1.0, 2.0]), make_series("llm-d", &[1.0])];
        let fig = metric_figure(
            Metric::TimeToFirstToken,
            &series,
            &[Statistic::Mean, Statistic::P95],
            XAxis::Concurrency,
            &make_colors(),
        );
        assert_eq!(fig.datasets.len(), 4);
        assert_eq!(fig.datasets[0].label, "vllm (mean)");
        assert!(!fig.datasets[0].dashed);
        assert!(fig.datasets[1].dashed);
        assert_eq!(fig.datasets[0].color, fig.datasets[1].color);
        assert_ne!(fig.datasets[0].color, fig.datasets[2].color);
        assert_eq!(fig.id, "chart-time_to_first_token_ms");
        assert_eq!(fig.y_label, "Time to First Token (ms)");
    }

    #[test]
    fn metric_figure_uses_log_axis_for_wide_concurrency_sweeps() {
        let wide = [make_series("a", &[1.0, 256.0])];
        let narrow = [make_series("a", &[1.0, 16.0])];
        let stats = [Statistic::Mean];
        let colors = ColorMap::new(["a"]);
        let figure = |series: &[AggregatedSeries], axis| {
            metric_figure(Metric::TimeToFirstToken, series, &stats, axis, &colors)
        };
        assert!(figure(&wide[..], XAxis::Concurrency).log_x);
        assert!(!figure(&narrow[..], XAxis::Concurrency).log_x);
        assert!(!figure(&wide[..], XAxis::Rps).log_x);
    }

    #[test]
    fn empty_series_yield_empty_figure() {
        let fig = metric_figure(
            Metric::RequestLatency,
            &[],
            &[Statistic::Mean],
            XAxis::Rps,
            &ColorMap::default(),
        );
        assert!(fig.is_empty());
    }

    #[test]
    fn line_config_serializes_points() {
        let series = [make_series("vllm", &[2.0])];
        let fig = metric_figure(
            Metric::TimeToFirstToken,
            &series,
            &[Statistic::Mean],
            XAxis::Rps,
            &make_colors(),
        );
        let cfg = fig.to_chartjs();
        assert_eq!(cfg["type"], "line");
        let point = &cfg["data"]["datasets"][0]["data"][0];
        assert_eq!(point["x"], 2.0);
        assert_eq!(point["y"], 30.0);
        assert_eq!(cfg["options"]["scales"]["x"]["type"], "linear");
    }

    #[test]
    fn histogram_figure_uses_midpoint_labels() {
        let fig = histogram_figure(&make_histogram(), &make_colors());
        assert_eq!(fig.kind, ChartKind::Bar);
        assert_eq!(fig.datasets.len(), 2);
        let cfg = fig.to_chartjs();
        assert_eq!(cfg["type"], "bar");
        assert_eq!(cfg["data"]["labels"].as_array().map(|a| a.len()), Some(3));
        assert_eq!(cfg["data"]["datasets"][1]["label"], "llm-d");
    }

    #[test]
    fn format_tick_scales_precision() {
        assert_eq!(format_tick(1234.56), "1235");
        assert_eq!(format_tick(12.34), "12.3");
        assert_eq!(format_tick(0.01234), "0.012");
        assert_eq!(format_tick(0.0), "0");
    }
}
