pub mod export;
pub mod html;

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::chart::{histogram_figure, metric_figure, ColorMap, Figure};
use crate::config::{ReportConfig, Statistic, XAxis};
use crate::data::DataGroup;
use crate::stats::{
    aggregate, histogram, request_distribution, runs_without_level, summary_rows, Metric,
    SummaryRow,
};

pub use export::{export_summary_csv, export_summary_json, write_report};
pub use html::render_html;

const LATENCY_METRICS: [Metric; 4] = [
    Metric::RequestLatency,
    Metric::TimeToFirstToken,
    Metric::InterTokenLatency,
    Metric::TimePerOutputToken,
];

const THROUGHPUT_METRICS: [Metric; 4] = [
    Metric::OutputTokensPerSecond,
    Metric::TotalTokensPerSecond,
    Metric::RequestsPerSecond,
    Metric::RequestConcurrency,
];

const TOKEN_METRICS: [Metric; 2] = [Metric::PromptTokens, Metric::OutputTokens];

// ---------------------------------------------------------------------------
// Report model
// ---------------------------------------------------------------------------

/// A tab of the report holding one or more figures.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tab {
    pub id: String,
    pub title: String,
    pub figures: Vec<Figure>,
}

/// Lightweight description of a loaded data group for the overview.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct GroupInfo {
    pub name: String,
    pub color_key: String,
    pub extra_metadata: BTreeMap<String, String>,
    pub runs: usize,
}

/// Everything needed to render the HTML document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Report {
    pub title: String,
    pub generated_at: DateTime<Utc>,
    pub x_axis: XAxis,
    pub color_by: Option<String>,
    pub statistics: Vec<Statistic>,
    pub groups: Vec<GroupInfo>,
    pub rows: Vec<SummaryRow>,
    /// Chart tabs, shown after the overview.
    pub tabs: Vec<Tab>,
}

impl Report {
    pub fn total_runs(&self) -> usize {
        self.rows.len()
    }

    pub fn total_requests(&self) -> u64 {
        self.rows.iter().map(|r| r.total_requests()).sum()
    }

    pub fn error_rate(&self) -> f64 {
        let total = self.total_requests();
        if total == 0 {
            return 0.0;
        }
        let errored: u64 = self.rows.iter().map(|r| r.errored_requests).sum();
        errored as f64 / total as f64
    }

    pub fn figures(&self) -> impl Iterator<Item = &Figure> {
        self.tabs.iter().flat_map(|t| t.figures.iter())
    }

    /// Color assignment shared by every chart and the overview swatches.
    pub fn colors(&self) -> ColorMap {
        ColorMap::new(self.groups.iter().map(|g| g.color_key.as_str()))
    }
}

// ---------------------------------------------------------------------------
// build_report
// ---------------------------------------------------------------------------

/// Aggregate the loaded groups into a report.
///
/// Metrics excluded by the config are skipped, figures without data are
/// dropped and tabs left with no figures are omitted.
pub fn build_report(config: &ReportConfig, groups: &[DataGroup]) -> Report {
    let axis = config.x_axis;
    let colors = ColorMap::new(groups.iter().map(|g| g.color_key.as_str()));

    for (group, run) in runs_without_level(groups, axis) {
        tracing::warn!(
            group = %group.name,
            file = run.source_file.as_deref().unwrap_or("?"),
            "run has no {axis} level, excluded from charts"
        );
    }
    let included = |metrics: &[Metric]| -> Vec<Metric> {
        metrics
            .iter()
            .copied()
            .filter(|m| config.includes_metric(*m))
            .collect()
    };

    let level_figures = |metrics: &[Metric]| -> Vec<Figure> {
        included(metrics)
            .into_iter()
            .map(|m| {
                let series = aggregate(groups, m, axis);
                metric_figure(m, &series, &config.statistics, axis, &colors)
            })
            .filter(|f| !f.is_empty())
            .collect()
    };

    let histogram_figures = |metrics: &[Metric]| -> Vec<Figure> {
        included(metrics)
            .into_iter()
            .filter_map(|m| {
                histogram(m, &request_distribution(groups, m), config.histogram_bins)
            })
            .map(|h| histogram_figure(&h, &colors))
            .collect()
    };

    let candidates = [
        ("latency", "Latency", level_figures(&LATENCY_METRICS)),
        ("throughput", "Throughput", level_figures(&THROUGHPUT_METRICS)),
        ("histograms", "Histograms", histogram_figures(&LATENCY_METRICS)),
        ("tokens", "Token Lengths", histogram_figures(&TOKEN_METRICS)),
    ];

    let tabs: Vec<Tab> = candidates
        .into_iter()
        .filter(|(_, _, figures)| !figures.is_empty())
        .map(|(id, title, figures)| Tab {
            id: id.to_string(),
            title: title.to_string(),
            figures,
        })
        .collect();

    tracing::info!(
        tabs = tabs.len(),
        figures = tabs.iter().map(|t| t.figures.len()).sum::<usize>(),
        "built report"
    );

    Report {
        title: config.title.clone(),
        generated_at: Utc::now(),
        x_axis: axis,
        color_by: config.color_by.clone(),
        statistics: config.statistics.clone(),
        groups: groups
            .iter()
            .map(|g| GroupInfo {
                name: g.name.clone(),
                color_key: g.color_key.clone(),
                extra_metadata: g.extra_metadata.clone(),
                runs: g.runs.len(),
            })
            .collect(),
        rows: summary_rows(groups, axis),
        tabs,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
