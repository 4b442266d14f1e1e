use std::path::Path;

use clap::ValueEnum;

use benchreport_core::config::Statistic;
use benchreport_core::data::load_groups;
use benchreport_core::report::{export_summary_csv, export_summary_json};
use benchreport_core::stats::{summary_rows, SummaryRow};
use benchreport_core::ReportError;

use super::load_valid_config;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SummaryFormat {
    /// Aligned text columns
    Table,
    /// Every metric and statistic as CSV
    Csv,
    /// Full rows as JSON
    Json,
}

pub async fn summary(config_path: &Path, format: SummaryFormat) -> Result<(), ReportError> {
    let config = load_valid_config(config_path).await?;
    let groups = load_groups(&config).await?;
    let rows = summary_rows(&groups, config.x_axis);

    let text = match format {
        SummaryFormat::Table => render_table(&rows, config.x_axis.label()),
        SummaryFormat::Csv => export_summary_csv(&rows)?,
        SummaryFormat::Json => export_summary_json(&rows)?,
    };
    print!("{text}");
    if !text.ends_with('\n') {
        println!();
    }
    Ok(())
}

/// Render one line per run with the mean of the headline metrics.
fn render_table(rows: &[SummaryRow], level_label: &str) -> String {
    let mut header = vec![
        "group".to_string(),
        level_label.to_string(),
        "strategy".to_string(),
        "ok".to_string(),
        "errors".to_string(),
    ];
    header.extend(
        SummaryRow::TABLE_METRICS
            .iter()
            .map(|m| format!("{} ({})", m.title(), m.unit())),
    );

    let mut lines: Vec<Vec<String>> = vec![header];
    for row in rows {
        let mut line = vec![
            row.group.clone(),
            row.level.map(format_number).unwrap_or_else(|| "-".to_string()),
            row.strategy.clone(),
            row.successful_requests.to_string(),
            row.errored_requests.to_string(),
        ];
        line.extend(SummaryRow::TABLE_METRICS.iter().map(|m| {
            row.metric(*m)
                .and_then(|s| s.get(Statistic::Mean))
                .map(format_number)
                .unwrap_or_else(|| "-".to_string())
        }));
        lines.push(line);
    }

    let columns = lines[0].len();
    let widths: Vec<usize> = (0..columns)
        .map(|i| lines.iter().map(|l| l[i].chars().count()).max().unwrap_or(0))
        .collect();

    let mut out = String::new();
    for line in &lines {
        let cells: Vec<String> = line
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{cell:<width$}"))
            .collect();
        out.push_str(cells.join("  ").trim_end());
        out.push('\n');
    }
    out
}

fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e12 {
        format!("{value:.0}")
    } else if value.abs() >= 100.0 {
        format!("{value:.1}")
    } else {
        format!("{value:.3}")
    }
}
