use std::path::Path;

use crate::config::Statistic;
use crate::error::ReportError;
use crate::stats::{Metric, SummaryRow};

// ---------------------------------------------------------------------------
// CSV export
// ---------------------------------------------------------------------------

const FIXED_COLUMNS: [&str; 10] = [
    "group",
    "color_key",
    "level",
    "strategy",
    "source_file",
    "started_at",
    "duration_secs",
    "successful_requests",
    "errored_requests",
    "incomplete_requests",
];

/// Export the summary table as CSV.
///
/// One row per benchmark run; every metric contributes one column per
/// statistic, named `<summary key>_<statistic>` (e.g.
/// `time_to_first_token_ms_p95`). Missing values are empty cells.
pub fn export_summary_csv(rows: &[SummaryRow]) -> Result<String, ReportError> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    let mut header: Vec<String> = FIXED_COLUMNS.iter().map(|c| c.to_string()).collect();
    for metric in Metric::ALL {
        for stat in Statistic::ALL {
            header.push(format!("{}_{}", metric.summary_key(), stat.label()));
        }
    }
    writer.write_record(&header)?;

    for row in rows {
        let mut record = vec![
            row.group.clone(),
            row.color_key.clone(),
            opt_cell(row.level),
            row.strategy.clone(),
            row.source_file.clone(),
            row.started_at
                .map(|t| t.to_rfc3339_opts(chrono::SecondsFormat::Millis, true))
                .unwrap_or_default(),
            opt_cell(row.duration_secs),
            row.successful_requests.to_string(),
            row.errored_requests.to_string(),
            row.incomplete_requests.to_string(),
        ];
        for metric in Metric::ALL {
            let stats = row.metric(metric);
            for stat in Statistic::ALL {
                record.push(opt_cell(stats.and_then(|s| s.get(stat))));
            }
        }
        writer.write_record(&record)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| ReportError::Internal(format!("CSV buffer flush failed: {e}")))?;
    String::from_utf8(bytes)
        .map_err(|e| ReportError::Internal(format!("CSV output is not UTF-8: {e}")))
}

fn opt_cell(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

// ---------------------------------------------------------------------------
// JSON export
// ---------------------------------------------------------------------------

/// Export the summary table as pretty-printed JSON.
pub fn export_summary_json(rows: &[SummaryRow]) -> Result<String, ReportError> {
    Ok(serde_json::to_string_pretty(rows)?)
}

// ---------------------------------------------------------------------------
// File output
// ---------------------------------------------------------------------------

/// Write `content` to `path`, creating missing parent directories.
pub async fn write_report(path: impl AsRef<Path>, content: &str) -> Result<(), ReportError> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await?;
        }
    }
    tokio::fs::write(path, content).await?;
    tracing::info!(path = %path.display(), bytes = content.len(), "wrote output");
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::XAxis;
    use crate::report::tests::make_group;
    use crate::stats::summary_rows;

    fn make_rows() -> Vec<SummaryRow> {
        summary_rows(
            &[make_group("a", "vllm", 1.0), make_group("b,c", "llm-d", 2.0)],
            XAxis::Concurrency,
        )
    }

    #[test]
    fn csv_has_header_and_one_line_per_row() {
        let csv = export_summary_csv(&make_rows()).expect("export should succeed");
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 5);
        assert!(lines[0].starts_with("group,color_key,level,strategy,source_file"));
        assert!(lines[0].contains("time_to_first_token_ms_p95"));
    }

    #[test]
    fn csv_header_width_matches_rows() {
        let csv = export_summary_csv(&make_rows()).expect("export should succeed");
        let mut reader = csv::Reader::from_reader(csv.as_bytes());
        let width = reader.headers().expect("header").len();
        assert_eq!(width, FIXED_COLUMNS.len() + Metric::ALL.len() * Statistic::ALL.len());
        for record in reader.records() {
            assert_eq!(record.expect("valid record").len(), width);
        }
    }

    #[test]
    fn csv_quotes_fields_with_commas() {
        let csv = export_summary_csv(&make_rows()).expect("export should succeed");
        assert!(csv.contains("\"b,c\""));
    }

    #[test]
    fn csv_for_empty_rows_is_header_only() {
        let csv = export_summary_csv(&[]).expect("export should succeed");
        assert_eq!(csv.lines().count(), 1);
    }

    #[test]
    fn json_export_is_array_of_rows() {
        let json = export_summary_json(&make_rows()).expect("export should succeed");
        let parsed: serde_json::Value = serde_json::from_str(&json).expect("valid JSON");
        let rows = parsed.as_array().expect("array");
        assert_eq!(rows.len(), 4);
        assert_eq!(rows[0]["group"], "a");
        assert!(rows[0]["metrics"]["request_latency"]["p95"].is_number());
    }

    #[tokio::test]
    async fn write_report_creates_parent_directories() {
        let dir = tempfile::tempdir().expect("tempdir should be created");
        let path = dir.path().join("nested/out/report.html");
        write_report(&path, "<html></html>")
            .await
            .expect("write should succeed");
        let content = tokio::fs::read_to_string(&path)
            .await
            .expect("file should be readable");
        assert_eq!(content, "<html></html>");
    }
}
