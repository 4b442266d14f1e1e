use std::path::{Path, PathBuf};

use benchreport_core::data::load_groups;
use benchreport_core::report::{build_report, export_summary_csv, render_html, write_report};
use benchreport_core::ReportError;

use super::load_valid_config;

/// Build the HTML report and, when requested, the summary CSV.
///
/// Paths given on the command line win over the ones in the config.
pub async fn generate(
    config_path: &Path,
    output: Option<PathBuf>,
    summary_csv: Option<PathBuf>,
) -> Result<(), ReportError> {
    let mut config = load_valid_config(config_path).await?;
    if let Some(output) = output {
        config.output = output;
    }
    if let Some(csv_path) = summary_csv {
        config.summary_csv = Some(csv_path);
    }

    let groups = load_groups(&config).await?;
    let report = build_report(&config, &groups);
    let html = render_html(&report)?;
    write_report(&config.output, &html).await?;

    if let Some(csv_path) = &config.summary_csv {
        let csv = export_summary_csv(&report.rows)?;
        write_report(csv_path, &csv).await?;
    }

    println!(
        "Wrote report with {} run(s) to {}",
        report.total_runs(),
        config.output.display()
    );
    Ok(())
}
