//! Subcommand implementations.

mod generate;
mod merge;
mod summary;

use std::path::Path;

use benchreport_core::config::{read_config, validate_config, ReportConfig};
use benchreport_core::ReportError;

pub use generate::generate;
pub use merge::merge;
pub use summary::{summary, SummaryFormat};

/// Read a config and fail with every validation problem at once.
async fn load_valid_config(path: &Path) -> Result<ReportConfig, ReportError> {
    let config = read_config(path).await?;
    let errors = validate_config(&config);
    if !errors.is_empty() {
        for e in &errors {
            tracing::debug!("{e}");
        }
        let joined = errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ");
        return Err(ReportError::Config(format!(
            "{} has {} problem(s): {joined}",
            path.display(),
            errors.len()
        )));
    }
    Ok(config)
}
