use std::collections::HashSet;

use crate::config::model::{DataGroupConfig, ReportConfig};
use crate::error::ReportError;

/// Validate a [`ReportConfig`] and return a list of validation errors.
///
/// An empty `Vec` means the config is valid.
pub fn validate_config(config: &ReportConfig) -> Vec<ReportError> {
    let mut errors = Vec::new();

    if config.data_groups.is_empty() {
        errors.push(ReportError::Config(
            "at least one data group is required".to_string(),
        ));
    }

    if config.statistics.is_empty() {
        errors.push(ReportError::Config(
            "statistics must list at least one of mean, median, p95, p99".to_string(),
        ));
    }

    if config.histogram_bins == 0 {
        errors.push(ReportError::Config(
            "histogram_bins must be at least 1".to_string(),
        ));
    }

    let mut seen = HashSet::new();
    for group in &config.data_groups {
        if !group.name.trim().is_empty() && !seen.insert(group.name.as_str()) {
            errors.push(ReportError::Config(format!(
                "Data group '{}' is defined more than once",
                group.name
            )));
        }
        errors.extend(validate_group(group, config.color_by()));
    }

    errors
}

fn validate_group(group: &DataGroupConfig, color_by: Option<&str>) -> Vec<ReportError> {
    let mut errors = Vec::new();

    if group.name.trim().is_empty() {
        errors.push(ReportError::Config(
            "Data group name must not be empty".to_string(),
        ));
    }

    if group.files.iter().all(|f| f.trim().is_empty()) {
        errors.push(ReportError::Config(format!(
            "Data group '{}': files must list at least one pattern",
            group.name
        )));
    }

    if let Some(key) = color_by {
        if !group.extra_metadata.contains_key(key) {
            errors.push(ReportError::Config(format!(
                "Data group '{}': extra_metadata is missing color_by key '{}'",
                group.name, key
            )));
        }
    }

    errors
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
