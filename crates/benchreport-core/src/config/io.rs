use std::path::{Path, PathBuf};

use crate::config::model::ReportConfig;
use crate::error::ReportError;

/// Read a YAML report config from disk.
///
/// Relative file patterns and output paths are rebased onto the directory
/// containing the config file, so a config can be invoked from anywhere.
pub async fn read_config(path: impl AsRef<Path>) -> Result<ReportConfig, ReportError> {
    let path = path.as_ref();
    let content = tokio::fs::read_to_string(path).await?;
    let mut config: ReportConfig = serde_yaml::from_str(&content)?;

    let base = path.parent().unwrap_or_else(|| Path::new(""));
    resolve_paths(&mut config, base);
    tracing::debug!(
        path = %path.display(),
        groups = config.data_groups.len(),
        "loaded report config"
    );
    Ok(config)
}

/// Rebase every relative path in `config` onto `base`.
pub fn resolve_paths(config: &mut ReportConfig, base: &Path) {
    if base.as_os_str().is_empty() {
        return;
    }
    config.output = rebase(base, &config.output);
    if let Some(csv) = config.summary_csv.take() {
        config.summary_csv = Some(rebase(base, &csv));
    }
    for group in &mut config.data_groups {
        for pattern in &mut group.files {
            let rebased = rebase(base, Path::new(pattern.as_str()));
            *pattern = rebased.to_string_lossy().into_owned();
        }
    }
}

fn rebase(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
