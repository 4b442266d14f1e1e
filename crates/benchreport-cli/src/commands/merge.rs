use std::path::Path;

use benchreport_core::merge::{merge_benchmark_files, write_merged};
use benchreport_core::ReportError;

pub async fn merge(input_dir: &Path, output: &Path) -> Result<(), ReportError> {
    if !input_dir.is_dir() {
        return Err(ReportError::Config(format!(
            "input directory not found: {}",
            input_dir.display()
        )));
    }
    let merged = merge_benchmark_files(input_dir).await?;
    write_merged(output, &merged).await?;
    let count = merged["benchmarks"].as_array().map_or(0, Vec::len);
    println!("Merged {count} benchmark(s) into {}", output.display());
    Ok(())
}
