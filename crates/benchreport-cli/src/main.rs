//! benchreport command line interface

mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::SummaryFormat;

/// Turn load-test benchmark results into an interactive HTML report.
#[derive(Parser)]
#[command(name = "benchreport")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log at debug level (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate the HTML report described by a YAML config
    Generate {
        /// Report config file
        #[arg(short, long, value_name = "YAML")]
        config: PathBuf,

        /// Override the config's output path
        #[arg(short, long, value_name = "HTML")]
        output: Option<PathBuf>,

        /// Also write the summary table as CSV
        #[arg(long, value_name = "CSV")]
        summary_csv: Option<PathBuf>,
    },

    /// Print the per-run summary table
    Summary {
        /// Report config file
        #[arg(short, long, value_name = "YAML")]
        config: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = SummaryFormat::Table)]
        format: SummaryFormat,
    },

    /// Merge a directory of single-run benchmark files into one file
    Merge {
        /// Directory containing JSON benchmark files
        #[arg(short, long, value_name = "DIR")]
        input_dir: PathBuf,

        /// Output JSON file path
        #[arg(short, long, value_name = "JSON")]
        output: PathBuf,
    },
}

fn init_logging(verbose: bool) {
    let default = if verbose {
        "benchreport=debug,benchreport_core=debug"
    } else {
        "benchreport=info,benchreport_core=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Command::Generate {
            config,
            output,
            summary_csv,
        } => commands::generate(&config, output, summary_csv).await,
        Command::Summary { config, format } => commands::summary(&config, format).await,
        Command::Merge { input_dir, output } => commands::merge(&input_dir, &output).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
