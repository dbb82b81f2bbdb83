//! `ingest` command: load a snapshot checkout into the configured store

use std::path::{Path, PathBuf};

use indicatif::{ProgressBar, ProgressStyle};

use super::{load_config, open_backend, parse_format, runtime};
use crate::cli::error::CliError;
use crate::database::{OutputFormat, format_query_result};
use crate::ingest::{IngestOptions, Ingestor, RunSummary};

/// Ingest command arguments
#[derive(Debug, Clone)]
pub struct IngestArgs {
    /// Directory holding `.pulse-loader.toml`
    pub config_dir: PathBuf,
    /// Snapshot root (overrides `[dataset] root`)
    pub root: Option<PathBuf>,
    /// Glob pattern (overrides `[dataset] pattern`)
    pub pattern: Option<String>,
    /// Extract files concurrently
    pub parallel: bool,
    /// Hide the progress bar
    pub quiet: bool,
    /// Output format for the run summary
    pub format: String,
}

/// Run one ingestion and print its summary
///
/// Every run prints a summary with its status; a failed run prints what it
/// gathered before returning the error.
pub fn handle_ingest(args: &IngestArgs) -> Result<RunSummary, CliError> {
    let config = load_config(&args.config_dir)?;
    let output_format = parse_format(&args.format)?;

    let root = args
        .root
        .clone()
        .unwrap_or_else(|| config.dataset_root(&args.config_dir));
    if !root.is_dir() {
        return Err(CliError::DatasetNotFound(root));
    }
    let pattern = args
        .pattern
        .clone()
        .unwrap_or_else(|| config.dataset.pattern.clone());
    let options = IngestOptions {
        parallel: args.parallel || config.dataset.parallel,
    };

    let rt = runtime()?;
    rt.block_on(async {
        let backend = open_backend(&config, &args.config_dir).await?;

        let progress = progress_bar(args.quiet);
        let bar = progress.clone();
        let result = Ingestor::new(backend.as_ref())
            .with_options(options)
            .with_progress(move |path: &Path| {
                bar.set_message(short_name(path));
                bar.inc(1);
            })
            .run_snapshot(&root, &pattern)
            .await;
        progress.finish_and_clear();

        // Rows are already committed, so the summary goes out before close
        let summary = match result {
            Ok(summary) => {
                print_summary(&summary, output_format);
                summary
            }
            Err(failure) => {
                print_summary(&failure.summary, output_format);
                if let Err(e) = backend.close().await {
                    tracing::warn!("Failed to close {} backend: {}", backend.backend_type(), e);
                }
                return Err(CliError::from(failure));
            }
        };

        backend.close().await?;
        Ok(summary)
    })
}

fn progress_bar(quiet: bool) -> ProgressBar {
    if quiet {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new_spinner();
    bar.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner} [{elapsed_precise}] {pos} files {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    bar.enable_steady_tick(std::time::Duration::from_millis(120));
    bar
}

fn short_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Print a run summary in the requested format
pub fn print_summary(summary: &RunSummary, format: OutputFormat) {
    if format == OutputFormat::Json {
        match serde_json::to_string_pretty(summary) {
            Ok(json) => println!("{}", json),
            Err(e) => eprintln!("Failed to serialize summary: {}", e),
        }
        return;
    }

    println!("{}", format_query_result(&summary.shape_table(), format));
    if !summary.failures.is_empty() {
        println!();
        println!("{}", format_query_result(&summary.failure_table(), format));
    }

    eprintln!(
        "\nRun {}: {} ({} of {} files, {} records extracted, {} loaded) in {}",
        summary.run_id,
        summary.status,
        summary.files_processed,
        summary.files_discovered,
        summary.records_extracted,
        summary.records_loaded,
        summary.duration_string()
    );
}
