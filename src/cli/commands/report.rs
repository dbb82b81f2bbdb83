//! `report` command: canned dashboard queries over the loaded tables

use std::path::PathBuf;

use super::{load_config, open_backend, parse_format, runtime};
use crate::cli::error::CliError;
use crate::database::{OutputFormat, format_query_result};
use crate::report::{ReportKind, run_report};

/// Report command arguments
#[derive(Debug, Clone)]
pub struct ReportArgs {
    /// Directory holding `.pulse-loader.toml`
    pub config_dir: PathBuf,
    /// Report name, one of [`ReportKind::NAMES`]
    pub name: String,
    /// State filter (`districts`, `district-transactions`)
    pub state: Option<String>,
    /// District filter (`district-transactions`)
    pub district: Option<String>,
    /// Output format
    pub format: String,
}

pub fn handle_report(args: &ReportArgs) -> Result<(), CliError> {
    let kind = ReportKind::from_name(
        &args.name,
        args.state.as_deref(),
        args.district.as_deref(),
    )
    .map_err(CliError::InvalidArgument)?;
    let config = load_config(&args.config_dir)?;
    let output_format = parse_format(&args.format)?;

    let rt = runtime()?;
    rt.block_on(async {
        let backend = open_backend(&config, &args.config_dir).await?;

        if !backend.has_rows(kind.shape()).await? {
            tracing::warn!(
                "{} is empty, run `pulse-loader ingest` first",
                kind.shape().table_name()
            );
        }

        let result = run_report(backend.as_ref(), &kind).await?;
        println!("{}", format_query_result(&result, output_format));

        if output_format != OutputFormat::Json {
            eprintln!(
                "\n{}: {} rows in {}ms",
                kind,
                result.row_count(),
                result.execution_time_ms
            );
        }

        backend.close().await?;
        Ok(())
    })
}
