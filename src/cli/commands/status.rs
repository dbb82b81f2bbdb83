//! `status` command: row counts of the twelve destination tables

use std::path::PathBuf;

use super::{load_config, open_backend, parse_format, runtime};
use crate::cli::error::CliError;
use crate::database::{OutputFormat, format_query_result};
use crate::report::table_status;

/// Status command arguments
#[derive(Debug, Clone)]
pub struct StatusArgs {
    /// Directory holding `.pulse-loader.toml`
    pub config_dir: PathBuf,
    /// Output format
    pub format: String,
}

pub fn handle_status(args: &StatusArgs) -> Result<(), CliError> {
    let config = load_config(&args.config_dir)?;
    let output_format = parse_format(&args.format)?;

    let rt = runtime()?;
    rt.block_on(async {
        let backend = open_backend(&config, &args.config_dir).await?;

        if !backend.health_check().await? {
            return Err(CliError::InvalidArgument(format!(
                "{} backend failed its health check",
                backend.backend_type()
            )));
        }

        let result = table_status(backend.as_ref()).await?;
        println!("{}", format_query_result(&result, output_format));

        if output_format != OutputFormat::Json {
            eprintln!(
                "\nBackend: {} (namespace {})",
                backend.backend_type(),
                backend.namespace()
            );
        }

        backend.close().await?;
        Ok(())
    })
}
