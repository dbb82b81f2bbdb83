//! SQL query CLI command
//!
//! Runs ad-hoc SQL against the configured store. Tables live in the
//! configured namespace, e.g. `SELECT * FROM pulse.agg_trans_country`.

use std::path::PathBuf;

use super::{load_config, open_backend, parse_format, runtime};
use crate::cli::error::CliError;
use crate::database::{OutputFormat, format_query_result};

/// Query command arguments
#[derive(Debug, Clone)]
pub struct QueryArgs {
    /// SQL query to execute
    pub sql: String,
    /// Directory holding `.pulse-loader.toml`
    pub config_dir: PathBuf,
    /// Output format
    pub format: String,
}

/// Execute a SQL query against the configured database
pub fn handle_query(args: &QueryArgs) -> Result<(), CliError> {
    let config = load_config(&args.config_dir)?;
    let output_format = parse_format(&args.format)?;

    let rt = runtime()?;
    rt.block_on(async {
        let backend = open_backend(&config, &args.config_dir).await?;

        let result = backend.execute_query(&args.sql).await?;

        // Format and print result
        let output = format_query_result(&result, output_format);
        println!("{}", output);

        // Print execution time for non-JSON formats
        if output_format != OutputFormat::Json {
            eprintln!("\nExecution time: {}ms", result.execution_time_ms);
        }

        backend.close().await?;
        Ok(())
    })
}
