//! CLI command implementations
//!
//! Every handler loads `.pulse-loader.toml` from the config directory,
//! opens the configured backend and drives it on a fresh tokio runtime.

pub mod ingest;
pub mod init;
pub mod query;
pub mod report;
pub mod status;

use std::path::Path;

use crate::cli::error::CliError;
use crate::database::{BackendKind, DatabaseBackend, LoaderConfig, OutputFormat};

/// Load the configuration rooted at `config_dir`
pub fn load_config(config_dir: &Path) -> Result<LoaderConfig, CliError> {
    Ok(LoaderConfig::load(config_dir)?)
}

/// Parse a `--format` value
pub fn parse_format(format: &str) -> Result<OutputFormat, CliError> {
    format.parse().map_err(CliError::InvalidArgument)
}

pub(crate) fn runtime() -> Result<tokio::runtime::Runtime, CliError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| CliError::IoError(format!("Failed to create runtime: {}", e)))
}

/// Open the backend named in the configuration
///
/// DuckDB paths are resolved against `config_dir`.
pub async fn open_backend(
    config: &LoaderConfig,
    config_dir: &Path,
) -> Result<Box<dyn DatabaseBackend>, CliError> {
    let namespace = config.database.namespace.clone();

    match config.database.backend {
        BackendKind::DuckDB => {
            #[cfg(feature = "duckdb-backend")]
            {
                use crate::database::DuckDBBackend;

                let db_path = config.duckdb_path(config_dir);
                tracing::debug!("Opening DuckDB database {}", db_path.display());
                let backend = DuckDBBackend::new(&db_path)?.with_namespace(namespace)?;
                Ok(Box::new(backend))
            }
            #[cfg(not(feature = "duckdb-backend"))]
            {
                let _ = (namespace, config_dir);
                Err(CliError::InvalidArgument(
                    "DuckDB backend not enabled. Build with --features duckdb-backend".to_string(),
                ))
            }
        }
        BackendKind::Postgres => {
            #[cfg(feature = "postgres-backend")]
            {
                use crate::database::PostgresBackend;

                let conn_str = config.postgres_connection_string().ok_or_else(|| {
                    CliError::InvalidArgument(
                        "PostgreSQL connection string not configured".to_string(),
                    )
                })?;
                let backend = PostgresBackend::new(conn_str)
                    .await?
                    .with_namespace(namespace)?;
                Ok(Box::new(backend))
            }
            #[cfg(not(feature = "postgres-backend"))]
            {
                let _ = namespace;
                Err(CliError::InvalidArgument(
                    "PostgreSQL backend not enabled".to_string(),
                ))
            }
        }
    }
}
