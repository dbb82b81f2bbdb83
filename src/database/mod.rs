//! Relational store backends
//!
//! This module provides the destination store for an ingestion run:
//! - DuckDB: embedded, file-based or in-memory
//! - PostgreSQL: server deployments
//!
//! Both backends create the same twelve tables (see [`schema`]), answer the
//! load guard's probe and persist a run's batches inside one transaction.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[cfg(feature = "duckdb-backend")]
pub mod duckdb;

#[cfg(feature = "postgres-backend")]
pub mod postgres;

pub mod config;
pub mod guard;
pub mod schema;

#[cfg(feature = "duckdb-backend")]
pub use self::duckdb::DuckDBBackend;

#[cfg(feature = "postgres-backend")]
pub use self::postgres::PostgresBackend;

pub use config::{BackendKind, LoaderConfig};
pub use guard::LoadGuard;
pub use schema::{DestinationSchema, Placeholder};

use crate::ingest::RecordBatches;
use crate::models::Shape;

/// Error type for database operations
#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    /// Failed to connect to the store
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Creating the namespace or tables failed
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// Bulk load was rolled back
    #[error("Commit failed, all batches rolled back: {0}")]
    CommitFailed(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// IO error
    #[error("IO error: {0}")]
    IoError(String),
}

/// Result type for database operations
pub type DatabaseResult<T> = Result<T, DatabaseError>;

/// Query result row as a JSON value
pub type QueryRow = serde_json::Value;

/// Query result set
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryResult {
    /// Column names
    pub columns: Vec<String>,
    /// Rows of data
    pub rows: Vec<QueryRow>,
    /// Number of rows affected (for INSERT/UPDATE/DELETE)
    pub rows_affected: Option<u64>,
    /// Execution time in milliseconds
    pub execution_time_ms: u64,
}

impl QueryResult {
    pub fn new(columns: Vec<String>, rows: Vec<QueryRow>) -> Self {
        Self {
            columns,
            rows,
            rows_affected: None,
            execution_time_ms: 0,
        }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new(), Vec::new())
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Integer value of `column` in the first row
    pub fn first_i64(&self, column: &str) -> Option<i64> {
        let value = self.rows.first()?.get(column)?;
        // Some backends hand wide integers back as strings
        value
            .as_i64()
            .or_else(|| value.as_str().and_then(|s| s.parse().ok()))
    }
}

/// Destination store used by an ingestion run
///
/// A backend is constructed explicitly by the caller, handed to the run by
/// reference and closed afterwards; nothing here caches connections.
#[async_trait(?Send)]
pub trait DatabaseBackend: Send + Sync {
    /// Create the namespace and all twelve tables if they don't exist
    async fn ensure_schema(&self) -> DatabaseResult<()>;

    /// Whether the table of `shape` holds at least one row
    ///
    /// A table that does not exist yet counts as empty.
    async fn has_rows(&self, shape: Shape) -> DatabaseResult<bool>;

    /// Number of rows in the table of `shape` (0 when it doesn't exist)
    async fn count_rows(&self, shape: Shape) -> DatabaseResult<u64>;

    /// Insert every batch inside one transaction
    ///
    /// Either all records are committed or none are. Returns the number of
    /// rows written.
    async fn load(&self, batches: &RecordBatches) -> DatabaseResult<usize>;

    /// Execute a SQL query and return results
    async fn execute_query(&self, sql: &str) -> DatabaseResult<QueryResult>;

    /// Execute a parameterized SQL query
    ///
    /// # Arguments
    /// * `sql` - SQL query using this backend's [`Placeholder`] style
    /// * `params` - Parameter values as JSON
    async fn execute_query_params(
        &self,
        sql: &str,
        params: &[serde_json::Value],
    ) -> DatabaseResult<QueryResult>;

    /// Check if the store is reachable
    async fn health_check(&self) -> DatabaseResult<bool>;

    /// SQL schema holding the twelve tables
    fn namespace(&self) -> &str;

    /// Parameter placeholder style
    fn placeholder(&self) -> Placeholder;

    /// Backend type string ("duckdb" or "postgres")
    fn backend_type(&self) -> &'static str;

    /// Release the connection
    async fn close(&self) -> DatabaseResult<()>;
}

/// Output format for query results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// ASCII table format (default)
    #[default]
    Table,
    /// JSON format
    Json,
    /// CSV format
    Csv,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" => Ok(OutputFormat::Table),
            "json" => Ok(OutputFormat::Json),
            "csv" => Ok(OutputFormat::Csv),
            _ => Err(format!("Unknown output format: {}", s)),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Table => write!(f, "table"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Csv => write!(f, "csv"),
        }
    }
}

/// Format query results for display
pub fn format_query_result(result: &QueryResult, format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => {
            serde_json::to_string_pretty(&result.rows).unwrap_or_else(|_| "[]".to_string())
        }
        OutputFormat::Csv => format_as_csv(result),
        OutputFormat::Table => format_as_table(result),
    }
}

fn cell(row: &QueryRow, column: &str) -> (String, bool) {
    match row.get(column).unwrap_or(&serde_json::Value::Null) {
        serde_json::Value::String(s) => (s.clone(), false),
        serde_json::Value::Null => ("null".to_string(), false),
        serde_json::Value::Number(n) => (n.to_string(), true),
        other => (other.to_string(), false),
    }
}

fn format_as_csv(result: &QueryResult) -> String {
    let mut output = result.columns.join(",");
    output.push('\n');

    for row in &result.rows {
        let values: Vec<String> = result
            .columns
            .iter()
            .map(|col| match row.get(col) {
                None | Some(serde_json::Value::Null) => String::new(),
                Some(serde_json::Value::String(s))
                    if s.contains(',') || s.contains('"') || s.contains('\n') =>
                {
                    format!("\"{}\"", s.replace('"', "\"\""))
                }
                Some(_) => cell(row, col).0,
            })
            .collect();
        output.push_str(&values.join(","));
        output.push('\n');
    }

    output
}

fn format_as_table(result: &QueryResult) -> String {
    if result.is_empty() {
        return "(0 rows)".to_string();
    }

    let cells: Vec<Vec<(String, bool)>> = result
        .rows
        .iter()
        .map(|row| result.columns.iter().map(|c| cell(row, c)).collect())
        .collect();

    let mut widths: Vec<usize> = result.columns.iter().map(|c| c.len()).collect();
    for row in &cells {
        for (i, (text, _)) in row.iter().enumerate() {
            widths[i] = widths[i].max(text.chars().count());
        }
    }

    let mut output = String::new();

    let header: Vec<String> = result
        .columns
        .iter()
        .zip(&widths)
        .map(|(c, w)| format!("{:w$}", c, w = *w))
        .collect();
    output.push_str(&header.join(" | "));
    output.push('\n');

    let separator: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    output.push_str(&separator.join("-+-"));
    output.push('\n');

    // Numbers are right-aligned
    for row in &cells {
        let values: Vec<String> = row
            .iter()
            .zip(&widths)
            .map(|((text, numeric), w)| {
                if *numeric {
                    format!("{:>w$}", text, w = *w)
                } else {
                    format!("{:w$}", text, w = *w)
                }
            })
            .collect();
        output.push_str(&values.join(" | "));
        output.push('\n');
    }

    output.push_str(&format!("({} rows)", result.row_count()));

    output
}
