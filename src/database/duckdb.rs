//! DuckDB database backend implementation
//!
//! Embedded store for ingestion runs, either persisted to a single file or
//! held in memory (tests, dry runs).

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use super::schema::{DEFAULT_NAMESPACE, DestinationSchema, Placeholder};
use super::{DatabaseBackend, DatabaseError, DatabaseResult, QueryResult};
use crate::ingest::RecordBatches;
use crate::models::{Shape, SqlValue};

/// DuckDB database backend
pub struct DuckDBBackend {
    /// Path to the database file (None for in-memory)
    db_path: Option<PathBuf>,
    /// SQL schema holding the destination tables
    namespace: String,
    /// DuckDB connection (wrapped in Mutex for thread safety)
    connection: Mutex<duckdb::Connection>,
}

impl DuckDBBackend {
    /// Open (or create) a file-based database
    pub fn new(db_path: impl AsRef<Path>) -> DatabaseResult<Self> {
        let path = db_path.as_ref().to_path_buf();
        let connection = duckdb::Connection::open(&path).map_err(|e| {
            DatabaseError::ConnectionFailed(format!("Failed to open DuckDB: {}", e))
        })?;

        tracing::debug!("Opened DuckDB database at {}", path.display());

        Ok(Self {
            db_path: Some(path),
            namespace: DEFAULT_NAMESPACE.to_string(),
            connection: Mutex::new(connection),
        })
    }

    /// Create an in-memory DuckDB backend
    pub fn in_memory() -> DatabaseResult<Self> {
        let connection = duckdb::Connection::open_in_memory().map_err(|e| {
            DatabaseError::ConnectionFailed(format!("Failed to create in-memory DuckDB: {}", e))
        })?;

        Ok(Self {
            db_path: None,
            namespace: DEFAULT_NAMESPACE.to_string(),
            connection: Mutex::new(connection),
        })
    }

    /// Use a namespace other than `pulse`
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> DatabaseResult<Self> {
        let namespace = namespace.into();
        DestinationSchema::validate_namespace(&namespace)?;
        self.namespace = namespace;
        Ok(self)
    }

    /// Get the database file path (None for in-memory)
    pub fn db_path(&self) -> Option<&Path> {
        self.db_path.as_deref()
    }

    pub fn is_in_memory(&self) -> bool {
        self.db_path.is_none()
    }

    fn lock(&self) -> DatabaseResult<std::sync::MutexGuard<'_, duckdb::Connection>> {
        self.connection
            .lock()
            .map_err(|e| DatabaseError::ConnectionFailed(format!("Lock error: {}", e)))
    }

    /// Execute one or more SQL statements that don't return rows
    pub fn execute_batch(&self, sql: &str) -> DatabaseResult<()> {
        self.lock()?
            .execute_batch(sql)
            .map_err(|e| DatabaseError::QueryFailed(format!("Batch execute failed: {}", e)))
    }

    fn run_query(
        conn: &duckdb::Connection,
        sql: &str,
        params: &[&dyn duckdb::ToSql],
    ) -> DatabaseResult<QueryResult> {
        let start = std::time::Instant::now();

        let mut stmt = conn
            .prepare(sql)
            .map_err(|e| DatabaseError::QueryFailed(format!("Prepare failed: {}", e)))?;

        // Columns are only known once the statement has been executed
        let mut result_rows = stmt
            .query(params)
            .map_err(|e| DatabaseError::QueryFailed(format!("Query failed: {}", e)))?;

        let column_count = result_rows.as_ref().map(|r| r.column_count()).unwrap_or(0);
        let columns: Vec<String> = (0..column_count)
            .map(|i| {
                result_rows
                    .as_ref()
                    .and_then(|r| r.column_name(i).ok())
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| format!("col{}", i))
            })
            .collect();

        let mut rows = Vec::new();
        while let Some(row) = result_rows
            .next()
            .map_err(|e| DatabaseError::QueryFailed(format!("Row fetch error: {}", e)))?
        {
            rows.push(Self::row_to_json(row, &columns));
        }

        Ok(QueryResult {
            columns,
            rows,
            rows_affected: None,
            execution_time_ms: start.elapsed().as_millis() as u64,
        })
    }

    fn row_to_json(row: &duckdb::Row, columns: &[String]) -> serde_json::Value {
        let map = columns
            .iter()
            .enumerate()
            .map(|(i, name)| {
                let value = row
                    .get_ref(i)
                    .map(Self::value_ref_to_json)
                    .unwrap_or(serde_json::Value::Null);
                (name.clone(), value)
            })
            .collect();
        serde_json::Value::Object(map)
    }

    /// Convert a DuckDB ValueRef to a JSON value
    fn value_ref_to_json(value: duckdb::types::ValueRef) -> serde_json::Value {
        use duckdb::types::ValueRef;
        use serde_json::Value;

        match value {
            ValueRef::Null => Value::Null,
            ValueRef::Boolean(b) => Value::Bool(b),
            ValueRef::TinyInt(i) => i.into(),
            ValueRef::SmallInt(i) => i.into(),
            ValueRef::Int(i) => i.into(),
            ValueRef::BigInt(i) => i.into(),
            ValueRef::UTinyInt(i) => i.into(),
            ValueRef::USmallInt(i) => i.into(),
            ValueRef::UInt(i) => i.into(),
            ValueRef::UBigInt(i) => i.into(),
            // SUM over BIGINT widens to HUGEINT
            ValueRef::HugeInt(i) => i64::try_from(i)
                .map(Value::from)
                .unwrap_or_else(|_| Value::String(i.to_string())),
            ValueRef::Float(f) => serde_json::Number::from_f64(f as f64)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            ValueRef::Double(f) => serde_json::Number::from_f64(f)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            ValueRef::Decimal(d) => Value::String(d.to_string()),
            ValueRef::Text(bytes) => String::from_utf8_lossy(bytes).into_owned().into(),
            ValueRef::Blob(bytes) => {
                use base64::Engine;
                Value::String(base64::engine::general_purpose::STANDARD.encode(bytes))
            }
            other => Value::String(format!("{:?}", other)),
        }
    }

    fn as_param(value: &SqlValue) -> &dyn duckdb::ToSql {
        match value {
            SqlValue::Text(s) => s,
            SqlValue::Int(i) => i,
            SqlValue::SmallInt(i) => i,
            SqlValue::BigInt(i) => i,
            SqlValue::Double(d) => d,
        }
    }

    fn table_exists(&self, conn: &duckdb::Connection, shape: Shape) -> DatabaseResult<bool> {
        let result = Self::run_query(
            conn,
            &DestinationSchema::table_exists_sql(&self.namespace, shape),
            &[],
        )?;
        Ok(result.first_i64("table_count").unwrap_or(0) > 0)
    }
}

#[async_trait(?Send)]
impl DatabaseBackend for DuckDBBackend {
    async fn ensure_schema(&self) -> DatabaseResult<()> {
        self.lock()?
            .execute_batch(&DestinationSchema::ensure_schema_sql(&self.namespace))
            .map_err(|e| {
                DatabaseError::MigrationFailed(format!("Failed to create tables: {}", e))
            })
    }

    async fn has_rows(&self, shape: Shape) -> DatabaseResult<bool> {
        let conn = self.lock()?;
        if !self.table_exists(&conn, shape)? {
            return Ok(false);
        }
        let result = Self::run_query(
            &conn,
            &DestinationSchema::has_rows_sql(&self.namespace, shape),
            &[],
        )?;
        Ok(!result.is_empty())
    }

    async fn count_rows(&self, shape: Shape) -> DatabaseResult<u64> {
        let conn = self.lock()?;
        if !self.table_exists(&conn, shape)? {
            return Ok(0);
        }
        let result = Self::run_query(
            &conn,
            &DestinationSchema::count_sql(&self.namespace, shape),
            &[],
        )?;
        Ok(result.first_i64("row_count").unwrap_or(0).max(0) as u64)
    }

    async fn load(&self, batches: &RecordBatches) -> DatabaseResult<usize> {
        let mut conn = self.lock()?;
        let commit_failed = |e: duckdb::Error| DatabaseError::CommitFailed(e.to_string());

        // Dropping the transaction without commit rolls everything back
        let tx = conn.transaction().map_err(commit_failed)?;
        let mut written = 0;

        for (shape, records) in batches.iter() {
            if records.is_empty() {
                continue;
            }

            let sql = DestinationSchema::insert_sql(&self.namespace, shape, Placeholder::Question);
            let mut stmt = tx.prepare(&sql).map_err(|e| {
                DatabaseError::CommitFailed(format!("{}: {}", shape.table_name(), e))
            })?;

            for record in records {
                let values = record.values();
                let params: Vec<&dyn duckdb::ToSql> = values.iter().map(Self::as_param).collect();
                stmt.execute(params.as_slice()).map_err(|e| {
                    DatabaseError::CommitFailed(format!("{}: {}", shape.table_name(), e))
                })?;
            }

            tracing::debug!("Inserted {} rows into {}", records.len(), shape.table_name());
            written += records.len();
        }

        tx.commit().map_err(commit_failed)?;
        Ok(written)
    }

    async fn execute_query(&self, sql: &str) -> DatabaseResult<QueryResult> {
        let conn = self.lock()?;
        Self::run_query(&conn, sql, &[])
    }

    async fn execute_query_params(
        &self,
        sql: &str,
        params: &[serde_json::Value],
    ) -> DatabaseResult<QueryResult> {
        let conn = self.lock()?;

        // Bind everything as text; DuckDB casts on comparison
        let string_params: Vec<String> = params
            .iter()
            .map(|p| match p {
                serde_json::Value::String(s) => s.clone(),
                serde_json::Value::Null => String::new(),
                other => other.to_string(),
            })
            .collect();
        let param_refs: Vec<&dyn duckdb::ToSql> = string_params
            .iter()
            .map(|s| s as &dyn duckdb::ToSql)
            .collect();

        Self::run_query(&conn, sql, &param_refs)
    }

    async fn health_check(&self) -> DatabaseResult<bool> {
        let result = self.execute_query("SELECT 1 AS healthy").await?;
        Ok(!result.rows.is_empty())
    }

    fn namespace(&self) -> &str {
        &self.namespace
    }

    fn placeholder(&self) -> Placeholder {
        Placeholder::Question
    }

    fn backend_type(&self) -> &'static str {
        "duckdb"
    }

    async fn close(&self) -> DatabaseResult<()> {
        // The connection is closed when the backend is dropped; flush the
        // write-ahead log so the file is complete on disk before that.
        if !self.is_in_memory() {
            self.execute_batch("CHECKPOINT")?;
        }
        Ok(())
    }
}
