//! Pulse Loader - ingestion engine for the Pulse payments dataset
//!
//! Provides:
//! - Path classification of snapshot files into one of twelve record shapes
//! - Payload extraction into flat, typed records
//! - Idempotent creation of the twelve destination tables
//! - A load guard and an all-or-nothing bulk load (DuckDB or PostgreSQL)
//! - Canned reports over the loaded tables
//!
//! ```rust,ignore
//! use pulse_loader::database::DuckDBBackend;
//! use pulse_loader::ingest::{Ingestor, DEFAULT_PATTERN};
//!
//! let backend = DuckDBBackend::new("pulse.duckdb")?;
//! let summary = Ingestor::new(&backend)
//!     .run_snapshot(Path::new("pulse/data"), DEFAULT_PATTERN)
//!     .await?;
//! println!("{}: {} records", summary.status, summary.records_loaded);
//! backend.close().await?;
//! ```

pub mod database;
pub mod ingest;
pub mod models;
pub mod report;

#[cfg(feature = "cli")]
pub mod cli;

pub use database::{DatabaseBackend, DatabaseError, LoaderConfig, QueryResult};
pub use ingest::{
    ClassificationError, IngestError, IngestOptions, Ingestor, RecordBatches, RunFailure,
    RunStatus, RunSummary, classify, extract,
};
pub use models::{Category, FlatRecord, Granularity, HierarchyAddress, Measures, Scope, Shape};
pub use report::ReportKind;
