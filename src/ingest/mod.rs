//! Snapshot ingestion
//!
//! Turns a directory tree of dataset files into twelve record batches:
//!
//! 1. [`discover`] lists the `*.json` files below the snapshot root
//! 2. [`classify`] decodes each path into a [`HierarchyAddress`](crate::models::HierarchyAddress)
//! 3. [`extract`] flattens each payload into [`FlatRecord`](crate::models::FlatRecord)s
//! 4. [`run`] accumulates them per shape and hands them to the store

pub mod batches;
pub mod classify;
pub mod discover;
pub mod error;
pub mod extract;
pub mod run;

pub use batches::RecordBatches;
pub use classify::{classify, classify_path};
pub use discover::{DEFAULT_PATTERN, discover_dataset_files, read_payload};
pub use error::{ClassificationError, ClassificationReason, IngestError};
pub use extract::{Records, extract};
pub use run::{
    FileFailure, IngestOptions, Ingestor, RunError, RunFailure, RunPhase, RunStatus, RunSummary,
};
