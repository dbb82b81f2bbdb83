//! Ingestion orchestrator
//!
//! A run moves through
//! `Idle → Enumerating → Classifying → Extracting → GuardCheck` and then
//! either `Skipped` or `SchemaEnsuring → Loading → Completed`, before
//! returning to `Idle`. A file that fails classification or extraction is
//! recorded in the summary and left out of every batch; the run carries on.
//! Store errors end the run with a [`RunFailure`] and nothing persisted.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use super::batches::RecordBatches;
use super::classify::classify_path;
use super::discover::{discover_dataset_files, read_payload};
use super::error::IngestError;
use super::extract::extract;
use crate::database::{DatabaseBackend, DatabaseError, LoadGuard, QueryResult};
use crate::models::{FlatRecord, HierarchyAddress, Shape};

/// Run options
#[derive(Debug, Clone, Copy, Default)]
pub struct IngestOptions {
    /// Extract files on the rayon pool (ignored without the `parallel` feature)
    pub parallel: bool,
}

/// Orchestrator state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RunPhase {
    Idle,
    Enumerating,
    Classifying,
    Extracting,
    GuardCheck,
    Skipped,
    SchemaEnsuring,
    Loading,
    Completed,
    Failed,
}

impl std::fmt::Display for RunPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            RunPhase::Idle => "idle",
            RunPhase::Enumerating => "enumerating",
            RunPhase::Classifying => "classifying",
            RunPhase::Extracting => "extracting",
            RunPhase::GuardCheck => "guard-check",
            RunPhase::Skipped => "skipped",
            RunPhase::SchemaEnsuring => "schema-ensuring",
            RunPhase::Loading => "loading",
            RunPhase::Completed => "completed",
            RunPhase::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Final outcome of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RunStatus {
    Loaded,
    SkippedAlreadyPresent,
    Failed,
}

impl std::fmt::Display for RunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunStatus::Loaded => write!(f, "loaded"),
            RunStatus::SkippedAlreadyPresent => write!(f, "skipped-already-present"),
            RunStatus::Failed => write!(f, "failed"),
        }
    }
}

/// A file left out of the run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileFailure {
    pub path: PathBuf,
    /// Error label, see [`IngestError::kind`]
    pub kind: String,
    pub reason: String,
}

/// Summary of an ingestion run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub status: RunStatus,
    /// Files found below the snapshot root
    pub files_discovered: usize,
    /// Files whose records made it into a batch
    pub files_processed: usize,
    /// Records extracted, keyed by destination table
    pub records_per_shape: BTreeMap<String, usize>,
    pub records_extracted: usize,
    /// Rows committed (0 unless the status is `loaded`)
    pub records_loaded: usize,
    pub failures: Vec<FileFailure>,
    #[serde(skip)]
    pub duration: Duration,
}

impl RunSummary {
    fn new() -> Self {
        Self {
            run_id: Uuid::new_v4(),
            started_at: Utc::now(),
            status: RunStatus::Failed,
            files_discovered: 0,
            files_processed: 0,
            records_per_shape: BTreeMap::new(),
            records_extracted: 0,
            records_loaded: 0,
            failures: Vec::new(),
            duration: Duration::ZERO,
        }
    }

    fn record_failure(&mut self, path: &Path, error: &IngestError) {
        tracing::warn!("Skipping {}: {}", path.display(), error);
        self.failures.push(FileFailure {
            path: path.to_path_buf(),
            kind: error.kind().to_string(),
            reason: error.to_string(),
        });
    }

    /// Records extracted for one shape
    pub fn records_for(&self, shape: Shape) -> usize {
        self.records_per_shape
            .get(&shape.table_name())
            .copied()
            .unwrap_or(0)
    }

    /// Format duration as human-readable string
    pub fn duration_string(&self) -> String {
        let secs = self.duration.as_secs();
        if secs < 60 {
            format!("{}.{:03}s", secs, self.duration.subsec_millis())
        } else if secs < 3600 {
            format!("{}m {}s", secs / 60, secs % 60)
        } else {
            format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
        }
    }

    /// Per-table record counts as a printable result set
    pub fn shape_table(&self) -> QueryResult {
        let rows = Shape::ALL
            .iter()
            .map(|shape| {
                serde_json::json!({
                    "table_name": shape.table_name(),
                    "records": self.records_for(*shape),
                })
            })
            .collect();
        QueryResult::new(vec!["table_name".to_string(), "records".to_string()], rows)
    }

    /// Failures as a printable result set
    pub fn failure_table(&self) -> QueryResult {
        let rows = self
            .failures
            .iter()
            .map(|f| {
                serde_json::json!({
                    "path": f.path.display().to_string(),
                    "kind": f.kind,
                    "reason": f.reason,
                })
            })
            .collect();
        QueryResult::new(
            vec!["path".to_string(), "kind".to_string(), "reason".to_string()],
            rows,
        )
    }
}

/// Fatal error that ended a run
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error(transparent)]
    Discovery(#[from] IngestError),

    #[error(transparent)]
    Store(#[from] DatabaseError),
}

/// A failed run, with whatever the run had gathered before it stopped
#[derive(Debug, thiserror::Error)]
#[error("Ingestion run {} failed: {source}", .summary.run_id)]
pub struct RunFailure {
    pub summary: Box<RunSummary>,
    #[source]
    pub source: RunError,
}

/// Called once per file as it is extracted
pub type ProgressFn<'a> = Box<dyn Fn(&Path) + Send + Sync + 'a>;

/// Drives one ingestion run against a borrowed backend
pub struct Ingestor<'a, B: DatabaseBackend + ?Sized> {
    backend: &'a B,
    options: IngestOptions,
    progress: Option<ProgressFn<'a>>,
    phase: RunPhase,
}

impl<'a, B: DatabaseBackend + ?Sized> Ingestor<'a, B> {
    pub fn new(backend: &'a B) -> Self {
        Self {
            backend,
            options: IngestOptions::default(),
            progress: None,
            phase: RunPhase::Idle,
        }
    }

    pub fn with_options(mut self, options: IngestOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_progress(mut self, progress: impl Fn(&Path) + Send + Sync + 'a) -> Self {
        self.progress = Some(Box::new(progress));
        self
    }

    /// Current phase; `Idle` between runs
    pub fn phase(&self) -> RunPhase {
        self.phase
    }

    fn transition(&mut self, next: RunPhase) {
        tracing::debug!("Run phase {} -> {}", self.phase, next);
        self.phase = next;
    }

    /// Discover every file matching `pattern` below `root` and ingest them
    pub async fn run_snapshot(
        &mut self,
        root: &Path,
        pattern: &str,
    ) -> Result<RunSummary, RunFailure> {
        self.transition(RunPhase::Enumerating);
        match discover_dataset_files(root, pattern) {
            Ok(files) => {
                tracing::info!("Discovered {} files below {}", files.len(), root.display());
                self.run_files(root, &files).await
            }
            Err(e) => Err(self.fail(RunSummary::new(), Instant::now(), e.into())),
        }
    }

    /// Ingest an explicit file list; paths are classified relative to `root`
    pub async fn run_files(
        &mut self,
        root: &Path,
        files: &[PathBuf],
    ) -> Result<RunSummary, RunFailure> {
        let start = Instant::now();
        let mut summary = RunSummary::new();
        summary.files_discovered = files.len();

        self.transition(RunPhase::Classifying);
        let mut classified = Vec::with_capacity(files.len());
        for path in files {
            let relative = path.strip_prefix(root).unwrap_or(path);
            match classify_path(relative) {
                Ok(address) => classified.push((path.clone(), address)),
                Err(e) => summary.record_failure(path, &e.into()),
            }
        }

        self.transition(RunPhase::Extracting);
        let results = self.extract_all(&classified);

        let mut batches = RecordBatches::new();
        for ((path, _), result) in classified.iter().zip(results) {
            match result {
                Ok(records) => {
                    summary.files_processed += 1;
                    batches.extend(records);
                }
                Err(e) => summary.record_failure(path, &e),
            }
        }
        summary.records_per_shape = batches.counts();
        summary.records_extracted = batches.total();

        self.transition(RunPhase::GuardCheck);
        let should_load = match LoadGuard::new(self.backend).should_load().await {
            Ok(should_load) => should_load,
            Err(e) => return Err(self.fail(summary, start, e.into())),
        };

        if !should_load {
            self.transition(RunPhase::Skipped);
            summary.status = RunStatus::SkippedAlreadyPresent;
            return Ok(self.finish(summary, start));
        }

        self.transition(RunPhase::SchemaEnsuring);
        if let Err(e) = self.backend.ensure_schema().await {
            return Err(self.fail(summary, start, e.into()));
        }

        self.transition(RunPhase::Loading);
        match self.backend.load(&batches).await {
            Ok(written) => {
                self.transition(RunPhase::Completed);
                summary.records_loaded = written;
                summary.status = RunStatus::Loaded;
                Ok(self.finish(summary, start))
            }
            Err(e) => Err(self.fail(summary, start, e.into())),
        }
    }

    fn extract_all(
        &self,
        classified: &[(PathBuf, HierarchyAddress)],
    ) -> Vec<Result<Vec<FlatRecord>, IngestError>> {
        let progress = self.progress.as_deref();
        let process = |(path, address): &(PathBuf, HierarchyAddress)| {
            if let Some(progress) = progress {
                progress(path);
            }
            extract_file(path, address)
        };

        #[cfg(feature = "parallel")]
        if self.options.parallel {
            return classified.par_iter().map(process).collect();
        }

        #[cfg(not(feature = "parallel"))]
        if self.options.parallel {
            tracing::warn!("Built without the `parallel` feature, extracting sequentially");
        }

        classified.iter().map(process).collect()
    }

    fn finish(&mut self, mut summary: RunSummary, start: Instant) -> RunSummary {
        summary.duration = start.elapsed();
        tracing::info!(
            "Run {} {}: {} of {} files, {} records extracted, {} loaded, {} failures in {}",
            summary.run_id,
            summary.status,
            summary.files_processed,
            summary.files_discovered,
            summary.records_extracted,
            summary.records_loaded,
            summary.failures.len(),
            summary.duration_string()
        );
        self.transition(RunPhase::Idle);
        summary
    }

    fn fail(&mut self, mut summary: RunSummary, start: Instant, source: RunError) -> RunFailure {
        self.transition(RunPhase::Failed);
        tracing::error!("Run {} failed: {}", summary.run_id, source);
        summary.status = RunStatus::Failed;
        summary.records_loaded = 0;
        summary.duration = start.elapsed();
        self.transition(RunPhase::Idle);
        RunFailure {
            summary: Box::new(summary),
            source,
        }
    }
}

/// Read, parse and flatten one classified file
///
/// All-or-nothing: one bad entry discards the whole file.
pub fn extract_file(path: &Path, address: &HierarchyAddress) -> Result<Vec<FlatRecord>, IngestError> {
    let payload = read_payload(path)?;
    let records = extract(address, &payload)?.collect::<Result<Vec<_>, _>>()?;
    tracing::debug!("{}: {} records from {}", address, records.len(), path.display());
    Ok(records)
}
