//! Tests for the init and ingest commands

use pulse_loader::cli::commands::ingest::{IngestArgs, handle_ingest};
use pulse_loader::cli::commands::init::{InitArgs, handle_init};
use pulse_loader::cli::error::CliError;
use pulse_loader::database::LoaderConfig;
use pulse_loader::ingest::{RunError, RunStatus};
use tempfile::TempDir;

use super::workspace;

fn ingest_args(dir: &TempDir) -> IngestArgs {
    IngestArgs {
        config_dir: dir.path().to_path_buf(),
        root: None,
        pattern: None,
        parallel: false,
        quiet: true,
        format: "json".to_string(),
    }
}

#[test]
fn test_init_then_load_defaults() {
    let dir = TempDir::new().unwrap();
    handle_init(&InitArgs {
        config_dir: dir.path().to_path_buf(),
        force: false,
    })
    .unwrap();

    let config = LoaderConfig::load(dir.path()).unwrap();
    assert_eq!(config.database.namespace, "pulse");
    assert_eq!(config.dataset.root, "pulse/data");
}

#[test]
fn test_ingest_then_skip() {
    let dir = workspace();

    let summary = handle_ingest(&ingest_args(&dir)).unwrap();
    assert_eq!(summary.status, RunStatus::Loaded);
    assert_eq!(summary.files_processed, 4);
    assert_eq!(summary.records_loaded, 6);
    assert!(dir.path().join("pulse.duckdb").exists());

    let summary = handle_ingest(&ingest_args(&dir)).unwrap();
    assert_eq!(summary.status, RunStatus::SkippedAlreadyPresent);
}

#[test]
fn test_ingest_pattern_override() {
    let dir = workspace();
    let mut args = ingest_args(&dir);
    args.pattern = Some("aggregated/**/*.json".to_string());
    args.format = "table".to_string();

    let summary = handle_ingest(&args).unwrap();
    assert_eq!(summary.files_discovered, 2);
    assert_eq!(summary.records_loaded, 3);
}

#[test]
fn test_ingest_missing_root() {
    let dir = workspace();
    let mut args = ingest_args(&dir);
    args.root = Some(dir.path().join("elsewhere"));

    assert!(matches!(handle_ingest(&args), Err(CliError::DatasetNotFound(_))));
}

#[test]
fn test_ingest_rejects_unknown_format() {
    let dir = workspace();
    let mut args = ingest_args(&dir);
    args.format = "yaml".to_string();

    assert!(matches!(handle_ingest(&args), Err(CliError::InvalidArgument(_))));
}

#[test]
fn test_ingest_bad_pattern_reports_failed_run() {
    let dir = workspace();
    let mut args = ingest_args(&dir);
    args.pattern = Some("***/*.json".to_string());

    match handle_ingest(&args) {
        Err(CliError::RunFailed(failure)) => {
            assert_eq!(failure.summary.status, RunStatus::Failed);
            assert_eq!(failure.summary.files_discovered, 0);
            assert!(matches!(failure.source, RunError::Discovery(_)));
        }
        Err(other) => panic!("expected a failed run, got {}", other),
        Ok(summary) => panic!("expected a failed run, got {}", summary.status),
    }

    // Nothing was loaded, so a corrected pattern still goes through
    args.pattern = None;
    let summary = handle_ingest(&args).unwrap();
    assert_eq!(summary.status, RunStatus::Loaded);
}

#[test]
fn test_ingest_summary_survives_backend_close() {
    let dir = workspace();
    let args = ingest_args(&dir);

    let summary = handle_ingest(&args).unwrap();
    assert_eq!(summary.records_loaded, 6);

    // The database file was checkpointed and closed after the summary went out
    let config = LoaderConfig::load(dir.path()).unwrap();
    assert!(config.duckdb_path(dir.path()).exists());
    let summary = handle_ingest(&args).unwrap();
    assert_eq!(summary.status, RunStatus::SkippedAlreadyPresent);
}
