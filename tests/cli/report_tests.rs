//! Tests for the status, report and query commands

use pulse_loader::cli::commands::ingest::{IngestArgs, handle_ingest};
use pulse_loader::cli::commands::query::{QueryArgs, handle_query};
use pulse_loader::cli::commands::report::{ReportArgs, handle_report};
use pulse_loader::cli::commands::status::{StatusArgs, handle_status};
use pulse_loader::cli::error::CliError;
use tempfile::TempDir;

use super::workspace;

fn loaded_workspace() -> TempDir {
    let dir = workspace();
    handle_ingest(&IngestArgs {
        config_dir: dir.path().to_path_buf(),
        root: None,
        pattern: None,
        parallel: false,
        quiet: true,
        format: "json".to_string(),
    })
    .unwrap();
    dir
}

fn report_args(dir: &TempDir, name: &str) -> ReportArgs {
    ReportArgs {
        config_dir: dir.path().to_path_buf(),
        name: name.to_string(),
        state: None,
        district: None,
        format: "table".to_string(),
    }
}

#[test]
fn test_status_before_and_after_ingest() {
    let dir = workspace();
    let args = StatusArgs {
        config_dir: dir.path().to_path_buf(),
        format: "table".to_string(),
    };
    assert!(handle_status(&args).is_ok());

    let dir = loaded_workspace();
    let args = StatusArgs {
        config_dir: dir.path().to_path_buf(),
        format: "csv".to_string(),
    };
    assert!(handle_status(&args).is_ok());
}

#[test]
fn test_every_report_runs() {
    let dir = loaded_workspace();

    for name in pulse_loader::ReportKind::NAMES {
        let mut args = report_args(&dir, name);
        args.state = Some("goa".to_string());
        args.district = Some("north goa district".to_string());
        assert!(handle_report(&args).is_ok(), "report {} failed", name);
    }
}

#[test]
fn test_report_requires_filters() {
    let dir = loaded_workspace();

    let result = handle_report(&report_args(&dir, "districts"));
    assert!(matches!(result, Err(CliError::InvalidArgument(msg)) if msg.contains("--state")));

    let result = handle_report(&report_args(&dir, "no-such-report"));
    assert!(matches!(result, Err(CliError::InvalidArgument(_))));
}

#[test]
fn test_query_and_bad_sql() {
    let dir = loaded_workspace();
    let args = QueryArgs {
        sql: "SELECT year, SUM(transaction_count) AS total FROM pulse.agg_trans_country GROUP BY year"
            .to_string(),
        config_dir: dir.path().to_path_buf(),
        format: "json".to_string(),
    };
    assert!(handle_query(&args).is_ok());

    let args = QueryArgs {
        sql: "SELECT * FROM pulse.no_such_table".to_string(),
        ..args
    };
    assert!(matches!(handle_query(&args), Err(CliError::DatabaseError(_))));
}
