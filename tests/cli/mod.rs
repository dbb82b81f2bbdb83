//! CLI tests module

pub mod ingest_tests;
pub mod report_tests;

use std::path::Path;

use pulse_loader::database::LoaderConfig;
use serde_json::json;
use tempfile::TempDir;

/// A config directory with a DuckDB store and a small snapshot under `data/`
pub fn workspace() -> TempDir {
    let dir = TempDir::new().unwrap();

    let mut config = LoaderConfig::duckdb("pulse.duckdb");
    config.dataset.root = "data".to_string();
    config.save(dir.path()).unwrap();

    let data = dir.path().join("data");
    write(
        &data,
        "aggregated/transaction/country/india/2021/1.json",
        json!({"data": {"transactionData": [
            {"name": "Peer-to-peer payments", "paymentInstruments": [{"type": "TOTAL", "count": 100, "amount": 250.0}]},
            {"name": "Merchant payments", "paymentInstruments": [{"type": "TOTAL", "count": 60, "amount": 90.0}]}
        ]}}),
    );
    write(
        &data,
        "aggregated/transaction/country/india/2022/1.json",
        json!({"data": {"transactionData": [
            {"name": "Peer-to-peer payments", "paymentInstruments": [{"type": "TOTAL", "count": 50, "amount": 125.0}]}
        ]}}),
    );
    write(
        &data,
        "map/transaction/hover/country/india/state/goa/2021/1.json",
        json!({"data": {"hoverDataList": [
            {"name": "north goa district", "metric": [{"type": "TOTAL", "count": 30, "amount": 45.0}]},
            {"name": "south goa district", "metric": [{"type": "TOTAL", "count": 20, "amount": 15.0}]}
        ]}}),
    );
    write(
        &data,
        "map/transaction/hover/country/india/state/goa/2021/2.json",
        json!({"data": {"hoverDataList": [
            {"name": "north goa district", "metric": [{"type": "TOTAL", "count": 5, "amount": 5.0}]}
        ]}}),
    );

    dir
}

fn write(root: &Path, relative: &str, payload: serde_json::Value) {
    let path = root.join(relative);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, payload.to_string()).unwrap();
}
