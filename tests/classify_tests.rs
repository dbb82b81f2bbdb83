//! Classification and extraction through the public API

use std::path::Path;

use pulse_loader::ingest::{ClassificationReason, classify, classify_path, extract};
use pulse_loader::models::{Category, FlatRecord, Granularity, Measures, Scope, Shape};
use serde_json::json;

#[test]
fn test_snapshot_paths_map_to_twelve_shapes() {
    let paths = [
        "pulse/data/aggregated/transaction/country/india/2018/1.json",
        "pulse/data/aggregated/transaction/country/india/state/andaman-&-nicobar-islands/2018/1.json",
        "pulse/data/aggregated/user/country/india/2019/4.json",
        "pulse/data/aggregated/user/country/india/state/goa/2019/4.json",
        "pulse/data/map/transaction/hover/country/india/2020/2.json",
        "pulse/data/map/transaction/hover/country/india/state/goa/2020/2.json",
        "pulse/data/map/user/hover/country/india/2020/3.json",
        "pulse/data/map/user/hover/country/india/state/goa/2020/3.json",
        "pulse/data/top/transaction/country/india/2021/1.json",
        "pulse/data/top/transaction/country/india/state/goa/2021/1.json",
        "pulse/data/top/user/country/india/2022/2.json",
        "pulse/data/top/user/country/india/state/goa/2022/2.json",
    ];

    let shapes: Vec<Shape> = paths
        .iter()
        .map(|p| classify_path(Path::new(p)).unwrap().shape())
        .collect();
    assert_eq!(shapes, Shape::ALL.to_vec());
}

#[test]
fn test_state_file_address() {
    let address =
        classify(&["top", "user", "country", "india", "state", "tamil-nadu", "2022", "4.json"])
            .unwrap();

    assert_eq!(address.category, Category::Top);
    assert_eq!(address.scope, Scope::User);
    assert_eq!(address.country, "india");
    assert_eq!(address.state.as_deref(), Some("tamil-nadu"));
    assert_eq!(address.year, 2022);
    assert_eq!(address.quarter, 4);
    assert_eq!(address.granularity(), Granularity::SubNational);
}

#[test]
fn test_rejected_paths() {
    let cases: [(&str, fn(&ClassificationReason) -> bool); 5] = [
        ("README.json", |r| *r == ClassificationReason::MissingMarkers),
        ("aggregated/transaction/country/india/2018.json", |r| {
            *r == ClassificationReason::Truncated
        }),
        ("aggregated/transaction/country/india/2018/5.json", |r| {
            matches!(r, ClassificationReason::InvalidQuarter(_))
        }),
        ("map/user/hover/country/india/latest/1.json", |r| {
            matches!(r, ClassificationReason::InvalidYear(_))
        }),
        ("top/user/country/india/state/goa/districts/2021/1.json", |r| {
            *r == ClassificationReason::UnexpectedSegment("districts".to_string())
        }),
    ];

    for (path, expected) in cases {
        let err = classify_path(Path::new(path)).unwrap_err();
        assert!(expected(&err.reason), "{}: {:?}", path, err.reason);
        assert_eq!(err.path, path);
    }
}

#[test]
fn test_classified_file_extracts_keyed_records() {
    let address = classify_path(Path::new(
        "map/transaction/hover/country/india/state/goa/2021/3.json",
    ))
    .unwrap();
    let payload = json!({"success": true, "code": "SUCCESS", "data": {"hoverDataList": [
        {"name": "north goa district", "metric": [{"type": "TOTAL", "count": 42, "amount": 1234.5}]},
        {"name": "south goa district", "metric": [{"type": "TOTAL", "count": 7, "amount": 10.0}]}
    ]}});

    let records: Vec<FlatRecord> = extract(&address, &payload)
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();

    assert_eq!(records.len(), 2);
    for record in &records {
        assert_eq!(record.shape(), address.shape());
        assert_eq!(record.key.state.as_deref(), Some("goa"));
        assert_eq!(record.key.quarter, 3);
    }
    assert_eq!(
        records[0].measures,
        Measures::MapTransaction {
            unit: "north goa district".to_string(),
            count: 42,
            amount: 1234.5,
        }
    );
}
