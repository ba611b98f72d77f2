//! Tests for the JSON snapshot adapter

use std::io::Write;

use chrono::NaiveDate;
use coop_capacity::core::{CandidateOrder, CapacityEngine, CommitmentSource, DecisionCache, OrderContext};
use coop_capacity::config::EngineConfig;
use coop_capacity::infra::InMemorySnapshot;

const SNAPSHOT: &str = r#"{
    "growing_periods": [{"id": "2024", "start_date": "2024-01-01", "end_date": "2024-12-31"}],
    "products": [{"id": "veg-m", "product_type": "veg", "name": "Vegetables M"}],
    "product_prices": [{"product": "veg-m", "size": "2", "valid_from": "2023-01-01"}],
    "capabilities": [{"pickup_location": "north", "product_type": "veg", "max_capacity": "10"}],
    "member_pickup_locations": [{"member": "m1", "pickup_location": "north", "valid_from": "2024-01-01"}],
    "subscriptions": [{
        "id": "s1", "member": "m1", "product": "veg-m", "quantity": 4,
        "start_date": "2024-01-01", "end_date": "2024-12-31", "period": "2024"
    }]
}"#;

#[test]
fn test_snapshot_file_drives_a_decision() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(SNAPSHOT.as_bytes()).unwrap();
    let snapshot = InMemorySnapshot::from_json_file(file.path()).unwrap();
    assert_eq!(
        snapshot.latest_subscription_end().unwrap(),
        NaiveDate::from_ymd_opt(2024, 12, 31)
    );

    let engine = CapacityEngine::new(&snapshot, &snapshot, EngineConfig::default());
    let start = NaiveDate::from_ymd_opt(2024, 3, 4).unwrap();
    let fits = CandidateOrder::from([("veg-m".into(), 1)]);
    let overflows = CandidateOrder::from([("veg-m".into(), 2)]);

    let ctx = OrderContext::new(&fits, start);
    assert!(engine
        .check_pickup_location_capacity(&"north".into(), &ctx, &mut DecisionCache::new())
        .unwrap());
    let ctx = OrderContext::new(&overflows, start);
    assert!(!engine
        .check_pickup_location_capacity(&"north".into(), &ctx, &mut DecisionCache::new())
        .unwrap());
}

#[test]
fn test_missing_file_reports_path() {
    let err = InMemorySnapshot::from_json_file("/nonexistent/snapshot.json").unwrap_err();
    assert!(err.to_string().contains("/nonexistent/snapshot.json"));
}

#[test]
fn test_overlap_query_includes_cancelled() {
    let snapshot = InMemorySnapshot::from_json_str(
        r#"{"subscriptions": [{
            "id": "s1", "member": "m1", "product": "veg-m", "quantity": 1,
            "start_date": "2024-01-01", "end_date": "2024-06-30", "period": "2024",
            "cancellation_ts": "2024-02-01T10:00:00Z"
        }]}"#,
    )
    .unwrap();
    let d = |m, day| NaiveDate::from_ymd_opt(2024, m, day).unwrap();
    assert_eq!(snapshot.subscriptions_overlapping(d(3, 1), d(3, 31)).unwrap().len(), 1);
    assert!(snapshot.subscriptions_overlapping(d(7, 1), d(7, 31)).unwrap().is_empty());
}
