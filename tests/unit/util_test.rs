//! Tests for shared utilities

use chrono::NaiveDate;
use coop_capacity::util::{day_after, day_before, init_test_tracing, init_tracing, MemberId, ProductId};

#[test]
fn test_day_arithmetic_crosses_year_boundary() {
    let new_year = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
    assert_eq!(day_before(new_year), NaiveDate::from_ymd_opt(2024, 12, 31));
    assert_eq!(day_after(NaiveDate::from_ymd_opt(2024, 12, 31).unwrap()), Some(new_year));
    assert_eq!(day_after(NaiveDate::MAX), None);
}

#[test]
fn test_ids_serialize_transparently() {
    let id = MemberId::new("m-42");
    assert_eq!(serde_json::to_string(&id).unwrap(), "\"m-42\"");
    let parsed: ProductId = serde_json::from_str("\"veg-m\"").unwrap();
    assert_eq!(parsed.as_str(), "veg-m");
}

#[test]
fn test_tracing_init_is_idempotent() {
    init_test_tracing();
    init_test_tracing();
    init_tracing();
}
