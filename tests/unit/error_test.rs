//! Tests for error types

use chrono::NaiveDate;
use coop_capacity::core::{AppResult, CapacityError};

#[test]
fn test_missing_size_display() {
    let err = CapacityError::MissingProductSize {
        product: "veg-m".into(),
        date: NaiveDate::from_ymd_opt(2024, 3, 4).unwrap(),
    };
    assert_eq!(err.to_string(), "no size defined for product veg-m as of 2024-03-04");
}

#[test]
fn test_error_display() {
    assert_eq!(CapacityError::UnknownProduct("x".into()).to_string(), "unknown product: x");
    assert_eq!(
        CapacityError::InvalidConfig("bad".into()).to_string(),
        "invalid configuration: bad"
    );
    assert_eq!(CapacityError::Backend("down".into()).to_string(), "backend error: down");
    assert_eq!(
        CapacityError::Overflow("veg-m".into()).to_string(),
        "capacity arithmetic overflowed for product veg-m"
    );
}

#[test]
fn test_error_converts_into_app_result() {
    fn fetch() -> Result<u32, CapacityError> {
        Err(CapacityError::Backend("timeout".into()))
    }
    fn run() -> AppResult<u32> {
        Ok(fetch()? + 1)
    }
    let err = run().unwrap_err();
    assert!(err.downcast_ref::<CapacityError>().is_some());
}
