//! Share-policy admission at a pickup location.
//!
//! Covers:
//! 1. Admission arithmetic against the highest future usage
//! 2. Members replacing their own commitments
//! 3. Unlimited capacity short-circuiting the scan
//! 4. Monotonicity in demand, existing usage and configured capacity
//! 5. Errors aborting the decision

mod common;

use common::*;
use coop_capacity::core::{
    CapacityError, CapacityLimit, CommitmentProjector, DecisionCache, Measure, OrderContext, ShareModeChecker,
};
use coop_capacity::infra::InMemorySnapshot;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn start() -> chrono::NaiveDate {
    d(2024, 3, 4)
}

fn with_existing(snapshot: InMemorySnapshot, product: &str, quantity: u32) -> InMemorySnapshot {
    snapshot
        .with_member_pickup_location(assign("m1", "north", d(2024, 1, 1)))
        .with_subscription(sub("s1", "m1", product, quantity, d(2024, 1, 1), d(2024, 12, 31)))
}

#[test]
fn order_fits_next_to_small_existing_usage() {
    let snapshot = with_existing(base(), "veg-m", 3);
    let engine = share_engine(&snapshot);
    let order = order(&[("veg-m", 10)]);
    let ctx = OrderContext::new(&order, start());
    let mut cache = DecisionCache::new();

    let report = engine.evaluate_pickup_location(&"north".into(), &ctx, &mut cache).unwrap();
    assert!(report.admitted());
    let verdict = &report.verdicts[0];
    assert_eq!(verdict.measure, Measure::Share("veg".into()));
    assert_eq!(verdict.highest_usage, dec!(6));
    assert_eq!(verdict.demand, dec!(20));
    assert_eq!(verdict.remaining(), Some(dec!(74)));
}

#[test]
fn order_rejected_when_location_nearly_full() {
    let snapshot = with_existing(base(), "veg-l", 19);
    let engine = share_engine(&snapshot);
    let order = order(&[("veg-m", 10)]);
    let ctx = OrderContext::new(&order, start());
    let mut cache = DecisionCache::new();

    let report = engine.evaluate_pickup_location(&"north".into(), &ctx, &mut cache).unwrap();
    assert!(!report.admitted());
    assert_eq!(report.verdicts[0].remaining(), Some(dec!(-15)));
    assert_eq!(report.failing_product_types().len(), 1);
}

#[test]
fn exact_fit_is_admitted() {
    let snapshot = with_existing(base(), "veg-l", 16);
    let engine = share_engine(&snapshot);
    let order = order(&[("veg-m", 10)]);
    let ctx = OrderContext::new(&order, start());
    assert!(engine
        .check_pickup_location_capacity(&"north".into(), &ctx, &mut DecisionCache::new())
        .unwrap());
}

#[test]
fn member_replacing_own_order_is_not_charged_twice() {
    let snapshot = with_existing(base(), "veg-l", 19);
    let engine = share_engine(&snapshot);
    let member = "m1".into();
    let order = order(&[("veg-m", 10)]);
    let ctx = OrderContext::new(&order, start()).for_member(Some(&member));
    let mut cache = DecisionCache::new();

    let report = engine.evaluate_pickup_location(&"north".into(), &ctx, &mut cache).unwrap();
    let verdict = &report.verdicts[0];
    assert_eq!(verdict.member_usage, dec!(95));
    assert_eq!(verdict.remaining(), Some(dec!(80)));
    assert!(report.admitted());
}

/// `m1` holds 20 medium vegetable shares (40 units); `m2` fills the other 60.
fn full_north() -> InMemorySnapshot {
    base()
        .with_member_pickup_location(assign("m1", "north", d(2024, 1, 1)))
        .with_member_pickup_location(assign("m2", "north", d(2024, 1, 1)))
        .with_subscription(sub("s1", "m1", "veg-m", 20, d(2024, 1, 1), d(2024, 12, 31)))
        .with_subscription(sub("s2", "m2", "veg-l", 12, d(2024, 1, 1), d(2024, 12, 31)))
}

#[test]
fn reordering_current_subscriptions_fits_a_full_location() {
    let snapshot = full_north();
    let member = "m1".into();
    let same = order(&[("veg-m", 20)]);

    for (engine, start_date) in [
        (share_engine(&snapshot), d(2024, 3, 4)),
        (renewing_engine(&snapshot), d(2025, 2, 3)),
    ] {
        let ctx = OrderContext::new(&same, start_date).for_member(Some(&member));
        let report = engine
            .evaluate_pickup_location(&"north".into(), &ctx, &mut DecisionCache::new())
            .unwrap();
        let verdict = &report.verdicts[0];
        assert_eq!(verdict.highest_usage, dec!(100), "start {start_date}");
        assert_eq!(verdict.member_usage, dec!(40), "start {start_date}");
        assert_eq!(verdict.remaining(), Some(dec!(0)), "start {start_date}");
        assert!(report.admitted(), "start {start_date}");
    }

    let other = "m3".into();
    let ctx = OrderContext::new(&same, d(2024, 3, 4)).for_member(Some(&other));
    assert!(!share_engine(&snapshot)
        .check_pickup_location_capacity(&"north".into(), &ctx, &mut DecisionCache::new())
        .unwrap());
}

#[test]
fn footprint_at_another_location_is_not_credited() {
    let snapshot = base()
        .with_capability(capability("south", "veg", Some(dec!(100))))
        .with_member_pickup_location(assign("m1", "south", d(2024, 1, 1)))
        .with_member_pickup_location(assign("m2", "north", d(2024, 1, 1)))
        .with_subscription(sub("s1", "m1", "veg-l", 10, d(2024, 1, 1), d(2024, 12, 31)))
        .with_subscription(sub("s2", "m2", "veg-l", 19, d(2024, 1, 1), d(2024, 12, 31)));
    let engine = share_engine(&snapshot);
    let member = "m1".into();
    let order = order(&[("veg-m", 10)]);
    let ctx = OrderContext::new(&order, start()).for_member(Some(&member));

    let report = engine
        .evaluate_pickup_location(&"north".into(), &ctx, &mut DecisionCache::new())
        .unwrap();
    assert_eq!(report.verdicts[0].member_usage, dec!(0));
    assert!(!report.admitted());
}

#[test]
fn future_subscription_counts_against_current_order() {
    let snapshot = base()
        .with_member_pickup_location(assign("m1", "north", d(2024, 1, 1)))
        .with_subscription(sub("s1", "m1", "veg-m", 45, d(2024, 6, 3), d(2024, 12, 31)));
    let engine = share_engine(&snapshot);
    let order = order(&[("veg-m", 10)]);
    let ctx = OrderContext::new(&order, start());

    let report = engine
        .evaluate_pickup_location(&"north".into(), &ctx, &mut DecisionCache::new())
        .unwrap();
    assert_eq!(report.verdicts[0].highest_usage, dec!(90));
    assert!(!report.admitted());
}

#[test]
fn cancelled_subscription_frees_capacity_from_its_cancellation_day() {
    let snapshot = base()
        .with_member_pickup_location(assign("m1", "north", d(2024, 1, 1)))
        .with_subscription(cancelled(
            sub("s1", "m1", "veg-l", 19, d(2024, 1, 1), d(2024, 12, 31)),
            d(2024, 2, 1),
        ));
    let engine = share_engine(&snapshot);
    let order = order(&[("veg-m", 10)]);
    let ctx = OrderContext::new(&order, start());
    assert!(engine
        .check_pickup_location_capacity(&"north".into(), &ctx, &mut DecisionCache::new())
        .unwrap());
}

#[test]
fn unlimited_capacity_skips_scanning() {
    let snapshot = base()
        .with_capability(capability("east", "veg", None))
        .with_member_pickup_location(assign("m1", "east", d(2024, 1, 1)))
        .with_subscription(sub("s1", "m1", "veg-l", 1000, d(2024, 1, 1), d(2024, 12, 31)));
    let engine = share_engine(&snapshot);
    let order = order(&[("veg-m", 500)]);
    let ctx = OrderContext::new(&order, start());
    let mut cache = DecisionCache::new();

    let report = engine.evaluate_pickup_location(&"east".into(), &ctx, &mut cache).unwrap();
    assert!(report.admitted());
    assert_eq!(report.verdicts[0].capacity, CapacityLimit::Unlimited);
    let stats = cache.stats();
    assert_eq!(stats.scans, 0);
    assert_eq!(stats.usage_evaluations, 0);
}

#[test]
fn location_without_capability_admits_nothing() {
    let snapshot = base();
    let engine = share_engine(&snapshot);
    let one = order(&[("veg-m", 1)]);
    let empty = order(&[("veg-m", 0)]);
    let ctx = OrderContext::new(&one, start());
    assert!(!engine
        .check_pickup_location_capacity(&"nowhere".into(), &ctx, &mut DecisionCache::new())
        .unwrap());

    let ctx = OrderContext::new(&empty, start());
    assert!(engine
        .check_pickup_location_capacity(&"nowhere".into(), &ctx, &mut DecisionCache::new())
        .unwrap());
}

#[test]
fn scan_is_memoised_within_a_decision() {
    let snapshot = with_existing(base(), "veg-m", 3);
    let projector = CommitmentProjector::new(&snapshot, &snapshot, false);
    let checker = ShareModeChecker::new(projector);
    let mut cache = DecisionCache::new();

    let first = checker
        .highest_future_usage(&mut cache, &"veg".into(), &"north".into(), start())
        .unwrap();
    let evaluations = cache.stats().usage_evaluations;
    let second = checker
        .highest_future_usage(&mut cache, &"veg".into(), &"north".into(), start())
        .unwrap();
    assert_eq!(first, second);
    assert_eq!(cache.stats().scans, 1);
    assert_eq!(cache.stats().usage_evaluations, evaluations);
}

#[test]
fn admission_is_monotone_in_demand_and_existing_usage() {
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..40 {
        let existing = rng.random_range(1..50_u32);
        let demand = rng.random_range(1..50_u32);
        let snapshot = with_existing(base(), "veg-m", existing);
        let engine = share_engine(&snapshot);

        let fits = |quantity: u32| {
            let order = order(&[("veg-m", quantity)]);
            let ctx = OrderContext::new(&order, start());
            engine
                .check_pickup_location_capacity(&"north".into(), &ctx, &mut DecisionCache::new())
                .unwrap()
        };
        if fits(demand) {
            assert!(fits(demand - 1), "smaller order rejected: existing={existing} demand={demand}");
        }

        let fuller = with_existing(base(), "veg-m", existing + 1);
        let fuller_engine = share_engine(&fuller);
        let order = order(&[("veg-m", demand)]);
        let ctx = OrderContext::new(&order, start());
        let fits_fuller = fuller_engine
            .check_pickup_location_capacity(&"north".into(), &ctx, &mut DecisionCache::new())
            .unwrap();
        if fits_fuller {
            assert!(fits(demand), "more usage admitted more: existing={existing} demand={demand}");
        }
    }
}

#[test]
fn admission_is_monotone_in_configured_capacity() {
    let order = order(&[("veg-m", 7)]);
    let ctx = OrderContext::new(&order, start());
    let mut admitted_from = None;
    for cap in 0..200_u32 {
        let mut snapshot = with_existing(base(), "veg-m", 25);
        snapshot.capabilities = vec![capability("north", "veg", Some(Decimal::from(cap)))];
        let fits = share_engine(&snapshot)
            .check_pickup_location_capacity(&"north".into(), &ctx, &mut DecisionCache::new())
            .unwrap();
        match admitted_from {
            None if fits => admitted_from = Some(cap),
            Some(first) => assert!(fits, "capacity {cap} rejected after {first} admitted"),
            None => {}
        }
    }
    assert_eq!(admitted_from, Some(64));
}

#[test]
fn absurd_size_fails_instead_of_panicking() {
    let snapshot = base()
        .with_product(product("veg-huge", "veg"))
        .with_price(price("veg-huge", Decimal::MAX, d(2023, 1, 1)));
    let engine = share_engine(&snapshot);
    let order = order(&[("veg-huge", 2)]);
    let ctx = OrderContext::new(&order, start());
    let err = engine
        .check_pickup_location_capacity(&"north".into(), &ctx, &mut DecisionCache::new())
        .unwrap_err();
    assert!(matches!(err, CapacityError::Overflow(_)));
}

#[test]
fn missing_size_aborts_the_decision() {
    let snapshot = base().with_product(product("veg-herb", "veg"));
    let engine = share_engine(&snapshot);
    let order = order(&[("veg-herb", 1)]);
    let ctx = OrderContext::new(&order, start());
    let err = engine
        .check_pickup_location_capacity(&"north".into(), &ctx, &mut DecisionCache::new())
        .unwrap_err();
    assert!(matches!(err, CapacityError::MissingProductSize { .. }));
}

#[test]
fn price_valid_after_start_does_not_count() {
    let snapshot = base()
        .with_product(product("veg-new", "veg"))
        .with_price(price("veg-new", dec!(3), d(2024, 6, 1)));
    let engine = share_engine(&snapshot);
    let order = order(&[("veg-new", 1)]);
    let ctx = OrderContext::new(&order, start());
    let err = engine
        .check_pickup_location_capacity(&"north".into(), &ctx, &mut DecisionCache::new())
        .unwrap_err();
    assert!(matches!(err, CapacityError::MissingProductSize { .. }));
}

#[test]
fn unknown_product_aborts_the_decision() {
    let snapshot = base();
    let engine = share_engine(&snapshot);
    let order = order(&[("mystery", 1)]);
    let ctx = OrderContext::new(&order, start());
    let err = engine
        .check_pickup_location_capacity(&"north".into(), &ctx, &mut DecisionCache::new())
        .unwrap_err();
    assert!(matches!(err, CapacityError::UnknownProduct(_)));
}
