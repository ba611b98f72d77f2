//! Shared fixtures for integration tests.
#![allow(dead_code)]

use chrono::{NaiveDate, TimeZone, Utc};
use coop_capacity::config::EngineConfig;
use coop_capacity::core::{
    BasketCapacity, BasketSizeEquivalence, CandidateOrder, Capability, CapacityEngine, GrowingPeriod,
    MemberPickupLocation, PickupLocationWish, Product, ProductPrice, ProductTypeCapacity, ProductWish,
    Subscription, WaitingListEntry,
};
use coop_capacity::infra::InMemorySnapshot;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

pub type SnapshotEngine<'a> = CapacityEngine<&'a InMemorySnapshot, &'a InMemorySnapshot, EngineConfig>;

pub fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

pub fn period(id: &str, start: NaiveDate, end: NaiveDate) -> GrowingPeriod {
    GrowingPeriod {
        id: id.into(),
        start_date: start,
        end_date: end,
    }
}

pub fn product(id: &str, product_type: &str) -> Product {
    Product {
        id: id.into(),
        product_type: product_type.into(),
        name: id.to_string(),
    }
}

pub fn price(product: &str, size: Decimal, valid_from: NaiveDate) -> ProductPrice {
    ProductPrice {
        product: product.into(),
        size,
        valid_from,
    }
}

pub fn capability(location: &str, product_type: &str, max_capacity: Option<Decimal>) -> Capability {
    Capability {
        pickup_location: location.into(),
        product_type: product_type.into(),
        max_capacity,
    }
}

pub fn basket_capacity(location: &str, basket_size: &str, max_capacity: Option<u32>) -> BasketCapacity {
    BasketCapacity {
        pickup_location: location.into(),
        basket_size: basket_size.into(),
        max_capacity,
    }
}

pub fn equivalence(product: &str, basket_size: &str, quantity: u32) -> BasketSizeEquivalence {
    BasketSizeEquivalence {
        product: product.into(),
        basket_size: basket_size.into(),
        quantity,
    }
}

pub fn global(product_type: &str, period: &str, max_capacity: Option<Decimal>) -> ProductTypeCapacity {
    ProductTypeCapacity {
        product_type: product_type.into(),
        period: period.into(),
        max_capacity,
    }
}

pub fn assign(member: &str, location: &str, valid_from: NaiveDate) -> MemberPickupLocation {
    MemberPickupLocation {
        member: member.into(),
        pickup_location: location.into(),
        valid_from,
    }
}

pub fn sub(id: &str, member: &str, product: &str, quantity: u32, start: NaiveDate, end: NaiveDate) -> Subscription {
    Subscription {
        id: id.into(),
        member: member.into(),
        product: product.into(),
        quantity,
        start_date: start,
        end_date: end,
        cancellation_ts: None,
        period: start.format("%Y").to_string().into(),
    }
}

pub fn cancelled(mut subscription: Subscription, on: NaiveDate) -> Subscription {
    subscription.cancellation_ts = Some(Utc.from_utc_datetime(&on.and_hms_opt(9, 0, 0).unwrap()));
    subscription
}

pub fn wish(id: &str, member: Option<&str>, location: &str, product: &str, quantity: u32) -> WaitingListEntry {
    WaitingListEntry {
        id: id.into(),
        member: member.map(Into::into),
        product_wishes: vec![ProductWish {
            product: product.into(),
            quantity,
        }],
        pickup_location_wishes: vec![PickupLocationWish {
            pickup_location: location.into(),
            priority: 1,
        }],
    }
}

pub fn order(lines: &[(&str, u32)]) -> CandidateOrder {
    lines
        .iter()
        .map(|(product, quantity)| ((*product).into(), *quantity))
        .collect()
}

/// Two contiguous yearly periods, vegetables in shares of 2 and 5, fruit in
/// shares of 1, and a `north` location holding 100 vegetable share units.
pub fn base() -> InMemorySnapshot {
    InMemorySnapshot::new()
        .with_growing_period(period("2024", d(2024, 1, 1), d(2024, 12, 31)))
        .with_growing_period(period("2025", d(2025, 1, 1), d(2025, 12, 31)))
        .with_product(product("veg-m", "veg"))
        .with_product(product("veg-l", "veg"))
        .with_product(product("fruit-s", "fruit"))
        .with_price(price("veg-m", dec!(2), d(2023, 1, 1)))
        .with_price(price("veg-l", dec!(5), d(2023, 1, 1)))
        .with_price(price("fruit-s", dec!(1), d(2023, 1, 1)))
        .with_capability(capability("north", "veg", Some(dec!(100))))
}

pub fn engine(snapshot: &InMemorySnapshot, cfg: EngineConfig) -> SnapshotEngine<'_> {
    CapacityEngine::new(snapshot, snapshot, cfg)
}

pub fn share_engine(snapshot: &InMemorySnapshot) -> SnapshotEngine<'_> {
    engine(snapshot, EngineConfig::default())
}

pub fn renewing_engine(snapshot: &InMemorySnapshot) -> SnapshotEngine<'_> {
    engine(
        snapshot,
        EngineConfig {
            auto_renewal: true,
            ..EngineConfig::default()
        },
    )
}
