//! Domain records read by the capacity engine.
//!
//! These mirror what the collaborator services persist. The engine never mutates
//! them; every query returns owned copies.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::util::ids::{
    BasketSizeName, GrowingPeriodId, MemberId, PickupLocationId, ProductId, ProductTypeId,
    SubscriptionId, WaitingListEntryId,
};

/// Candidate order: product to subscribed quantity.
pub type CandidateOrder = BTreeMap<ProductId, u32>;

/// Maximum capacity of a location (or of the whole organisation) for one measure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CapacityLimit {
    /// No ceiling; checks against it always pass and never scan.
    Unlimited,
    /// Ceiling in share units or baskets.
    Limited(Decimal),
}

impl CapacityLimit {
    /// Interpret a stored maximum where `None` means unlimited.
    #[must_use]
    pub fn from_max(max: Option<Decimal>) -> Self {
        max.map_or(Self::Unlimited, Self::Limited)
    }

    /// Interpret a possibly missing capacity record. No record means nothing fits.
    #[must_use]
    pub fn from_record(record: Option<Option<Decimal>>) -> Self {
        record.map_or(Self::Limited(Decimal::ZERO), Self::from_max)
    }
}

/// A place where members collect their deliveries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PickupLocation {
    /// Identifier.
    pub id: PickupLocationId,
    /// Display name.
    pub name: String,
}

/// Per-product-type capacity of a pickup location (share policy).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capability {
    /// Location the capability belongs to.
    pub pickup_location: PickupLocationId,
    /// Product type served.
    pub product_type: ProductTypeId,
    /// Maximum share units; `None` is unlimited.
    #[serde(default)]
    pub max_capacity: Option<Decimal>,
}

/// Per-basket-size capacity of a pickup location (basket policy).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BasketCapacity {
    /// Location the capacity belongs to.
    pub pickup_location: PickupLocationId,
    /// Basket size bucket.
    pub basket_size: BasketSizeName,
    /// Maximum number of baskets; `None` is unlimited.
    #[serde(default)]
    pub max_capacity: Option<u32>,
}

/// Organisation-wide ceiling for a product type within one growing period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductTypeCapacity {
    /// Product type limited.
    pub product_type: ProductTypeId,
    /// Growing period the ceiling applies to.
    pub period: GrowingPeriodId,
    /// Maximum share units; `None` is unlimited.
    #[serde(default)]
    pub max_capacity: Option<Decimal>,
}

/// How often a product type is delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryCycle {
    /// Every week.
    #[default]
    Weekly,
    /// Every second week.
    EvenWeeks,
    /// Every second week, offset by one.
    OddWeeks,
    /// Once a month.
    Monthly,
}

/// A group of products sharing one capacity budget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductType {
    /// Identifier.
    pub id: ProductTypeId,
    /// Display name.
    pub name: String,
    /// Delivery cadence.
    #[serde(default)]
    pub delivery_cycle: DeliveryCycle,
}

/// A subscribable product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Identifier.
    pub id: ProductId,
    /// Owning product type.
    pub product_type: ProductTypeId,
    /// Display name.
    pub name: String,
}

/// Time-versioned price record carrying the product's share size.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductPrice {
    /// Product priced.
    pub product: ProductId,
    /// Share units consumed per subscribed unit.
    pub size: Decimal,
    /// First day this record is effective.
    pub valid_from: NaiveDate,
}

/// How many baskets of one size a unit of a product fills.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BasketSizeEquivalence {
    /// Product measured.
    pub product: ProductId,
    /// Basket size bucket.
    pub basket_size: BasketSizeName,
    /// Baskets per subscribed unit.
    pub quantity: u32,
}

/// A member's recurring commitment to a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
    /// Identifier.
    pub id: SubscriptionId,
    /// Subscribing member.
    pub member: MemberId,
    /// Subscribed product.
    pub product: ProductId,
    /// Units per delivery.
    pub quantity: u32,
    /// First day of the commitment.
    pub start_date: NaiveDate,
    /// Last day of the commitment, inclusive.
    pub end_date: NaiveDate,
    /// When the member cancelled, if they did.
    #[serde(default)]
    pub cancellation_ts: Option<DateTime<Utc>>,
    /// Growing period the subscription belongs to.
    pub period: GrowingPeriodId,
}

impl Subscription {
    /// Whether the cancellation took effect on or before `date`.
    #[must_use]
    pub fn is_cancelled_as_of(&self, date: NaiveDate) -> bool {
        self.cancellation_ts
            .is_some_and(|ts| ts.date_naive() <= date)
    }

    /// Active iff `start_date <= date <= end_date` and not cancelled as of `date`.
    #[must_use]
    pub fn is_active_at(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.end_date && !self.is_cancelled_as_of(date)
    }

    /// Whether `[start_date, end_date]` intersects `[from, to]`.
    #[must_use]
    pub fn overlaps(&self, from: NaiveDate, to: NaiveDate) -> bool {
        self.start_date <= to && from <= self.end_date
    }
}

/// Assignment of a member to a pickup location from `valid_from` onwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberPickupLocation {
    /// Assigned member.
    pub member: MemberId,
    /// Location serving the member.
    pub pickup_location: PickupLocationId,
    /// First day the assignment applies.
    pub valid_from: NaiveDate,
}

/// Window within which subscriptions and renewals are scoped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrowingPeriod {
    /// Identifier.
    pub id: GrowingPeriodId,
    /// First day.
    pub start_date: NaiveDate,
    /// Last day, inclusive.
    pub end_date: NaiveDate,
}

impl GrowingPeriod {
    /// Whether `date` falls inside the period.
    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.end_date
    }
}

/// A product someone on the waiting list would like.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductWish {
    /// Wished product.
    pub product: ProductId,
    /// Wished units.
    pub quantity: u32,
}

/// A pickup location someone on the waiting list would accept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PickupLocationWish {
    /// Wished location.
    pub pickup_location: PickupLocationId,
    /// Rank of the wish; 1 is the first choice.
    pub priority: u32,
}

/// Unconfirmed demand from a prospective or existing member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaitingListEntry {
    /// Identifier.
    pub id: WaitingListEntryId,
    /// Existing member behind the entry, if any.
    #[serde(default)]
    pub member: Option<MemberId>,
    /// Wished products.
    #[serde(default)]
    pub product_wishes: Vec<ProductWish>,
    /// Acceptable locations.
    #[serde(default)]
    pub pickup_location_wishes: Vec<PickupLocationWish>,
}

impl WaitingListEntry {
    /// Location of the highest-ranked wish (lowest priority number, then lowest id).
    #[must_use]
    pub fn top_pickup_location(&self) -> Option<&PickupLocationId> {
        self.pickup_location_wishes
            .iter()
            .min_by(|a, b| {
                a.priority
                    .cmp(&b.priority)
                    .then_with(|| a.pickup_location.cmp(&b.pickup_location))
            })
            .map(|wish| &wish.pickup_location)
    }
}
