//! In-memory snapshot answering every collaborator query.
//!
//! Suitable for tests, tooling and callers that load a consistent export of
//! the database before a batch of decisions.

use std::path::Path;

use anyhow::Context;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::core::error::{AppResult, CapacityResult};
use crate::core::model::{
    BasketCapacity, BasketSizeEquivalence, Capability, GrowingPeriod, MemberPickupLocation, PickupLocation,
    Product, ProductPrice, ProductType, ProductTypeCapacity, Subscription, WaitingListEntry,
};
use crate::core::source::{CommitmentSource, PeriodLookup};
use crate::util::ids::{BasketSizeName, PickupLocationId, ProductId, ProductTypeId};

/// Every record the engine reads, held in plain vectors.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InMemorySnapshot {
    /// Pickup locations.
    pub pickup_locations: Vec<PickupLocation>,
    /// Product types.
    pub product_types: Vec<ProductType>,
    /// Products.
    pub products: Vec<Product>,
    /// Time-versioned prices carrying sizes.
    pub product_prices: Vec<ProductPrice>,
    /// Basket-size equivalences.
    pub basket_size_equivalences: Vec<BasketSizeEquivalence>,
    /// Share capacities per location and product type.
    pub capabilities: Vec<Capability>,
    /// Basket capacities per location and basket size.
    pub basket_capacities: Vec<BasketCapacity>,
    /// Global ceilings per product type and period.
    pub product_type_capacities: Vec<ProductTypeCapacity>,
    /// Member-to-location assignments.
    pub member_pickup_locations: Vec<MemberPickupLocation>,
    /// Subscriptions, cancelled ones included.
    pub subscriptions: Vec<Subscription>,
    /// Growing periods.
    pub growing_periods: Vec<GrowingPeriod>,
    /// Pending waiting-list entries.
    pub waiting_list: Vec<WaitingListEntry>,
}

impl InMemorySnapshot {
    /// Empty snapshot.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a snapshot from JSON.
    ///
    /// # Errors
    /// Malformed JSON.
    pub fn from_json_str(input: &str) -> AppResult<Self> {
        serde_json::from_str(input).context("failed to parse capacity snapshot")
    }

    /// Read and parse a JSON snapshot file.
    ///
    /// # Errors
    /// Unreadable file or malformed JSON.
    pub fn from_json_file(path: impl AsRef<Path>) -> AppResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read snapshot {}", path.display()))?;
        Self::from_json_str(&raw).with_context(|| format!("invalid snapshot {}", path.display()))
    }

    /// Add a pickup location.
    #[must_use]
    pub fn with_pickup_location(mut self, location: PickupLocation) -> Self {
        self.pickup_locations.push(location);
        self
    }

    /// Add a product type.
    #[must_use]
    pub fn with_product_type(mut self, product_type: ProductType) -> Self {
        self.product_types.push(product_type);
        self
    }

    /// Add a product.
    #[must_use]
    pub fn with_product(mut self, product: Product) -> Self {
        self.products.push(product);
        self
    }

    /// Add a price record.
    #[must_use]
    pub fn with_price(mut self, price: ProductPrice) -> Self {
        self.product_prices.push(price);
        self
    }

    /// Add a basket-size equivalence.
    #[must_use]
    pub fn with_equivalence(mut self, equivalence: BasketSizeEquivalence) -> Self {
        self.basket_size_equivalences.push(equivalence);
        self
    }

    /// Add a share capability.
    #[must_use]
    pub fn with_capability(mut self, capability: Capability) -> Self {
        self.capabilities.push(capability);
        self
    }

    /// Add a basket capacity.
    #[must_use]
    pub fn with_basket_capacity(mut self, capacity: BasketCapacity) -> Self {
        self.basket_capacities.push(capacity);
        self
    }

    /// Add a global ceiling.
    #[must_use]
    pub fn with_product_type_capacity(mut self, capacity: ProductTypeCapacity) -> Self {
        self.product_type_capacities.push(capacity);
        self
    }

    /// Add a member-to-location assignment.
    #[must_use]
    pub fn with_member_pickup_location(mut self, assignment: MemberPickupLocation) -> Self {
        self.member_pickup_locations.push(assignment);
        self
    }

    /// Add a subscription.
    #[must_use]
    pub fn with_subscription(mut self, subscription: Subscription) -> Self {
        self.subscriptions.push(subscription);
        self
    }

    /// Add a growing period.
    #[must_use]
    pub fn with_growing_period(mut self, period: GrowingPeriod) -> Self {
        self.growing_periods.push(period);
        self
    }

    /// Add a waiting-list entry.
    #[must_use]
    pub fn with_waiting_list_entry(mut self, entry: WaitingListEntry) -> Self {
        self.waiting_list.push(entry);
        self
    }
}

impl CommitmentSource for InMemorySnapshot {
    fn product(&self, id: &ProductId) -> CapacityResult<Option<Product>> {
        Ok(self.products.iter().find(|product| product.id == *id).cloned())
    }

    fn product_prices(&self, id: &ProductId) -> CapacityResult<Vec<ProductPrice>> {
        Ok(self
            .product_prices
            .iter()
            .filter(|price| price.product == *id)
            .cloned()
            .collect())
    }

    fn basket_size_equivalences(&self, id: &ProductId) -> CapacityResult<Vec<BasketSizeEquivalence>> {
        Ok(self
            .basket_size_equivalences
            .iter()
            .filter(|equivalence| equivalence.product == *id)
            .cloned()
            .collect())
    }

    fn product_type_capability(
        &self,
        location: &PickupLocationId,
        product_type: &ProductTypeId,
    ) -> CapacityResult<Option<Capability>> {
        Ok(self
            .capabilities
            .iter()
            .find(|c| c.pickup_location == *location && c.product_type == *product_type)
            .cloned())
    }

    fn basket_capacity(
        &self,
        location: &PickupLocationId,
        basket_size: &BasketSizeName,
    ) -> CapacityResult<Option<BasketCapacity>> {
        Ok(self
            .basket_capacities
            .iter()
            .find(|c| c.pickup_location == *location && c.basket_size == *basket_size)
            .cloned())
    }

    fn global_capacity(
        &self,
        product_type: &ProductTypeId,
        date: NaiveDate,
    ) -> CapacityResult<Option<ProductTypeCapacity>> {
        let Some(period) = self.period_containing(date)? else {
            return Ok(None);
        };
        Ok(self
            .product_type_capacities
            .iter()
            .find(|c| c.product_type == *product_type && c.period == period.id)
            .cloned())
    }

    fn member_pickup_locations(&self) -> CapacityResult<Vec<MemberPickupLocation>> {
        Ok(self.member_pickup_locations.clone())
    }

    fn subscriptions_overlapping(&self, from: NaiveDate, to: NaiveDate) -> CapacityResult<Vec<Subscription>> {
        Ok(self
            .subscriptions
            .iter()
            .filter(|subscription| subscription.overlaps(from, to))
            .cloned()
            .collect())
    }

    fn latest_subscription_end(&self) -> CapacityResult<Option<NaiveDate>> {
        Ok(self.subscriptions.iter().map(|subscription| subscription.end_date).max())
    }

    fn waiting_list_entries(&self) -> CapacityResult<Vec<WaitingListEntry>> {
        Ok(self.waiting_list.clone())
    }
}

impl PeriodLookup for InMemorySnapshot {
    fn period_containing(&self, date: NaiveDate) -> CapacityResult<Option<GrowingPeriod>> {
        Ok(self
            .growing_periods
            .iter()
            .find(|period| period.contains(date))
            .cloned())
    }
}
