//! Read-only collaborator interfaces the engine consumes.
//!
//! Persistence lives elsewhere; the engine only ever asks these traits questions.
//! Implementations are expected to answer from a consistent snapshot for the
//! lifetime of one decision.

use std::sync::Arc;

use chrono::NaiveDate;

use super::error::CapacityResult;
use super::model::{
    BasketCapacity, BasketSizeEquivalence, Capability, GrowingPeriod, MemberPickupLocation, Product,
    ProductPrice, ProductTypeCapacity, Subscription, WaitingListEntry,
};
use crate::util::clock::{day_after, day_before};
use crate::util::ids::{BasketSizeName, PickupLocationId, ProductId, ProductTypeId};

/// Queries against the member, product and subscription store.
pub trait CommitmentSource {
    /// Look up a product.
    fn product(&self, id: &ProductId) -> CapacityResult<Option<Product>>;

    /// All price records of a product, in any order.
    fn product_prices(&self, id: &ProductId) -> CapacityResult<Vec<ProductPrice>>;

    /// All basket-size equivalences of a product.
    fn basket_size_equivalences(&self, id: &ProductId) -> CapacityResult<Vec<BasketSizeEquivalence>>;

    /// Capability of a location for a product type, if one is recorded.
    fn product_type_capability(
        &self,
        location: &PickupLocationId,
        product_type: &ProductTypeId,
    ) -> CapacityResult<Option<Capability>>;

    /// Capacity of a location for a basket size, if one is recorded.
    fn basket_capacity(
        &self,
        location: &PickupLocationId,
        basket_size: &BasketSizeName,
    ) -> CapacityResult<Option<BasketCapacity>>;

    /// Organisation-wide ceiling for a product type in the period containing `date`.
    fn global_capacity(
        &self,
        product_type: &ProductTypeId,
        date: NaiveDate,
    ) -> CapacityResult<Option<ProductTypeCapacity>>;

    /// Every member-to-location assignment ever recorded.
    fn member_pickup_locations(&self) -> CapacityResult<Vec<MemberPickupLocation>>;

    /// Subscriptions whose `[start_date, end_date]` intersects `[from, to]`,
    /// cancelled ones included.
    fn subscriptions_overlapping(&self, from: NaiveDate, to: NaiveDate) -> CapacityResult<Vec<Subscription>>;

    /// Latest `end_date` across all subscriptions.
    fn latest_subscription_end(&self) -> CapacityResult<Option<NaiveDate>>;

    /// Every pending waiting-list entry.
    fn waiting_list_entries(&self) -> CapacityResult<Vec<WaitingListEntry>>;
}

/// Growing-period calendar.
pub trait PeriodLookup {
    /// The period containing `date`.
    fn period_containing(&self, date: NaiveDate) -> CapacityResult<Option<GrowingPeriod>>;

    /// The period starting the day after `period` ends.
    fn period_after(&self, period: &GrowingPeriod) -> CapacityResult<Option<GrowingPeriod>> {
        let Some(next_day) = day_after(period.end_date) else {
            return Ok(None);
        };
        Ok(self
            .period_containing(next_day)?
            .filter(|next| next.start_date == next_day))
    }

    /// The period ending the day before `period` starts.
    fn period_before(&self, period: &GrowingPeriod) -> CapacityResult<Option<GrowingPeriod>> {
        let Some(previous_day) = day_before(period.start_date) else {
            return Ok(None);
        };
        Ok(self
            .period_containing(previous_day)?
            .filter(|previous| previous.end_date == previous_day))
    }
}

macro_rules! forward_commitment_source {
    ($($wrapper:ty),*) => {$(
        impl<T: CommitmentSource + ?Sized> CommitmentSource for $wrapper {
            fn product(&self, id: &ProductId) -> CapacityResult<Option<Product>> {
                (**self).product(id)
            }

            fn product_prices(&self, id: &ProductId) -> CapacityResult<Vec<ProductPrice>> {
                (**self).product_prices(id)
            }

            fn basket_size_equivalences(&self, id: &ProductId) -> CapacityResult<Vec<BasketSizeEquivalence>> {
                (**self).basket_size_equivalences(id)
            }

            fn product_type_capability(
                &self,
                location: &PickupLocationId,
                product_type: &ProductTypeId,
            ) -> CapacityResult<Option<Capability>> {
                (**self).product_type_capability(location, product_type)
            }

            fn basket_capacity(
                &self,
                location: &PickupLocationId,
                basket_size: &BasketSizeName,
            ) -> CapacityResult<Option<BasketCapacity>> {
                (**self).basket_capacity(location, basket_size)
            }

            fn global_capacity(
                &self,
                product_type: &ProductTypeId,
                date: NaiveDate,
            ) -> CapacityResult<Option<ProductTypeCapacity>> {
                (**self).global_capacity(product_type, date)
            }

            fn member_pickup_locations(&self) -> CapacityResult<Vec<MemberPickupLocation>> {
                (**self).member_pickup_locations()
            }

            fn subscriptions_overlapping(&self, from: NaiveDate, to: NaiveDate) -> CapacityResult<Vec<Subscription>> {
                (**self).subscriptions_overlapping(from, to)
            }

            fn latest_subscription_end(&self) -> CapacityResult<Option<NaiveDate>> {
                (**self).latest_subscription_end()
            }

            fn waiting_list_entries(&self) -> CapacityResult<Vec<WaitingListEntry>> {
                (**self).waiting_list_entries()
            }
        }

        impl<T: PeriodLookup + ?Sized> PeriodLookup for $wrapper {
            fn period_containing(&self, date: NaiveDate) -> CapacityResult<Option<GrowingPeriod>> {
                (**self).period_containing(date)
            }

            fn period_after(&self, period: &GrowingPeriod) -> CapacityResult<Option<GrowingPeriod>> {
                (**self).period_after(period)
            }

            fn period_before(&self, period: &GrowingPeriod) -> CapacityResult<Option<GrowingPeriod>> {
                (**self).period_before(period)
            }
        }
    )*};
}

forward_commitment_source!(&T, Arc<T>, Box<T>);
