//! Measuring capacity consumption.
//!
//! Both policies reduce to the same arithmetic once a [`Measure`] says how much
//! one unit of a product weighs: share units for a product type, or baskets of
//! one size.

use std::collections::BTreeSet;
use std::fmt;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::cache::DecisionCache;
use super::catalog::{equivalence, product_type_of, size_at};
use super::error::{CapacityError, CapacityResult};
use super::model::{CandidateOrder, CapacityLimit, Subscription};
use super::projector::CommitmentProjector;
use super::source::{CommitmentSource, PeriodLookup};
use crate::util::ids::{BasketSizeName, MemberId, PickupLocationId, ProductId, ProductTypeId};

/// Which members' commitments are counted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scope {
    /// Members assigned to this location at the sampled date.
    PickupLocation(PickupLocationId),
    /// Every member, regardless of location.
    Global,
}

/// Unit a product's quantity is converted into.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Measure {
    /// `size × quantity` for products of this type, 0 for every other product.
    Share(ProductTypeId),
    /// `equivalence × quantity` for this basket size, 0 without an equivalence.
    Basket(BasketSizeName),
}

impl fmt::Display for Measure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Share(product_type) => write!(f, "share units of {product_type}"),
            Self::Basket(basket_size) => write!(f, "{basket_size} baskets"),
        }
    }
}

/// Capacity a `quantity` of `product` consumes under `measure` at `date`.
///
/// # Errors
/// Unknown product, missing size for a share-measured product, or a failing source.
pub fn contribution<S>(
    source: &S,
    cache: &mut DecisionCache,
    measure: &Measure,
    product: &ProductId,
    quantity: u32,
    date: NaiveDate,
) -> CapacityResult<Decimal>
where
    S: CommitmentSource + ?Sized,
{
    let per_unit = match measure {
        Measure::Share(product_type) => {
            if product_type_of(source, cache, product)? != *product_type {
                return Ok(Decimal::ZERO);
            }
            size_at(source, cache, product, date)?
        }
        Measure::Basket(basket_size) => Decimal::from(equivalence(source, cache, product, basket_size)?),
    };
    per_unit
        .checked_mul(Decimal::from(quantity))
        .ok_or_else(|| CapacityError::Overflow(product.clone()))
}

/// Add `amount` consumed by `product` to a running total.
///
/// # Errors
/// [`CapacityError::Overflow`] when the total leaves the decimal range.
pub(crate) fn accumulate(total: Decimal, amount: Decimal, product: &ProductId) -> CapacityResult<Decimal> {
    total
        .checked_add(amount)
        .ok_or_else(|| CapacityError::Overflow(product.clone()))
}

/// Whether a product belongs to one of `product_types`; `None` admits every product.
fn admitted<S>(
    source: &S,
    cache: &mut DecisionCache,
    product: &ProductId,
    product_types: Option<&BTreeSet<ProductTypeId>>,
) -> CapacityResult<bool>
where
    S: CommitmentSource + ?Sized,
{
    match product_types {
        None => Ok(true),
        Some(types) => Ok(types.contains(&product_type_of(source, cache, product)?)),
    }
}

/// Sum of contributions of a set of subscriptions.
///
/// # Errors
/// See [`contribution`].
pub fn subscriptions_usage<S>(
    source: &S,
    cache: &mut DecisionCache,
    measure: &Measure,
    subscriptions: &[Subscription],
    date: NaiveDate,
) -> CapacityResult<Decimal>
where
    S: CommitmentSource + ?Sized,
{
    let mut total = Decimal::ZERO;
    for subscription in subscriptions {
        let amount = contribution(source, cache, measure, &subscription.product, subscription.quantity, date)?;
        total = accumulate(total, amount, &subscription.product)?;
    }
    Ok(total)
}

/// Capacity consumed at `date` by everything the projector counts in `scope`.
///
/// # Errors
/// See [`contribution`] and [`CommitmentProjector::project`].
pub fn usage_at<S, P>(
    projector: &CommitmentProjector<'_, S, P>,
    cache: &mut DecisionCache,
    scope: &Scope,
    measure: &Measure,
    date: NaiveDate,
) -> CapacityResult<Decimal>
where
    S: CommitmentSource + ?Sized,
    P: PeriodLookup + ?Sized,
{
    let projected = projector.project(cache, date, scope)?;
    subscriptions_usage(projector.source(), cache, measure, &projected, date)
}

/// Capacity the acting member already occupies in `scope` at `date`.
///
/// Uses the same projection as [`usage_at`], so a projected renewal counts as
/// the member's own footprint. Limited to `product_types` when given.
///
/// # Errors
/// See [`usage_at`].
pub fn member_footprint<S, P>(
    projector: &CommitmentProjector<'_, S, P>,
    cache: &mut DecisionCache,
    scope: &Scope,
    measure: &Measure,
    member: &MemberId,
    date: NaiveDate,
    product_types: Option<&BTreeSet<ProductTypeId>>,
) -> CapacityResult<Decimal>
where
    S: CommitmentSource + ?Sized,
    P: PeriodLookup + ?Sized,
{
    let source = projector.source();
    let projected = projector.project(cache, date, scope)?;
    let mut total = Decimal::ZERO;
    for subscription in projected.iter().filter(|sub| sub.member == *member) {
        if admitted(source, cache, &subscription.product, product_types)? {
            let amount = contribution(source, cache, measure, &subscription.product, subscription.quantity, date)?;
            total = accumulate(total, amount, &subscription.product)?;
        }
    }
    Ok(total)
}

/// Capacity a candidate order would consume, limited to `product_types` when given.
///
/// # Errors
/// See [`contribution`].
pub fn order_demand<S>(
    source: &S,
    cache: &mut DecisionCache,
    measure: &Measure,
    order: &CandidateOrder,
    date: NaiveDate,
    product_types: Option<&BTreeSet<ProductTypeId>>,
) -> CapacityResult<Decimal>
where
    S: CommitmentSource + ?Sized,
{
    let mut total = Decimal::ZERO;
    for (product, quantity) in order {
        if admitted(source, cache, product, product_types)? {
            let amount = contribution(source, cache, measure, product, *quantity, date)?;
            total = accumulate(total, amount, product)?;
        }
    }
    Ok(total)
}

/// Outcome of comparing one capacity against one measure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapacityVerdict {
    /// What was measured.
    pub measure: Measure,
    /// Product types of the order covered by this verdict.
    pub product_types: BTreeSet<ProductTypeId>,
    /// Configured capacity.
    pub capacity: CapacityLimit,
    /// Highest usage between the start date and the horizon.
    pub highest_usage: Decimal,
    /// Usage the acting member already holds and would give up.
    pub member_usage: Decimal,
    /// Usage the candidate order adds.
    pub demand: Decimal,
    /// Usage reserved for the waiting list.
    pub reserved: Decimal,
}

impl CapacityVerdict {
    /// Verdict for an unlimited capacity; nothing was measured.
    #[must_use]
    pub fn unlimited(measure: Measure, product_types: BTreeSet<ProductTypeId>) -> Self {
        Self {
            measure,
            product_types,
            capacity: CapacityLimit::Unlimited,
            highest_usage: Decimal::ZERO,
            member_usage: Decimal::ZERO,
            demand: Decimal::ZERO,
            reserved: Decimal::ZERO,
        }
    }

    /// Free capacity at the worst future moment, before the order is applied.
    #[must_use]
    pub fn free(&self) -> Option<Decimal> {
        match self.capacity {
            CapacityLimit::Unlimited => None,
            CapacityLimit::Limited(max) => Some(max.saturating_sub(self.highest_usage)),
        }
    }

    /// `free + member_usage - demand - reserved`; `None` when unlimited.
    #[must_use]
    pub fn remaining(&self) -> Option<Decimal> {
        self.free()
            .map(|free| {
                free.saturating_add(self.member_usage)
                    .saturating_sub(self.demand)
                    .saturating_sub(self.reserved)
            })
    }

    /// Whether the order fits under this capacity.
    #[must_use]
    pub fn passes(&self) -> bool {
        self.remaining().is_none_or(|remaining| remaining >= Decimal::ZERO)
    }
}
