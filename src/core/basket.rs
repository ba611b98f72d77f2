//! Basket-mode capacity policy.
//!
//! Usage is discretised into named basket sizes. Each product fills a fixed
//! number of baskets of each size per unit; products without an equivalence
//! for a size simply do not use it. Basket buckets are shared by every product
//! at the location, so usage and reservations are never filtered by product
//! type, while the member's footprint and the demand only cover the product
//! types being ordered.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::debug;

use super::cache::DecisionCache;
use super::error::CapacityResult;
use super::horizon::capacity_change_horizon;
use super::model::CapacityLimit;
use super::order::OrderContext;
use super::projector::CommitmentProjector;
use super::scanner::highest_future_usage;
use super::source::{CommitmentSource, PeriodLookup};
use super::usage::{member_footprint, order_demand, usage_at, CapacityVerdict, Measure, Scope};
use super::waiting_list::waiting_list_reservation;
use crate::util::ids::{BasketSizeName, PickupLocationId, ProductTypeId};

/// Checks basket-policy product types at one pickup location, once per basket size.
pub struct BasketModeChecker<'a, S: ?Sized, P: ?Sized> {
    projector: CommitmentProjector<'a, S, P>,
    basket_sizes: &'a [BasketSizeName],
}

impl<'a, S, P> BasketModeChecker<'a, S, P>
where
    S: CommitmentSource + ?Sized,
    P: PeriodLookup + ?Sized,
{
    /// Create a checker for the configured basket sizes.
    pub const fn new(projector: CommitmentProjector<'a, S, P>, basket_sizes: &'a [BasketSizeName]) -> Self {
        Self {
            projector,
            basket_sizes,
        }
    }

    /// Configured capacity of `location` for `basket_size`.
    ///
    /// # Errors
    /// A failing source.
    pub fn available_capacity(
        &self,
        basket_size: &BasketSizeName,
        location: &PickupLocationId,
    ) -> CapacityResult<CapacityLimit> {
        let record = self.projector.source().basket_capacity(location, basket_size)?;
        Ok(CapacityLimit::from_record(
            record.map(|capacity| capacity.max_capacity.map(Decimal::from)),
        ))
    }

    /// Highest number of `basket_size` baskets in use at `location` from `reference_date` to the horizon.
    ///
    /// # Errors
    /// A failing source.
    pub fn highest_future_usage(
        &self,
        cache: &mut DecisionCache,
        basket_size: &BasketSizeName,
        location: &PickupLocationId,
        reference_date: NaiveDate,
    ) -> CapacityResult<Decimal> {
        let scope = Scope::PickupLocation(location.clone());
        let measure = Measure::Basket(basket_size.clone());
        let horizon = capacity_change_horizon(&self.projector, cache, &scope)?;
        let projector = self.projector;
        highest_future_usage(cache, &scope, &measure, reference_date, horizon, |cache, date| {
            usage_at(&projector, cache, &scope, &measure, date)
        })
    }

    /// One verdict per configured basket size for the order lines of `product_types`.
    ///
    /// Sizes with unlimited capacity are reported without scanning.
    ///
    /// # Errors
    /// Unknown products or a failing source.
    pub fn evaluate_group(
        &self,
        product_types: &BTreeSet<ProductTypeId>,
        location: &PickupLocationId,
        ctx: &OrderContext<'_>,
        cache: &mut DecisionCache,
    ) -> CapacityResult<Vec<CapacityVerdict>> {
        let scope = Scope::PickupLocation(location.clone());
        let source = self.projector.source();
        let mut verdicts = Vec::with_capacity(self.basket_sizes.len());
        for basket_size in self.basket_sizes {
            let measure = Measure::Basket(basket_size.clone());
            let capacity = self.available_capacity(basket_size, location)?;
            if capacity == CapacityLimit::Unlimited {
                debug!(%basket_size, %location, "unlimited basket capacity, check skipped");
                verdicts.push(CapacityVerdict::unlimited(measure, product_types.clone()));
                continue;
            }

            let highest_usage = self.highest_future_usage(cache, basket_size, location, ctx.start_date)?;
            let member_usage = match ctx.member {
                Some(member) => member_footprint(
                    &self.projector,
                    cache,
                    &scope,
                    &measure,
                    member,
                    ctx.start_date,
                    Some(product_types),
                )?,
                None => Decimal::ZERO,
            };
            let demand = order_demand(source, cache, &measure, ctx.order, ctx.start_date, Some(product_types))?;
            let reserved = if ctx.check_waiting_list {
                waiting_list_reservation(source, cache, &scope, &measure, ctx.start_date, ctx.member)?
            } else {
                Decimal::ZERO
            };

            let verdict = CapacityVerdict {
                measure,
                product_types: product_types.clone(),
                capacity,
                highest_usage,
                member_usage,
                demand,
                reserved,
            };
            debug!(
                %basket_size,
                %location,
                highest = %verdict.highest_usage,
                member = %verdict.member_usage,
                demand = %verdict.demand,
                reserved = %verdict.reserved,
                passes = verdict.passes(),
                "basket capacity evaluated"
            );
            verdicts.push(verdict);
        }
        Ok(verdicts)
    }

    /// Whether the order lines of `product_types` fit every basket size at `location`.
    ///
    /// # Errors
    /// See [`Self::evaluate_group`].
    pub fn check_group(
        &self,
        product_types: &BTreeSet<ProductTypeId>,
        location: &PickupLocationId,
        ctx: &OrderContext<'_>,
        cache: &mut DecisionCache,
    ) -> CapacityResult<bool> {
        Ok(self
            .evaluate_group(product_types, location, ctx, cache)?
            .iter()
            .all(CapacityVerdict::passes))
    }

    /// Whether the order lines of `product_type` fit every basket size at `location`.
    ///
    /// # Errors
    /// See [`Self::evaluate_group`].
    pub fn check(
        &self,
        product_type: &ProductTypeId,
        location: &PickupLocationId,
        ctx: &OrderContext<'_>,
        cache: &mut DecisionCache,
    ) -> CapacityResult<bool> {
        self.check_group(&BTreeSet::from([product_type.clone()]), location, ctx, cache)
    }
}
