//! Share-mode capacity policy.
//!
//! Usage is a continuous quantity: `size × quantity` summed per product type,
//! compared against the location's capability for that product type.

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
use crate::util::ids::{PickupLocationId, ProductTypeId};

/// Checks one product type at one pickup location in share units.
pub struct ShareModeChecker<'a, S: ?Sized, P: ?Sized> {
    projector: CommitmentProjector<'a, S, P>,
}

impl<'a, S, P> ShareModeChecker<'a, S, P>
where
    S: CommitmentSource + ?Sized,
    P: PeriodLookup + ?Sized,
{
    /// Create a checker over a projector.
    pub const fn new(projector: CommitmentProjector<'a, S, P>) -> Self {
        Self { projector }
    }

    /// Configured capacity of `location` for `product_type`.
    ///
    /// # Errors
    /// A failing source.
    pub fn available_capacity(
        &self,
        product_type: &ProductTypeId,
        location: &PickupLocationId,
    ) -> CapacityResult<CapacityLimit> {
        let record = self
            .projector
            .source()
            .product_type_capability(location, product_type)?;
        Ok(CapacityLimit::from_record(record.map(|capability| capability.max_capacity)))
    }

    /// Highest share usage of `product_type` at `location` from `reference_date` to the horizon.
    ///
    /// # Errors
    /// A missing size for a subscribed product, or a failing source.
    pub fn highest_future_usage(
        &self,
        cache: &mut DecisionCache,
        product_type: &ProductTypeId,
        location: &PickupLocationId,
        reference_date: NaiveDate,
    ) -> CapacityResult<Decimal> {
        let scope = Scope::PickupLocation(location.clone());
        let measure = Measure::Share(product_type.clone());
        let horizon = capacity_change_horizon(&self.projector, cache, &scope)?;
        let projector = self.projector;
        highest_future_usage(cache, &scope, &measure, reference_date, horizon, |cache, date| {
            usage_at(&projector, cache, &scope, &measure, date)
        })
    }

    /// Full breakdown of the check for `product_type` at `location`.
    ///
    /// Unlimited capacity short-circuits: nothing is scanned or measured.
    ///
    /// # Errors
    /// A missing size, an unknown product, or a failing source.
    pub fn evaluate(
        &self,
        product_type: &ProductTypeId,
        location: &PickupLocationId,
        ctx: &OrderContext<'_>,
        cache: &mut DecisionCache,
    ) -> CapacityResult<CapacityVerdict> {
        let measure = Measure::Share(product_type.clone());
        let product_types = BTreeSet::from([product_type.clone()]);
        let capacity = self.available_capacity(product_type, location)?;
        if capacity == CapacityLimit::Unlimited {
            debug!(%product_type, %location, "unlimited capacity, check skipped");
            return Ok(CapacityVerdict::unlimited(measure, product_types));
        }

        let scope = Scope::PickupLocation(location.clone());
        let source = self.projector.source();
        let highest_usage = self.highest_future_usage(cache, product_type, location, ctx.start_date)?;
        let member_usage = match ctx.member {
            Some(member) => member_footprint(
                &self.projector,
                cache,
                &scope,
                &measure,
                member,
                ctx.start_date,
                None,
            )?,
            None => Decimal::ZERO,
        };
        let demand = order_demand(source, cache, &measure, ctx.order, ctx.start_date, None)?;
        let reserved = if ctx.check_waiting_list {
            waiting_list_reservation(source, cache, &scope, &measure, ctx.start_date, ctx.member)?
        } else {
            Decimal::ZERO
        };

        let verdict = CapacityVerdict {
            measure,
            product_types,
            capacity,
            highest_usage,
            member_usage,
            demand,
            reserved,
        };
        debug!(
            %product_type,
            %location,
            highest = %verdict.highest_usage,
            member = %verdict.member_usage,
            demand = %verdict.demand,
            reserved = %verdict.reserved,
            passes = verdict.passes(),
            "share capacity evaluated"
        );
        Ok(verdict)
    }

    /// Whether the order fits `product_type` at `location`.
    ///
    /// # Errors
    /// See [`Self::evaluate`].
    pub fn check(
        &self,
        product_type: &ProductTypeId,
        location: &PickupLocationId,
        ctx: &OrderContext<'_>,
        cache: &mut DecisionCache,
    ) -> CapacityResult<bool> {
        Ok(self.evaluate(product_type, location, ctx, cache)?.passes())
    }
}
