//! Organisation-wide capacity ceiling.
//!
//! Same admission arithmetic as the share policy, but counting every member
//! regardless of pickup location and comparing against the product type's
//! ceiling for the growing period of the start date.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::debug;

use super::cache::DecisionCache;
use super::error::CapacityResult;
use super::horizon::capacity_change_horizon;
use super::model::CapacityLimit;
use super::order::{partition_by_product_type, OrderContext};
use super::projector::CommitmentProjector;
use super::scanner::highest_future_usage;
use super::source::{CommitmentSource, PeriodLookup};
use super::usage::{member_footprint, order_demand, usage_at, CapacityVerdict, Measure, Scope};
use super::waiting_list::waiting_list_reservation;
use crate::util::ids::ProductTypeId;

/// Checks each product type of an order against its global ceiling.
pub struct GlobalCapacityChecker<'a, S: ?Sized, P: ?Sized> {
    projector: CommitmentProjector<'a, S, P>,
}

impl<'a, S, P> GlobalCapacityChecker<'a, S, P>
where
    S: CommitmentSource + ?Sized,
    P: PeriodLookup + ?Sized,
{
    /// Create a checker over a projector.
    pub const fn new(projector: CommitmentProjector<'a, S, P>) -> Self {
        Self { projector }
    }

    /// Global ceiling of `product_type` for the period containing `date`.
    ///
    /// # Errors
    /// A failing source.
    pub fn available_capacity(&self, product_type: &ProductTypeId, date: NaiveDate) -> CapacityResult<CapacityLimit> {
        let record = self.projector.source().global_capacity(product_type, date)?;
        Ok(CapacityLimit::from_record(record.map(|capacity| capacity.max_capacity)))
    }

    /// Highest organisation-wide share usage of `product_type` from `reference_date` to the horizon.
    ///
    /// # Errors
    /// A missing size for a subscribed product, or a failing source.
    pub fn highest_future_usage(
        &self,
        cache: &mut DecisionCache,
        product_type: &ProductTypeId,
        reference_date: NaiveDate,
    ) -> CapacityResult<Decimal> {
        let scope = Scope::Global;
        let measure = Measure::Share(product_type.clone());
        let horizon = capacity_change_horizon(&self.projector, cache, &scope)?;
        let projector = self.projector;
        highest_future_usage(cache, &scope, &measure, reference_date, horizon, |cache, date| {
            usage_at(&projector, cache, &scope, &measure, date)
        })
    }

    /// Verdict for every product type in the order.
    ///
    /// # Errors
    /// A missing size, an unknown product, or a failing source.
    pub fn evaluate(
        &self,
        ctx: &OrderContext<'_>,
        cache: &mut DecisionCache,
    ) -> CapacityResult<BTreeMap<ProductTypeId, CapacityVerdict>> {
        let source = self.projector.source();
        let partitions = partition_by_product_type(source, cache, ctx.order)?;
        let mut verdicts = BTreeMap::new();
        for (product_type, partition) in &partitions {
            let measure = Measure::Share(product_type.clone());
            let product_types = BTreeSet::from([product_type.clone()]);
            let capacity = self.available_capacity(product_type, ctx.start_date)?;
            if capacity == CapacityLimit::Unlimited {
                verdicts.insert(product_type.clone(), CapacityVerdict::unlimited(measure, product_types));
                continue;
            }

            let highest_usage = self.highest_future_usage(cache, product_type, ctx.start_date)?;
            let member_usage = match ctx.member {
                Some(member) => member_footprint(
                    &self.projector,
                    cache,
                    &Scope::Global,
                    &measure,
                    member,
                    ctx.start_date,
                    None,
                )?,
                None => Decimal::ZERO,
            };
            let demand = order_demand(source, cache, &measure, partition, ctx.start_date, None)?;
            let reserved = if ctx.check_waiting_list {
                waiting_list_reservation(source, cache, &Scope::Global, &measure, ctx.start_date, ctx.member)?
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
            debug!(%product_type, remaining = ?verdict.remaining(), "global capacity evaluated");
            verdicts.insert(product_type.clone(), verdict);
        }
        Ok(verdicts)
    }

    /// Product types of the order that do not fit under their global ceiling.
    ///
    /// # Errors
    /// See [`Self::evaluate`].
    pub fn product_types_without_enough_capacity(
        &self,
        ctx: &OrderContext<'_>,
        cache: &mut DecisionCache,
    ) -> CapacityResult<BTreeSet<ProductTypeId>> {
        Ok(self
            .evaluate(ctx, cache)?
            .into_iter()
            .filter(|(_, verdict)| !verdict.passes())
            .map(|(product_type, _)| product_type)
            .collect())
    }
}
