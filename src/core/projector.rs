//! Temporal commitment projection.
//!
//! Answers "which subscriptions occupy capacity on date D", including the ones
//! that do not exist yet but will under auto-renewal.

use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::NaiveDate;
use tracing::debug;

use super::cache::DecisionCache;
use super::catalog::product_type_of;
use super::error::CapacityResult;
use super::model::{MemberPickupLocation, Subscription};
use super::source::{CommitmentSource, PeriodLookup};
use super::usage::Scope;
use crate::util::ids::{MemberId, PickupLocationId, ProductTypeId};

/// Computes the subscriptions that count as using capacity at a date.
pub struct CommitmentProjector<'a, S: ?Sized, P: ?Sized> {
    source: &'a S,
    periods: &'a P,
    auto_renewal: bool,
}

impl<S: ?Sized, P: ?Sized> Clone for CommitmentProjector<'_, S, P> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<S: ?Sized, P: ?Sized> Copy for CommitmentProjector<'_, S, P> {}

impl<'a, S, P> CommitmentProjector<'a, S, P>
where
    S: CommitmentSource + ?Sized,
    P: PeriodLookup + ?Sized,
{
    /// Create a projector; `auto_renewal` is the organisation-wide renewal flag.
    pub const fn new(source: &'a S, periods: &'a P, auto_renewal: bool) -> Self {
        Self {
            source,
            periods,
            auto_renewal,
        }
    }

    /// Data source the projector reads from.
    pub const fn source(&self) -> &'a S {
        self.source
    }

    /// Whether renewals are projected.
    pub const fn auto_renewal(&self) -> bool {
        self.auto_renewal
    }

    /// Every location assignment, loaded once per decision.
    pub(crate) fn assignments(&self, cache: &mut DecisionCache) -> CapacityResult<Arc<[MemberPickupLocation]>> {
        if let Some(hit) = &cache.assignments {
            return Ok(Arc::clone(hit));
        }
        let loaded: Arc<[MemberPickupLocation]> = self.source.member_pickup_locations()?.into();
        cache.assignments = Some(Arc::clone(&loaded));
        Ok(loaded)
    }

    /// Location of every assigned member at `date`: the latest record with `valid_from <= date`.
    ///
    /// # Errors
    /// A failing source.
    pub fn members_at(
        &self,
        cache: &mut DecisionCache,
        date: NaiveDate,
    ) -> CapacityResult<Arc<HashMap<MemberId, PickupLocationId>>> {
        if let Some(hit) = cache.member_locations.get(&date) {
            return Ok(Arc::clone(hit));
        }
        let assignments = self.assignments(cache)?;
        let mut latest: HashMap<&MemberId, &MemberPickupLocation> = HashMap::new();
        for assignment in assignments.iter().filter(|a| a.valid_from <= date) {
            match latest.entry(&assignment.member) {
                Entry::Occupied(mut current) => {
                    if current.get().valid_from <= assignment.valid_from {
                        current.insert(assignment);
                    }
                }
                Entry::Vacant(slot) => {
                    slot.insert(assignment);
                }
            }
        }
        let resolved: HashMap<MemberId, PickupLocationId> = latest
            .into_iter()
            .map(|(member, assignment)| (member.clone(), assignment.pickup_location.clone()))
            .collect();
        let resolved = Arc::new(resolved);
        cache.member_locations.insert(date, Arc::clone(&resolved));
        Ok(resolved)
    }

    /// Location serving `member` at `date`, if any.
    ///
    /// # Errors
    /// A failing source.
    pub fn location_of(
        &self,
        cache: &mut DecisionCache,
        member: &MemberId,
        date: NaiveDate,
    ) -> CapacityResult<Option<PickupLocationId>> {
        Ok(self.members_at(cache, date)?.get(member).cloned())
    }

    /// Subscriptions using capacity in `scope` at `date`.
    ///
    /// Direct subscriptions are those active at `date`. With auto-renewal on,
    /// subscriptions active on the last day of the preceding growing period are
    /// added when they were never cancelled and their member has nothing of the
    /// same product type in the current period.
    ///
    /// # Errors
    /// Unknown products referenced by subscriptions, or a failing source.
    pub fn project(&self, cache: &mut DecisionCache, date: NaiveDate, scope: &Scope) -> CapacityResult<Arc<[Subscription]>> {
        let key = (date, scope.clone());
        if let Some(hit) = cache.projections.get(&key) {
            return Ok(Arc::clone(hit));
        }
        cache.stats.projections += 1;

        let assigned = match scope {
            Scope::PickupLocation(_) => Some(self.members_at(cache, date)?),
            Scope::Global => None,
        };
        let in_scope = |member: &MemberId| match (scope, assigned.as_deref()) {
            (Scope::PickupLocation(location), Some(assigned)) => assigned.get(member) == Some(location),
            _ => true,
        };

        let mut projected: Vec<Subscription> = self
            .source
            .subscriptions_overlapping(date, date)?
            .into_iter()
            .filter(|sub| sub.is_active_at(date) && in_scope(&sub.member))
            .collect();
        if self.auto_renewal {
            projected.extend(self.renewals(cache, date, &in_scope)?);
        }

        let projected: Arc<[Subscription]> = projected.into();
        cache.projections.insert(key, Arc::clone(&projected));
        Ok(projected)
    }

    /// Subscriptions of `product_type` using capacity in `scope` at `date`.
    ///
    /// # Errors
    /// See [`Self::project`].
    pub fn project_product_type(
        &self,
        cache: &mut DecisionCache,
        date: NaiveDate,
        scope: &Scope,
        product_type: &ProductTypeId,
    ) -> CapacityResult<Vec<Subscription>> {
        let projected = self.project(cache, date, scope)?;
        let mut matching = Vec::new();
        for subscription in projected.iter() {
            if product_type_of(self.source, cache, &subscription.product)? == *product_type {
                matching.push(subscription.clone());
            }
        }
        Ok(matching)
    }

    fn renewals(
        &self,
        cache: &mut DecisionCache,
        date: NaiveDate,
        in_scope: &dyn Fn(&MemberId) -> bool,
    ) -> CapacityResult<Vec<Subscription>> {
        let Some(period) = self.periods.period_containing(date)? else {
            debug!(%date, "no growing period, renewal projection skipped");
            return Ok(Vec::new());
        };
        let Some(previous) = self.periods.period_before(&period)? else {
            debug!(%date, period = %period.id, "no preceding growing period, renewal projection skipped");
            return Ok(Vec::new());
        };

        // Anything overlapping the current period, cancelled or not, means the
        // member already decided for this product type.
        let mut committed: HashSet<(MemberId, ProductTypeId)> = HashSet::new();
        for subscription in self
            .source
            .subscriptions_overlapping(period.start_date, period.end_date)?
        {
            let product_type = product_type_of(self.source, cache, &subscription.product)?;
            committed.insert((subscription.member, product_type));
        }

        let last_day = previous.end_date;
        let mut renewals = Vec::new();
        for subscription in self.source.subscriptions_overlapping(last_day, last_day)? {
            if !subscription.is_active_at(last_day)
                || subscription.cancellation_ts.is_some()
                || !in_scope(&subscription.member)
            {
                continue;
            }
            let product_type = product_type_of(self.source, cache, &subscription.product)?;
            if !committed.contains(&(subscription.member.clone(), product_type)) {
                renewals.push(subscription);
            }
        }
        debug!(%date, renewals = renewals.len(), "projected auto-renewals");
        Ok(renewals)
    }
}
