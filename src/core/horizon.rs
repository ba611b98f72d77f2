//! Capacity-change horizon.
//!
//! The horizon is the last date at which usage could still move. A location's
//! horizon considers the latest end date of every subscription, not only those
//! of one product type.

use chrono::NaiveDate;

use super::cache::DecisionCache;
use super::error::CapacityResult;
use super::projector::CommitmentProjector;
use super::source::{CommitmentSource, PeriodLookup};
use super::usage::Scope;

/// Latest date at which usage in `scope` can still change.
///
/// `max(latest assignment valid_from in scope, latest subscription end_date)`;
/// `None` when neither exists, meaning usage is permanently zero.
///
/// # Errors
/// A failing source.
pub fn capacity_change_horizon<S, P>(
    projector: &CommitmentProjector<'_, S, P>,
    cache: &mut DecisionCache,
    scope: &Scope,
) -> CapacityResult<Option<NaiveDate>>
where
    S: CommitmentSource + ?Sized,
    P: PeriodLookup + ?Sized,
{
    if let Some(hit) = cache.horizons.get(scope) {
        return Ok(*hit);
    }

    let assignments = projector.assignments(cache)?;
    let latest_assignment = assignments
        .iter()
        .filter(|assignment| match scope {
            Scope::PickupLocation(location) => assignment.pickup_location == *location,
            Scope::Global => true,
        })
        .map(|assignment| assignment.valid_from)
        .max();

    let latest_end = match cache.latest_subscription_end {
        Some(hit) => hit,
        None => {
            let loaded = projector.source().latest_subscription_end()?;
            cache.latest_subscription_end = Some(loaded);
            loaded
        }
    };

    let horizon = latest_assignment.max(latest_end);
    cache.horizons.insert(scope.clone(), horizon);
    Ok(horizon)
}
