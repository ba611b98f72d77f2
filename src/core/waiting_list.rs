//! Waiting-list reservations.
//!
//! Unconfirmed wishes are not subscriptions yet, but admitting an order should
//! not take the space people queued for. Entries are not date-scoped: they stay
//! pending until a collaborator converts or removes them.

use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::cache::DecisionCache;
use super::error::CapacityResult;
use super::model::WaitingListEntry;
use super::source::CommitmentSource;
use super::usage::{accumulate, contribution, Measure, Scope};
use crate::util::ids::MemberId;

fn entries<S>(source: &S, cache: &mut DecisionCache) -> CapacityResult<Arc<[WaitingListEntry]>>
where
    S: CommitmentSource + ?Sized,
{
    if let Some(hit) = &cache.waiting_list {
        return Ok(Arc::clone(hit));
    }
    let loaded: Arc<[WaitingListEntry]> = source.waiting_list_entries()?.into();
    cache.waiting_list = Some(Arc::clone(&loaded));
    Ok(loaded)
}

/// Capacity reserved by pending waiting-list wishes under `measure`.
///
/// For a location scope only entries whose first-choice location is that
/// location count; the global scope counts every entry. The acting member's own
/// entry is skipped, since their order is what would convert it. Sizes are
/// resolved as of `date`.
///
/// # Errors
/// Unknown wished products, a missing size, or a failing source.
pub fn waiting_list_reservation<S>(
    source: &S,
    cache: &mut DecisionCache,
    scope: &Scope,
    measure: &Measure,
    date: NaiveDate,
    acting_member: Option<&MemberId>,
) -> CapacityResult<Decimal>
where
    S: CommitmentSource + ?Sized,
{
    let pending = entries(source, cache)?;
    let mut reserved = Decimal::ZERO;
    for entry in pending.iter() {
        if acting_member.is_some() && entry.member.as_ref() == acting_member {
            continue;
        }
        let relevant = match scope {
            Scope::PickupLocation(location) => entry.top_pickup_location() == Some(location),
            Scope::Global => true,
        };
        if !relevant {
            continue;
        }
        for wish in &entry.product_wishes {
            let amount = contribution(source, cache, measure, &wish.product, wish.quantity, date)?;
            reserved = accumulate(reserved, amount, &wish.product)?;
        }
    }
    Ok(reserved)
}
