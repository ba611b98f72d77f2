//! Request/response models for callers and single-request evaluation.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::ConfigSource;
use crate::core::{
    build_audit_event, AuditAction, CandidateOrder, CapacityEngine, CapacityResult, CommitmentSource,
    DecisionCache, LocationReport, OrderContext, PeriodLookup,
};
use crate::util::ids::{MemberId, PickupLocationId, ProductTypeId};

/// An order to admit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdmissionRequest {
    /// Products and quantities.
    pub order: CandidateOrder,
    /// Location to check; defaults to the member's location at the start date.
    #[serde(default)]
    pub pickup_location: Option<PickupLocationId>,
    /// Member placing the order; absent for a brand-new signup.
    #[serde(default)]
    pub member: Option<MemberId>,
    /// First day the order would apply.
    pub start_date: NaiveDate,
    /// Whether waiting-list reservations must be respected.
    #[serde(default)]
    pub check_waiting_list: bool,
}

impl AdmissionRequest {
    /// Request for `order` starting at `start_date`, without member or location.
    #[must_use]
    pub const fn new(order: CandidateOrder, start_date: NaiveDate) -> Self {
        Self {
            order,
            pickup_location: None,
            member: None,
            start_date,
            check_waiting_list: false,
        }
    }

    /// Context borrowed by the checkers.
    #[must_use]
    pub fn context(&self) -> OrderContext<'_> {
        OrderContext::new(&self.order, self.start_date)
            .for_member(self.member.as_ref())
            .with_waiting_list(self.check_waiting_list)
    }
}

/// Outcome of one admission request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdmissionDecision {
    /// Whether the order fits everywhere it was checked.
    pub admitted: bool,
    /// Location the order was checked against, if one was resolved.
    pub pickup_location: Option<PickupLocationId>,
    /// Per-location breakdown; absent when no location was resolved.
    pub location_report: Option<LocationReport>,
    /// Product types lacking capacity at the location or globally.
    pub failing_product_types: BTreeSet<ProductTypeId>,
}

/// Evaluate one request with a fresh decision cache.
///
/// The location check runs first when a location is known, then the global
/// check. An attached audit sink receives the outcome, failures included.
///
/// # Errors
/// Whatever the engine reports; the decision is not taken.
pub fn evaluate_request<S, P, C>(
    engine: &CapacityEngine<S, P, C>,
    request: &AdmissionRequest,
) -> CapacityResult<AdmissionDecision>
where
    S: CommitmentSource,
    P: PeriodLookup,
    C: ConfigSource,
{
    let mut cache = DecisionCache::new();
    match decide(engine, request, &mut cache) {
        Ok(decision) => {
            let action = if decision.admitted {
                AuditAction::Admitted
            } else {
                AuditAction::Rejected
            };
            engine.record(build_audit_event(
                request.member.clone(),
                decision.pickup_location.clone(),
                action,
                decision.failing_product_types.clone(),
                None,
            ));
            Ok(decision)
        }
        Err(err) => {
            warn!(member = ?request.member, error = %err, "capacity decision failed");
            engine.record(build_audit_event(
                request.member.clone(),
                request.pickup_location.clone(),
                AuditAction::Failed,
                BTreeSet::new(),
                Some(err.to_string()),
            ));
            Err(err)
        }
    }
}

fn decide<S, P, C>(
    engine: &CapacityEngine<S, P, C>,
    request: &AdmissionRequest,
    cache: &mut DecisionCache,
) -> CapacityResult<AdmissionDecision>
where
    S: CommitmentSource,
    P: PeriodLookup,
    C: ConfigSource,
{
    let ctx = request.context();
    let pickup_location = match (&request.pickup_location, &request.member) {
        (Some(location), _) => Some(location.clone()),
        (None, Some(member)) => engine.location_of_member(member, request.start_date, cache)?,
        (None, None) => None,
    };

    let location_report = match &pickup_location {
        Some(location) => Some(engine.evaluate_pickup_location(location, &ctx, cache)?),
        None => {
            info!(member = ?request.member, "no pickup location resolved, location check skipped");
            None
        }
    };

    let mut failing_product_types = engine.product_types_without_enough_capacity(&ctx, cache)?;
    let location_ok = location_report.as_ref().is_none_or(LocationReport::admitted);
    if let Some(report) = &location_report {
        failing_product_types.extend(report.failing_product_types());
    }

    Ok(AdmissionDecision {
        admitted: location_ok && failing_product_types.is_empty(),
        pickup_location,
        location_report,
        failing_product_types,
    })
}
