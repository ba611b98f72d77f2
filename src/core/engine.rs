//! General capacity checker.
//!
//! Resolves the configured policy of every product type in an order once per
//! decision, then hands share-policy product types to [`ShareModeChecker`] one
//! by one and all basket-policy product types together to [`BasketModeChecker`].

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use chrono::NaiveDate;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::audit::{AuditEvent, AuditSink};
use super::basket::BasketModeChecker;
use super::cache::DecisionCache;
use super::error::{CapacityError, CapacityResult};
use super::global::GlobalCapacityChecker;
use super::order::{partition_by_product_type, OrderContext};
use super::projector::CommitmentProjector;
use super::share::ShareModeChecker;
use super::source::{CommitmentSource, PeriodLookup};
use super::usage::CapacityVerdict;
use crate::config::{CapacityPolicy, ConfigSource, EngineConfig};
use crate::util::ids::{MemberId, PickupLocationId, ProductTypeId};

/// Every verdict computed for one pickup location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationReport {
    /// Location checked.
    pub pickup_location: PickupLocationId,
    /// One verdict per share-policy product type and per basket size.
    pub verdicts: Vec<CapacityVerdict>,
}

impl LocationReport {
    /// Whether every verdict passes.
    #[must_use]
    pub fn admitted(&self) -> bool {
        self.verdicts.iter().all(CapacityVerdict::passes)
    }

    /// Product types covered by at least one failing verdict.
    #[must_use]
    pub fn failing_product_types(&self) -> BTreeSet<ProductTypeId> {
        self.verdicts
            .iter()
            .filter(|verdict| !verdict.passes())
            .flat_map(|verdict| verdict.product_types.iter().cloned())
            .collect()
    }
}

/// Capacity admission engine over a data source, a period calendar and a configuration source.
pub struct CapacityEngine<S, P, C> {
    source: S,
    periods: P,
    config: C,
    audit: Option<Arc<Mutex<Box<dyn AuditSink>>>>,
}

impl<S, P, C> CapacityEngine<S, P, C>
where
    S: CommitmentSource,
    P: PeriodLookup,
    C: ConfigSource,
{
    /// Create an engine from its collaborators.
    pub const fn new(source: S, periods: P, config: C) -> Self {
        Self {
            source,
            periods,
            config,
            audit: None,
        }
    }

    /// Attach an audit sink.
    #[must_use]
    pub fn with_audit(mut self, audit: Box<dyn AuditSink>) -> Self {
        self.audit = Some(Arc::new(Mutex::new(audit)));
        self
    }

    /// Data source.
    pub const fn source(&self) -> &S {
        &self.source
    }

    /// Growing-period calendar.
    pub const fn periods(&self) -> &P {
        &self.periods
    }

    /// Forward an event to the audit sink, if one is attached.
    pub fn record(&self, event: AuditEvent) {
        if let Some(audit) = &self.audit {
            audit.lock().record(event);
        }
    }

    /// Configuration for this decision, loaded and validated on first use.
    ///
    /// # Errors
    /// [`CapacityError::InvalidConfig`] or whatever the configuration source reports.
    pub fn config(&self, cache: &mut DecisionCache) -> CapacityResult<Arc<EngineConfig>> {
        if let Some(hit) = &cache.config {
            return Ok(Arc::clone(hit));
        }
        let loaded = self.config.load()?;
        loaded.validate().map_err(CapacityError::InvalidConfig)?;
        let loaded = Arc::new(loaded);
        cache.config = Some(Arc::clone(&loaded));
        Ok(loaded)
    }

    fn projector(&self, cfg: &EngineConfig) -> CommitmentProjector<'_, S, P> {
        CommitmentProjector::new(&self.source, &self.periods, cfg.auto_renewal)
    }

    /// Location serving `member` at `date`.
    ///
    /// # Errors
    /// A failing source or configuration.
    pub fn location_of_member(
        &self,
        member: &MemberId,
        date: NaiveDate,
        cache: &mut DecisionCache,
    ) -> CapacityResult<Option<PickupLocationId>> {
        let cfg = self.config(cache)?;
        self.projector(&cfg).location_of(cache, member, date)
    }

    /// Evaluate every capacity the order touches at `location`.
    ///
    /// # Errors
    /// Unknown products, missing sizes, invalid configuration, or a failing source.
    pub fn evaluate_pickup_location(
        &self,
        location: &PickupLocationId,
        ctx: &OrderContext<'_>,
        cache: &mut DecisionCache,
    ) -> CapacityResult<LocationReport> {
        let cfg = self.config(cache)?;
        let projector = self.projector(&cfg);

        let mut share_types = BTreeSet::new();
        let mut basket_types = BTreeSet::new();
        for product_type in partition_by_product_type(&self.source, cache, ctx.order)?.into_keys() {
            match cfg.policy_for(&product_type) {
                CapacityPolicy::Share => share_types.insert(product_type),
                CapacityPolicy::Basket => basket_types.insert(product_type),
            };
        }

        let mut verdicts = Vec::new();
        let share = ShareModeChecker::new(projector);
        for product_type in &share_types {
            verdicts.push(share.evaluate(product_type, location, ctx, cache)?);
        }
        if !basket_types.is_empty() {
            let basket = BasketModeChecker::new(projector, &cfg.basket_sizes);
            verdicts.extend(basket.evaluate_group(&basket_types, location, ctx, cache)?);
        }

        let report = LocationReport {
            pickup_location: location.clone(),
            verdicts,
        };
        if report.admitted() {
            debug!(%location, start_date = %ctx.start_date, "order fits pickup location");
        } else {
            info!(
                %location,
                start_date = %ctx.start_date,
                failing = ?report.failing_product_types(),
                "order exceeds pickup location capacity"
            );
        }
        Ok(report)
    }

    /// Whether the order fits at `location`.
    ///
    /// # Errors
    /// See [`Self::evaluate_pickup_location`].
    pub fn check_pickup_location_capacity(
        &self,
        location: &PickupLocationId,
        ctx: &OrderContext<'_>,
        cache: &mut DecisionCache,
    ) -> CapacityResult<bool> {
        Ok(self.evaluate_pickup_location(location, ctx, cache)?.admitted())
    }

    /// Evaluate every product type of the order against its global ceiling.
    ///
    /// # Errors
    /// Unknown products, missing sizes, invalid configuration, or a failing source.
    pub fn evaluate_global(
        &self,
        ctx: &OrderContext<'_>,
        cache: &mut DecisionCache,
    ) -> CapacityResult<BTreeMap<ProductTypeId, CapacityVerdict>> {
        let cfg = self.config(cache)?;
        GlobalCapacityChecker::new(self.projector(&cfg)).evaluate(ctx, cache)
    }

    /// Product types of the order that exceed their global ceiling.
    ///
    /// # Errors
    /// See [`Self::evaluate_global`].
    pub fn product_types_without_enough_capacity(
        &self,
        ctx: &OrderContext<'_>,
        cache: &mut DecisionCache,
    ) -> CapacityResult<BTreeSet<ProductTypeId>> {
        let failing: BTreeSet<ProductTypeId> = self
            .evaluate_global(ctx, cache)?
            .into_iter()
            .filter(|(_, verdict)| !verdict.passes())
            .map(|(product_type, _)| product_type)
            .collect();
        if !failing.is_empty() {
            info!(start_date = %ctx.start_date, ?failing, "order exceeds global capacity");
        }
        Ok(failing)
    }
}
