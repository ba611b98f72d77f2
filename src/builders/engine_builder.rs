//! Build capacity engines from a validated configuration.

use tracing::info;

use crate::config::EngineConfig;
use crate::core::{AuditSink, CapacityEngine, CapacityError, CapacityResult, CommitmentSource, PeriodLookup};

/// Validate `cfg` and assemble an engine over the given collaborators.
///
/// # Errors
/// [`CapacityError::InvalidConfig`] when `cfg` does not validate.
pub fn build_engine<S, P>(
    source: S,
    periods: P,
    cfg: EngineConfig,
    audit: Option<Box<dyn AuditSink>>,
) -> CapacityResult<CapacityEngine<S, P, EngineConfig>>
where
    S: CommitmentSource,
    P: PeriodLookup,
{
    cfg.validate()
        .map_err(|e| CapacityError::InvalidConfig(format!("config invalid: {e}")))?;
    info!(
        default_policy = %cfg.default_policy,
        overrides = cfg.product_type_policies.len(),
        auto_renewal = cfg.auto_renewal,
        basket_sizes = cfg.basket_sizes.len(),
        "capacity engine configured"
    );

    let engine = CapacityEngine::new(source, periods, cfg);
    Ok(match audit {
        Some(sink) => engine.with_audit(sink),
        None => engine,
    })
}
