//! Highest-future-usage scan.
//!
//! Deliveries and commitment changes fall on week boundaries, so usage is
//! constant within a week and sampling every seven days from the reference date
//! finds the worst moment without walking every day.

use chrono::{Days, NaiveDate};
use rust_decimal::Decimal;
use tracing::debug;

use super::cache::{DecisionCache, ScanKey, UsageKey};
use super::error::CapacityResult;
use super::usage::{Measure, Scope};

/// Distance between two sampled dates.
pub const SCAN_INTERVAL_DAYS: u64 = 7;

/// Dates sampled between `reference_date` and `horizon`.
///
/// Always yields `reference_date`, then every seventh day after it while the
/// date is on or before `horizon`.
pub fn sample_dates(reference_date: NaiveDate, horizon: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    std::iter::successors(Some(reference_date), |date| {
        date.checked_add_days(Days::new(SCAN_INTERVAL_DAYS))
    })
    .enumerate()
    .take_while(move |(index, date)| *index == 0 || *date <= horizon)
    .map(|(_, date)| date)
}

/// Maximum of `usage_at` over the sampled dates.
///
/// Each `usage_at(date)` result is memoised in `cache` under
/// `(date, scope, measure)`, and the maximum itself under
/// `(scope, measure, reference_date)`. Without a horizon usage is zero and
/// nothing is sampled. The first error aborts the scan.
///
/// # Errors
/// Whatever `usage_at` returns.
pub fn highest_future_usage<F>(
    cache: &mut DecisionCache,
    scope: &Scope,
    measure: &Measure,
    reference_date: NaiveDate,
    horizon: Option<NaiveDate>,
    mut usage_at: F,
) -> CapacityResult<Decimal>
where
    F: FnMut(&mut DecisionCache, NaiveDate) -> CapacityResult<Decimal>,
{
    let scan_key = ScanKey {
        scope: scope.clone(),
        measure: measure.clone(),
        reference_date,
    };
    if let Some(hit) = cache.highest_usage.get(&scan_key) {
        return Ok(*hit);
    }
    cache.stats.scans += 1;

    let Some(horizon) = horizon else {
        cache.highest_usage.insert(scan_key, Decimal::ZERO);
        return Ok(Decimal::ZERO);
    };

    let mut highest = Decimal::ZERO;
    let mut samples = 0_usize;
    for date in sample_dates(reference_date, horizon) {
        let key = UsageKey {
            date,
            scope: scope.clone(),
            measure: measure.clone(),
        };
        let usage = if let Some(hit) = cache.usage.get(&key) {
            *hit
        } else {
            cache.stats.usage_evaluations += 1;
            let evaluated = usage_at(cache, date)?;
            cache.usage.insert(key, evaluated);
            evaluated
        };
        highest = highest.max(usage);
        samples += 1;
    }

    debug!(%reference_date, %horizon, %measure, samples, %highest, "scanned future usage");
    cache.highest_usage.insert(scan_key, highest);
    Ok(highest)
}
