//! Decision-scoped memoisation.
//!
//! A [`DecisionCache`] is created by the caller for one admission decision and
//! threaded by `&mut` through every component. It is never shared between
//! decisions: nothing in it is invalidated, so reusing it after the snapshot
//! changes would answer from stale data.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::model::{MemberPickupLocation, Product, ProductPrice, Subscription, WaitingListEntry};
use super::usage::{Measure, Scope};
use crate::config::EngineConfig;
use crate::util::ids::{BasketSizeName, MemberId, PickupLocationId, ProductId};

/// Key of one memoised usage evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UsageKey {
    /// Sampled date.
    pub date: NaiveDate,
    /// Members counted.
    pub scope: Scope,
    /// Unit of measurement.
    pub measure: Measure,
}

/// Key of one memoised forward scan.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ScanKey {
    /// Members counted.
    pub scope: Scope,
    /// Unit of measurement.
    pub measure: Measure,
    /// First sampled date.
    pub reference_date: NaiveDate,
}

/// Work counters, mainly for asserting short-circuits in tests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Forward scans started (cache misses on [`ScanKey`]).
    pub scans: u64,
    /// Usage functions evaluated (cache misses on [`UsageKey`]).
    pub usage_evaluations: u64,
    /// Commitment projections computed.
    pub projections: u64,
}

/// Typed memoisation context for a single admission decision.
#[derive(Debug, Default)]
pub struct DecisionCache {
    pub(crate) config: Option<Arc<EngineConfig>>,
    pub(crate) products: HashMap<ProductId, Product>,
    pub(crate) prices: HashMap<ProductId, Arc<[ProductPrice]>>,
    pub(crate) equivalences: HashMap<ProductId, Arc<HashMap<BasketSizeName, u32>>>,
    pub(crate) assignments: Option<Arc<[MemberPickupLocation]>>,
    pub(crate) member_locations: HashMap<NaiveDate, Arc<HashMap<MemberId, PickupLocationId>>>,
    pub(crate) projections: HashMap<(NaiveDate, Scope), Arc<[Subscription]>>,
    pub(crate) usage: HashMap<UsageKey, Decimal>,
    pub(crate) horizons: HashMap<Scope, Option<NaiveDate>>,
    pub(crate) latest_subscription_end: Option<Option<NaiveDate>>,
    pub(crate) highest_usage: HashMap<ScanKey, Decimal>,
    pub(crate) waiting_list: Option<Arc<[WaitingListEntry]>>,
    pub(crate) stats: CacheStats,
}

impl DecisionCache {
    /// Create an empty cache for a new decision.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Counters accumulated so far.
    #[must_use]
    pub const fn stats(&self) -> CacheStats {
        self.stats
    }

    /// Memoised usage for a key, if it was evaluated during this decision.
    #[must_use]
    pub fn usage(&self, key: &UsageKey) -> Option<Decimal> {
        self.usage.get(key).copied()
    }
}
