//! Capacity accounting: domain records, projection, scanning and the checkers.

pub mod audit;
pub mod basket;
pub mod cache;
pub mod catalog;
pub mod engine;
pub mod error;
pub mod global;
pub mod horizon;
pub mod model;
pub mod order;
pub mod projector;
pub mod scanner;
pub mod share;
pub mod source;
pub mod usage;
pub mod waiting_list;

pub use audit::{build_audit_event, AuditAction, AuditEvent, AuditSink, InMemoryAuditSink};
pub use basket::BasketModeChecker;
pub use cache::{CacheStats, DecisionCache, ScanKey, UsageKey};
pub use engine::{CapacityEngine, LocationReport};
pub use error::{AppResult, CapacityError, CapacityResult};
pub use global::GlobalCapacityChecker;
pub use horizon::capacity_change_horizon;
pub use model::{
    BasketCapacity, BasketSizeEquivalence, CandidateOrder, Capability, CapacityLimit, DeliveryCycle,
    GrowingPeriod, MemberPickupLocation, PickupLocation, PickupLocationWish, Product, ProductPrice,
    ProductType, ProductTypeCapacity, ProductWish, Subscription, WaitingListEntry,
};
pub use order::OrderContext;
pub use projector::CommitmentProjector;
pub use scanner::SCAN_INTERVAL_DAYS;
pub use share::ShareModeChecker;
pub use source::{CommitmentSource, PeriodLookup};
pub use usage::{CapacityVerdict, Measure, Scope};
