//! Decision audit trail.
//!
//! Records the outcome of each admission decision for later inspection. The
//! sink is written after a decision is taken and never influences it.

use std::collections::{BTreeSet, VecDeque};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::util::clock::now;
use crate::util::ids::{MemberId, PickupLocationId, ProductTypeId};

/// Outcome recorded for a decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    /// The order fits everywhere.
    Admitted,
    /// At least one capacity would be exceeded.
    Rejected,
    /// The decision could not be taken.
    Failed,
}

/// Audit event structure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEvent {
    /// Event identifier.
    pub event_id: String,
    /// Member placing the order, if known.
    pub member: Option<MemberId>,
    /// Location checked, if any.
    pub pickup_location: Option<PickupLocationId>,
    /// Outcome.
    pub action: AuditAction,
    /// Product types reported as lacking capacity.
    pub failing_product_types: BTreeSet<ProductTypeId>,
    /// When the decision was taken.
    pub created_at: DateTime<Utc>,
    /// Additional context.
    pub payload: Option<String>,
}

/// Audit sink abstraction.
pub trait AuditSink: Send {
    /// Record an audit event.
    fn record(&mut self, event: AuditEvent);
}

/// In-memory audit sink for testing and dev.
pub struct InMemoryAuditSink {
    events: VecDeque<AuditEvent>,
    max_events: usize,
}

impl InMemoryAuditSink {
    /// Create a new in-memory sink keeping at most `max_events` events.
    #[must_use]
    pub fn new(max_events: usize) -> Self {
        Self {
            events: VecDeque::with_capacity(max_events.min(1024)),
            max_events,
        }
    }

    /// Retrieve a snapshot of stored events, oldest first.
    #[must_use]
    pub fn events(&self) -> Vec<AuditEvent> {
        self.events.iter().cloned().collect()
    }
}

impl AuditSink for InMemoryAuditSink {
    fn record(&mut self, event: AuditEvent) {
        if self.max_events == 0 {
            return;
        }
        if self.events.len() >= self.max_events {
            self.events.pop_front();
        }
        self.events.push_back(event);
    }
}

impl<T: AuditSink + ?Sized> AuditSink for Arc<Mutex<T>> {
    fn record(&mut self, event: AuditEvent) {
        self.lock().record(event);
    }
}

/// Helper to build an audit event with a fresh id and timestamp.
#[must_use]
pub fn build_audit_event(
    member: Option<MemberId>,
    pickup_location: Option<PickupLocationId>,
    action: AuditAction,
    failing_product_types: BTreeSet<ProductTypeId>,
    payload: Option<String>,
) -> AuditEvent {
    AuditEvent {
        event_id: uuid::Uuid::new_v4().to_string(),
        member,
        pickup_location,
        action,
        failing_product_types,
        created_at: now(),
        payload,
    }
}
