//! Tests for audit sink

use std::collections::BTreeSet;

use coop_capacity::core::{build_audit_event, AuditAction, AuditSink, InMemoryAuditSink};

#[test]
fn test_in_memory_audit_sink() {
    let mut sink = InMemoryAuditSink::new(10);
    let event = build_audit_event(
        Some("m1".into()),
        Some("north".into()),
        AuditAction::Rejected,
        BTreeSet::from(["veg".into()]),
        Some("payload".to_string()),
    );

    sink.record(event.clone());
    let events = sink.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0], event);
    assert_eq!(events[0].action, AuditAction::Rejected);
}

#[test]
fn test_audit_sink_overflow() {
    let mut sink = InMemoryAuditSink::new(2);
    for member in ["m1", "m2", "m3"] {
        sink.record(build_audit_event(
            Some(member.into()),
            None,
            AuditAction::Admitted,
            BTreeSet::new(),
            None,
        ));
    }

    let events = sink.events();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].member.as_ref().map(|m| m.as_str()), Some("m2"));
    assert_eq!(events[1].member.as_ref().map(|m| m.as_str()), Some("m3"));
}

#[test]
fn test_zero_capacity_sink_keeps_nothing() {
    let mut sink = InMemoryAuditSink::new(0);
    sink.record(build_audit_event(None, None, AuditAction::Failed, BTreeSet::new(), None));
    assert!(sink.events().is_empty());
}

#[test]
fn test_audit_event_serializes_action_in_snake_case() {
    let event = build_audit_event(None, None, AuditAction::Admitted, BTreeSet::new(), None);
    let json = serde_json::to_value(&event).unwrap();
    assert_eq!(json["action"], "admitted");
}
