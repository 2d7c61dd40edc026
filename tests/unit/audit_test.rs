//! Tests for audit snapshots and sinks

use prometheus_preemptive_scheduler::core::{
    AuditSink, AuditSnapshot, InMemoryAuditSink, Priority, TaskKind, TaskSnapshot, TaskState,
    Transition,
};

fn snapshot(seq: u64, transition: Transition) -> AuditSnapshot {
    AuditSnapshot {
        seq,
        label: transition.to_string(),
        transition,
        current: None,
        ready: vec![Vec::new(); 4],
        waiting: vec![Vec::new(); 4],
        suspended: Vec::new(),
        timestamp_ms: 1,
    }
}

#[test]
fn test_in_memory_audit_sink() {
    let mut sink = InMemoryAuditSink::new(10);
    let submit = Transition::new(1, None, TaskState::Suspended);

    sink.record(&snapshot(0, submit));
    let snapshots = sink.snapshots();
    assert_eq!(snapshots.len(), 1);
    assert_eq!(snapshots[0].label, "task -> suspended | ID=1");
    assert_eq!(snapshots[0].transition, submit);
}

#[test]
fn test_audit_sink_overflow() {
    let mut sink = InMemoryAuditSink::new(2);
    for seq in 0..3 {
        sink.record(&snapshot(seq, Transition::new(seq, None, TaskState::Suspended)));
    }

    let snapshots = sink.snapshots();
    assert_eq!(snapshots.len(), 2);
    assert_eq!(snapshots[0].seq, 1); // First one popped
    assert_eq!(snapshots[1].seq, 2);
}

#[test]
fn test_zero_capacity_sink_keeps_nothing() {
    let mut sink = InMemoryAuditSink::new(0);
    sink.record(&snapshot(0, Transition::new(0, None, TaskState::Suspended)));
    assert!(sink.snapshots().is_empty());
}

#[test]
fn test_snapshot_json_shape() {
    let mut snap = snapshot(3, Transition::new(2, Some(TaskState::Ready), TaskState::Running));
    snap.current = Some(TaskSnapshot {
        id: 2,
        kind: TaskKind::Extended,
        priority: Priority::P2,
        state: TaskState::Running,
        progress: 1,
    });

    let value = serde_json::to_value(&snap).unwrap();
    assert_eq!(value["label"], "task ready -> running | ID=2");
    assert_eq!(value["current"]["kind"], "extended");
    assert_eq!(value["current"]["state"], "running");
    assert_eq!(value["transition"]["from"], "ready");
}
