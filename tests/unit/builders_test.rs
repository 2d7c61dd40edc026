//! Tests for builder modules

use std::sync::Arc;

use parking_lot::Mutex;
use prometheus_preemptive_scheduler::builders::{build_scheduler, SchedulerBuilder};
use prometheus_preemptive_scheduler::config::SchedulerConfig;
use prometheus_preemptive_scheduler::core::{
    InMemoryAuditSink, Priority, SchedulerError, Task, TaskKind, TaskState,
};
use prometheus_preemptive_scheduler::runtime::TokioSpawner;

#[tokio::test]
async fn test_builder_rejects_invalid_config() {
    let cfg = SchedulerConfig {
        admission_limit: 5,
        ..SchedulerConfig::default()
    };
    let result = build_scheduler(&cfg, TokioSpawner::current());
    assert!(matches!(result, Err(SchedulerError::InvalidConfig(_))));
}

#[tokio::test]
async fn test_builder_attaches_audit_sink() {
    let sink = Arc::new(Mutex::new(InMemoryAuditSink::new(16)));
    let scheduler = SchedulerBuilder::new(SchedulerConfig::default())
        .with_audit_sink(Box::new(Arc::clone(&sink)))
        .build(TokioSpawner::current())
        .unwrap();

    let ids = scheduler.id_allocator();
    let id = scheduler.submit(Task::new(&ids, TaskKind::Basic, Priority::P1, TaskState::Ready));

    let seen = sink.lock().snapshots();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].label, format!("task -> suspended | ID={id}"));
    assert_eq!(seen[0].suspended[0].state, TaskState::Suspended);
}

#[tokio::test]
async fn test_builder_keeps_config() {
    let cfg = SchedulerConfig {
        step_quantum_ms: 10,
        ..SchedulerConfig::default()
    };
    let scheduler = build_scheduler(&cfg, TokioSpawner::current()).unwrap();
    assert_eq!(scheduler.config(), &cfg);
    assert!(!scheduler.is_drained());
}
