//! Tests for tokio spawner and API helpers

use prometheus_preemptive_scheduler::config::SchedulerConfig;
use prometheus_preemptive_scheduler::core::{Scheduler, Spawn, TaskError};
use prometheus_preemptive_scheduler::runtime::api::{status, submit_batch_json};
use prometheus_preemptive_scheduler::runtime::{submit_descriptor, TaskDescriptor, TokioSpawner};

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_tokio_spawner_spawn() {
    let spawner = TokioSpawner::new(tokio::runtime::Handle::current());

    let (tx, rx) = tokio::sync::oneshot::channel();
    spawner.spawn(async move {
        tx.send(123).unwrap();
    });

    let result = rx.await.expect("oneshot result");
    assert_eq!(result, 123);
}

#[tokio::test]
async fn test_submit_descriptor_validates_fields() {
    let scheduler = Scheduler::new(SchedulerConfig::default(), TokioSpawner::current()).unwrap();

    let ok = TaskDescriptor {
        kind: "extended".to_string(),
        priority: 3,
        state: "running".to_string(),
    };
    let id = submit_descriptor(&scheduler, &ok).unwrap();
    assert_eq!(id, 0);

    let bad_priority = TaskDescriptor {
        priority: 4,
        ..ok.clone()
    };
    assert_eq!(
        submit_descriptor(&scheduler, &bad_priority),
        Err(TaskError::InvalidPriority(4))
    );

    // priority is checked before state and type
    let bad_all = TaskDescriptor {
        kind: "urgent".to_string(),
        priority: -1,
        state: "bogus".to_string(),
    };
    assert_eq!(
        submit_descriptor(&scheduler, &bad_all),
        Err(TaskError::InvalidPriority(-1))
    );

    let bad_kind = TaskDescriptor {
        kind: "urgent".to_string(),
        ..ok
    };
    assert_eq!(
        submit_descriptor(&scheduler, &bad_kind),
        Err(TaskError::InvalidType("urgent".to_string()))
    );

    // rejected descriptors do not consume IDs
    assert_eq!(scheduler.id_allocator().peek_next(), 1);
    assert_eq!(status(&scheduler).counts.suspended, 1);
}

#[tokio::test]
async fn test_submit_batch_json() {
    let scheduler = Scheduler::new(SchedulerConfig::default(), TokioSpawner::current()).unwrap();
    let ids = submit_batch_json(
        &scheduler,
        r#"[{"kind": "basic", "priority": 0}, {"kind": "extended", "priority": 2}]"#,
    )
    .unwrap();
    assert_eq!(ids, vec![0, 1]);

    let err = submit_batch_json(&scheduler, r#"[{"kind": "basic", "priority": 9}]"#).unwrap_err();
    assert_eq!(err, "invalid task priority: 9");
}

#[tokio::test]
async fn test_status_serializes_flat() {
    let scheduler = Scheduler::new(SchedulerConfig::default(), TokioSpawner::current()).unwrap();
    let value = serde_json::to_value(status(&scheduler)).unwrap();
    assert_eq!(value["drained"], false);
    assert_eq!(value["ready"], 0);
    assert!(value["running"].is_null());
    assert_eq!(value["run_id"], scheduler.run_id().to_string());
}
