//! Tests for the task model

use std::collections::HashSet;
use std::sync::Arc;

use prometheus_preemptive_scheduler::core::{
    IdAllocator, Priority, Task, TaskError, TaskKind, TaskState,
};

#[test]
fn test_priority_ordering() {
    assert!(Priority::P3 > Priority::P2);
    assert!(Priority::P2 > Priority::P1);
    assert!(Priority::P1 > Priority::P0);
    assert_eq!(Priority::DESCENDING[0], Priority::P3);
}

#[test]
fn test_from_raw_accepts_valid_fields() {
    let ids = IdAllocator::starting_at(40);
    let task = Task::from_raw(&ids, "basic", 2, "waiting").unwrap();
    assert_eq!(task.id(), 40);
    assert_eq!(task.kind(), TaskKind::Basic);
    assert_eq!(task.priority(), Priority::P2);
    assert_eq!(task.state(), TaskState::Waiting);
    assert_eq!(task.progress(), 0);
}

#[test]
fn test_from_raw_reports_each_field() {
    let ids = IdAllocator::new();
    assert_eq!(
        Task::from_raw(&ids, "extended", 2, "paused").unwrap_err(),
        TaskError::InvalidState("paused".to_string())
    );
    assert_eq!(
        Task::from_raw(&ids, "extended", 5, "paused").unwrap_err(),
        TaskError::InvalidPriority(5)
    );
    assert_eq!(
        Task::from_raw(&ids, "", 1, "ready").unwrap_err(),
        TaskError::InvalidType(String::new())
    );
    assert_eq!(ids.peek_next(), 0);
}

#[test]
fn test_concurrent_ids_are_unique() {
    let ids = Arc::new(IdAllocator::new());
    let handles: Vec<_> = (0..8)
        .map(|_| {
            let ids = Arc::clone(&ids);
            std::thread::spawn(move || {
                (0..250)
                    .map(|_| Task::new(&ids, TaskKind::Basic, Priority::P0, TaskState::Suspended).id())
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    let mut seen = HashSet::new();
    for handle in handles {
        for id in handle.join().unwrap() {
            assert!(seen.insert(id), "duplicate id {id}");
        }
    }
    assert_eq!(seen.len(), 2000);
}
