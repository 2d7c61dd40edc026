//! Tests for error types

use prometheus_preemptive_scheduler::core::{AuditViolation, SchedulerError, TaskError, TaskState};

#[test]
fn test_invalid_config_error() {
    let err = SchedulerError::InvalidConfig("ready_capacity must be greater than 0".to_string());
    assert_eq!(
        format!("{}", err),
        "invalid configuration: ready_capacity must be greater than 0"
    );
}

#[test]
fn test_not_drained_error() {
    let err = SchedulerError::NotDrained;
    assert_eq!(
        format!("{}", err),
        "audit trail unavailable until the scheduler drains"
    );
}

#[test]
fn test_task_error_names_field() {
    assert_eq!(
        TaskError::InvalidType("urgent".to_string()).to_string(),
        "invalid task type: urgent"
    );
    assert_eq!(TaskError::InvalidPriority(7).to_string(), "invalid task priority: 7");
    assert_eq!(
        TaskError::InvalidState("done".to_string()).to_string(),
        "invalid task state: done"
    );
}

#[test]
fn test_audit_violation_display() {
    let err = AuditViolation::IllegalTransition {
        task_id: 4,
        from: TaskState::Suspended,
        to: TaskState::Running,
    };
    assert_eq!(err.to_string(), "illegal transition for task 4: suspended -> running");

    let err = AuditViolation::Misplaced {
        seq: 12,
        task_id: 2,
        expected: "head",
    };
    assert_eq!(
        err.to_string(),
        "snapshot 12: task 2 is not at the head of its ready queue"
    );
}

#[test]
fn test_scheduler_error_into_anyhow() {
    let result: prometheus_preemptive_scheduler::core::AppResult<()> =
        Err(SchedulerError::AlreadyStarted.into());
    assert_eq!(result.unwrap_err().to_string(), "scheduler already started");
}
