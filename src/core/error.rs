//! Error types for task construction, scheduler operations and audit checks.

use thiserror::Error;

use crate::core::task::{TaskId, TaskState};

/// Errors produced while constructing a task from raw field values.
///
/// Each field has its own kind so callers can tell which value was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TaskError {
    /// The task type is not one of `basic` / `extended`.
    #[error("invalid task type: {0}")]
    InvalidType(String),
    /// The priority is outside `0..=3`.
    #[error("invalid task priority: {0}")]
    InvalidPriority(i64),
    /// The state is not one of `suspended` / `ready` / `running` / `waiting`.
    #[error("invalid task state: {0}")]
    InvalidState(String),
}

/// Errors produced by scheduler components.
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// Configuration failed validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// `start` was called more than once.
    #[error("scheduler already started")]
    AlreadyStarted,
    /// The audit trail is only published once the scheduler has drained.
    #[error("audit trail unavailable until the scheduler drains")]
    NotDrained,
}

/// A scheduling property that does not hold for an audit trail.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuditViolation {
    /// The task was first seen somewhere other than the suspended queue.
    #[error("task {task_id} first seen as {state} outside the suspended queue")]
    FirstSeenOutsideSuspended {
        /// Offending task.
        task_id: TaskId,
        /// State it was first seen in.
        state: TaskState,
    },
    /// Two consecutive distinct states are not an edge of the state machine.
    #[error("illegal transition for task {task_id}: {from} -> {to}")]
    IllegalTransition {
        /// Offending task.
        task_id: TaskId,
        /// Previous state.
        from: TaskState,
        /// Next state.
        to: TaskState,
    },
    /// More than one task was running in a single snapshot.
    #[error("snapshot {seq} has {count} running tasks")]
    MultipleRunning {
        /// Snapshot sequence number.
        seq: u64,
        /// Number of running tasks seen.
        count: usize,
    },
    /// A task ID appears more than once in a single snapshot.
    #[error("snapshot {seq} contains task {task_id} more than once")]
    DuplicateTask {
        /// Snapshot sequence number.
        seq: u64,
        /// Duplicated task.
        task_id: TaskId,
    },
    /// The ready queues hold more tasks than allowed.
    #[error("snapshot {seq} has {count} ready tasks (capacity {capacity})")]
    ReadyCapacityExceeded {
        /// Snapshot sequence number.
        seq: u64,
        /// Ready tasks seen.
        count: usize,
        /// Configured capacity.
        capacity: usize,
    },
    /// After a transition into Ready the task is not where it should be.
    #[error("snapshot {seq}: task {task_id} is not at the {expected} of its ready queue")]
    Misplaced {
        /// Snapshot sequence number.
        seq: u64,
        /// Offending task.
        task_id: TaskId,
        /// `"head"` or `"tail"`.
        expected: &'static str,
    },
}

/// Application-facing result using anyhow for higher-level contexts.
pub type AppResult<T> = Result<T, anyhow::Error>;
