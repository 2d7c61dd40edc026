//! Checks over a finalized audit trail.
//!
//! Each function walks the trail in order and reports the first violation it
//! finds. [`verify_trail`] runs all of them.

use std::collections::{HashMap, HashSet};

use crate::core::audit::AuditSnapshot;
use crate::core::error::AuditViolation;
use crate::core::task::{TaskId, TaskState};

/// A task's first appearance is in the suspended queue, as Suspended.
pub fn check_initial_suspended(trail: &[AuditSnapshot]) -> Result<(), AuditViolation> {
    let mut seen = HashSet::new();
    for snapshot in trail {
        for task in &snapshot.suspended {
            if seen.insert(task.id) && task.state != TaskState::Suspended {
                return Err(AuditViolation::FirstSeenOutsideSuspended {
                    task_id: task.id,
                    state: task.state,
                });
            }
        }
        let elsewhere = snapshot
            .current
            .iter()
            .chain(snapshot.ready.iter().flatten())
            .chain(snapshot.waiting.iter().flatten());
        for task in elsewhere {
            if seen.insert(task.id) {
                return Err(AuditViolation::FirstSeenOutsideSuspended {
                    task_id: task.id,
                    state: task.state,
                });
            }
        }
    }
    Ok(())
}

/// Every recorded transition, and every change of a task's observed state
/// between snapshots, is an edge of the state machine.
pub fn check_transitions(trail: &[AuditSnapshot]) -> Result<(), AuditViolation> {
    let mut last: HashMap<TaskId, TaskState> = HashMap::new();
    for snapshot in trail {
        let t = snapshot.transition;
        if let Some(from) = t.from {
            if !from.can_transition_to(t.to) {
                return Err(AuditViolation::IllegalTransition {
                    task_id: t.task_id,
                    from,
                    to: t.to,
                });
            }
        }

        for task in snapshot.tasks() {
            match last.insert(task.id, task.state) {
                Some(prev) if prev != task.state && !prev.can_transition_to(task.state) => {
                    return Err(AuditViolation::IllegalTransition {
                        task_id: task.id,
                        from: prev,
                        to: task.state,
                    });
                }
                _ => {}
            }
        }
    }
    Ok(())
}

/// At most one task is Running in any snapshot.
pub fn check_single_running(trail: &[AuditSnapshot]) -> Result<(), AuditViolation> {
    for snapshot in trail {
        let count = snapshot
            .tasks()
            .filter(|t| t.state == TaskState::Running)
            .count();
        if count > 1 {
            return Err(AuditViolation::MultipleRunning {
                seq: snapshot.seq,
                count,
            });
        }
    }
    Ok(())
}

/// No task ID appears twice within one snapshot.
pub fn check_no_duplicates(trail: &[AuditSnapshot]) -> Result<(), AuditViolation> {
    for snapshot in trail {
        let mut ids = HashSet::new();
        if let Some(task) = snapshot.tasks().find(|t| !ids.insert(t.id)) {
            return Err(AuditViolation::DuplicateTask {
                seq: snapshot.seq,
                task_id: task.id,
            });
        }
    }
    Ok(())
}

/// The ready queues never hold more than `capacity` tasks.
pub fn check_ready_capacity(
    trail: &[AuditSnapshot],
    capacity: usize,
) -> Result<(), AuditViolation> {
    for snapshot in trail {
        let count = snapshot.ready_count();
        if count > capacity {
            return Err(AuditViolation::ReadyCapacityExceeded {
                seq: snapshot.seq,
                count,
                capacity,
            });
        }
    }
    Ok(())
}

/// Resumed and preempted tasks land at the head of their ready queue, admitted
/// tasks at the tail.
pub fn check_positions(trail: &[AuditSnapshot]) -> Result<(), AuditViolation> {
    for snapshot in trail {
        let t = snapshot.transition;
        if t.to != TaskState::Ready {
            continue;
        }
        let expected = match t.from {
            Some(TaskState::Waiting | TaskState::Running) => "head",
            Some(TaskState::Suspended) => "tail",
            _ => continue,
        };
        let misplaced = || AuditViolation::Misplaced {
            seq: snapshot.seq,
            task_id: t.task_id,
            expected,
        };

        let task = snapshot.find(t.task_id).ok_or_else(misplaced)?;
        let level = snapshot.ready_level(task.priority);
        let slot = if expected == "head" {
            level.first()
        } else {
            level.last()
        };
        if slot.map(|s| s.id) != Some(t.task_id) {
            return Err(misplaced());
        }
    }
    Ok(())
}

/// Task IDs in the order they were dispatched.
pub fn run_order(trail: &[AuditSnapshot]) -> Vec<TaskId> {
    trail
        .iter()
        .map(|s| s.transition)
        .filter(|t| t.to == TaskState::Running)
        .map(|t| t.task_id)
        .collect()
}

/// Run every check against `trail`.
pub fn verify_trail(trail: &[AuditSnapshot], ready_capacity: usize) -> Result<(), AuditViolation> {
    check_initial_suspended(trail)?;
    check_transitions(trail)?;
    check_single_running(trail)?;
    check_no_duplicates(trail)?;
    check_ready_capacity(trail, ready_capacity)?;
    check_positions(trail)
}
