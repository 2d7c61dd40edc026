//! API-facing request models.

use serde::{Deserialize, Serialize};

use crate::core::{Scheduler, SchedulerStatus, Task, TaskError, TaskId};

/// Task submission payload with unvalidated field values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskDescriptor {
    /// `basic` or `extended`.
    pub kind: String,
    /// Priority level, `0..=3`.
    pub priority: i64,
    /// Initial state; overwritten with `suspended` on submission.
    #[serde(default = "default_state")]
    pub state: String,
}

fn default_state() -> String {
    "suspended".to_string()
}

/// Validate a descriptor into a task and submit it.
pub fn submit_descriptor<S>(
    scheduler: &Scheduler<S>,
    desc: &TaskDescriptor,
) -> Result<TaskId, TaskError> {
    let ids = scheduler.id_allocator();
    let task = Task::from_raw(&ids, &desc.kind, desc.priority, &desc.state)?;
    Ok(scheduler.submit(task))
}

/// Parse a JSON array of descriptors and submit each one. Stops at the first
/// invalid descriptor; tasks before it stay submitted.
pub fn submit_batch_json<S>(
    scheduler: &Scheduler<S>,
    input: &str,
) -> Result<Vec<TaskId>, String> {
    let descs: Vec<TaskDescriptor> =
        serde_json::from_str(input).map_err(|e| format!("parse error: {e}"))?;
    descs
        .iter()
        .map(|desc| submit_descriptor(scheduler, desc).map_err(|e| e.to_string()))
        .collect()
}

/// Status payload for a scheduler.
pub fn status<S>(scheduler: &Scheduler<S>) -> SchedulerStatus {
    scheduler.status()
}
