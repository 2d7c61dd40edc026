//! Ready, waiting and suspended queues owned by the scheduler.

use std::collections::VecDeque;

use crate::core::task::{Priority, Task, TaskSnapshot};
use crate::infra::queue::{Prioritized, PriorityQueues};

impl Prioritized for Task {
    fn priority(&self) -> Priority {
        Self::priority(self)
    }
}

/// Four ready queues, four waiting queues and the suspended FIFO.
#[derive(Default)]
pub(crate) struct QueueSet {
    pub(crate) ready: PriorityQueues<Task>,
    pub(crate) waiting: PriorityQueues<Task>,
    pub(crate) suspended: VecDeque<Task>,
}

impl QueueSet {
    pub(crate) fn ready_snapshot(&self) -> Vec<Vec<TaskSnapshot>> {
        levels_snapshot(&self.ready)
    }

    pub(crate) fn waiting_snapshot(&self) -> Vec<Vec<TaskSnapshot>> {
        levels_snapshot(&self.waiting)
    }

    pub(crate) fn suspended_snapshot(&self) -> Vec<TaskSnapshot> {
        self.suspended.iter().map(Task::snapshot).collect()
    }
}

fn levels_snapshot(queues: &PriorityQueues<Task>) -> Vec<Vec<TaskSnapshot>> {
    queues
        .levels()
        .iter()
        .map(|level| level.iter().map(Task::snapshot).collect())
        .collect()
}
