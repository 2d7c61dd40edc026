//! In-memory priority-indexed FIFO queues.

use std::collections::VecDeque;

use crate::core::task::{Priority, PRIORITY_LEVELS};

/// Items that know which priority level they belong to.
pub trait Prioritized {
    /// Priority level used to pick the queue.
    fn priority(&self) -> Priority;
}

/// One FIFO per priority level.
///
/// Pops scan from `P3` down to `P0` and take the head of the first non-empty
/// level, so ordering is strict across levels and FIFO within a level. Items
/// pushed with [`PriorityQueues::push_front`] jump ahead of their level.
pub struct PriorityQueues<T> {
    levels: [VecDeque<T>; PRIORITY_LEVELS],
}

impl<T> Default for PriorityQueues<T> {
    fn default() -> Self {
        Self {
            levels: std::array::from_fn(|_| VecDeque::new()),
        }
    }
}

impl<T> PriorityQueues<T> {
    /// Create empty queues.
    pub fn new() -> Self {
        Self::default()
    }

    /// Total items across all levels.
    pub fn len(&self) -> usize {
        self.levels.iter().map(VecDeque::len).sum()
    }

    /// True when every level is empty.
    pub fn is_empty(&self) -> bool {
        self.levels.iter().all(VecDeque::is_empty)
    }

    /// Queue for one level, head first.
    pub fn level(&self, priority: Priority) -> &VecDeque<T> {
        &self.levels[priority.index()]
    }

    /// Levels indexed by priority (`[0]` is `P0`).
    pub fn levels(&self) -> &[VecDeque<T>; PRIORITY_LEVELS] {
        &self.levels
    }

    /// Remove the head of the highest non-empty level.
    pub fn pop_highest(&mut self) -> Option<T> {
        Priority::DESCENDING
            .iter()
            .find_map(|p| self.levels[p.index()].pop_front())
    }

    /// Iterate over all items, highest level first.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        Priority::DESCENDING
            .into_iter()
            .flat_map(move |p| self.levels[p.index()].iter())
    }
}

impl<T: Prioritized> PriorityQueues<T> {
    /// Append to the tail of the item's level.
    pub fn push_back(&mut self, item: T) {
        self.levels[item.priority().index()].push_back(item);
    }

    /// Insert at the head of the item's level.
    pub fn push_front(&mut self, item: T) {
        self.levels[item.priority().index()].push_front(item);
    }
}
