//! Task model: identity, classification, state and progress.

use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::core::signal::Signal;
use crate::core::TaskError;

/// Task identifier, unique within one [`IdAllocator`].
pub type TaskId = u64;

/// Number of priority levels.
pub const PRIORITY_LEVELS: usize = 4;

/// Hands out monotonically increasing task IDs.
///
/// Injected into task construction; share one allocator (usually
/// [`Scheduler::id_allocator`](crate::core::Scheduler::id_allocator)) between
/// everything that creates tasks for the same scheduler.
#[derive(Debug, Default)]
pub struct IdAllocator {
    next: AtomicU64,
}

impl IdAllocator {
    /// Allocator whose first ID is 0.
    pub const fn new() -> Self {
        Self::starting_at(0)
    }

    /// Allocator whose first ID is `first`.
    pub const fn starting_at(first: TaskId) -> Self {
        Self {
            next: AtomicU64::new(first),
        }
    }

    /// Allocate the next ID.
    pub fn next_id(&self) -> TaskId {
        self.next.fetch_add(1, Ordering::Relaxed)
    }

    /// ID the next call to [`IdAllocator::next_id`] would return.
    pub fn peek_next(&self) -> TaskId {
        self.next.load(Ordering::Relaxed)
    }
}

/// Task type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    /// Raises an event-release at its checkpoint and keeps running.
    Basic,
    /// Yields to the waiting queue at its checkpoint.
    Extended,
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Basic => f.write_str("basic"),
            Self::Extended => f.write_str("extended"),
        }
    }
}

impl FromStr for TaskKind {
    type Err = TaskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "basic" => Ok(Self::Basic),
            "extended" => Ok(Self::Extended),
            other => Err(TaskError::InvalidType(other.to_string())),
        }
    }
}

/// Priority level, `P3` highest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Priority {
    /// Lowest.
    P0 = 0,
    /// Low.
    P1 = 1,
    /// High.
    P2 = 2,
    /// Highest.
    P3 = 3,
}

impl Priority {
    /// All levels from highest to lowest, the dispatch scan order.
    pub const DESCENDING: [Self; PRIORITY_LEVELS] = [Self::P3, Self::P2, Self::P1, Self::P0];

    /// Queue index for this level.
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Level for a queue index, if in range.
    pub const fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Self::P0),
            1 => Some(Self::P1),
            2 => Some(Self::P2),
            3 => Some(Self::P3),
            _ => None,
        }
    }
}

impl TryFrom<i64> for Priority {
    type Error = TaskError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        usize::try_from(value)
            .ok()
            .and_then(Self::from_index)
            .ok_or(TaskError::InvalidPriority(value))
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P{}", self.index())
    }
}

/// Task state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskState {
    /// Submitted, or finished; not competing for the processor.
    Suspended,
    /// In a ready queue.
    Ready,
    /// The current task.
    Running,
    /// Parked in a waiting queue until an event releases it.
    Waiting,
}

impl TaskState {
    /// Whether `self -> next` is an edge of the state machine.
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Suspended | Self::Waiting, Self::Ready)
                | (Self::Ready, Self::Running)
                | (Self::Running, Self::Ready | Self::Waiting | Self::Suspended)
        )
    }
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Suspended => "suspended",
            Self::Ready => "ready",
            Self::Running => "running",
            Self::Waiting => "waiting",
        };
        f.write_str(name)
    }
}

impl FromStr for TaskState {
    type Err = TaskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "suspended" => Ok(Self::Suspended),
            "ready" => Ok(Self::Ready),
            "running" => Ok(Self::Running),
            "waiting" => Ok(Self::Waiting),
            other => Err(TaskError::InvalidState(other.to_string())),
        }
    }
}

/// Independent copy of a task's observable fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskSnapshot {
    /// Task identifier.
    pub id: TaskId,
    /// Task type.
    pub kind: TaskKind,
    /// Priority level.
    pub priority: Priority,
    /// State at capture time.
    pub state: TaskState,
    /// Progress at capture time.
    pub progress: u32,
}

/// A schedulable task.
///
/// Deliberately not `Clone`: a task lives in exactly one place at a time and
/// moves between queues. Use [`Task::snapshot`] for copies.
#[derive(Debug)]
pub struct Task {
    id: TaskId,
    kind: TaskKind,
    priority: Priority,
    state: TaskState,
    /// Shared with the runner while the task executes.
    progress: Arc<AtomicU32>,
    wait_request: Signal,
    event_release: Signal,
}

impl Task {
    /// Create a task, allocating its ID from `ids`.
    pub fn new(ids: &IdAllocator, kind: TaskKind, priority: Priority, state: TaskState) -> Self {
        Self {
            id: ids.next_id(),
            kind,
            priority,
            state,
            progress: Arc::new(AtomicU32::new(0)),
            wait_request: Signal::new(),
            event_release: Signal::new(),
        }
    }

    /// Create a task from unvalidated field values.
    ///
    /// Fields are checked in the order priority, state, type; the first bad
    /// field is reported. On failure no ID is allocated.
    pub fn from_raw(
        ids: &IdAllocator,
        kind: &str,
        priority: i64,
        state: &str,
    ) -> Result<Self, TaskError> {
        let priority = Priority::try_from(priority)?;
        let state = state.parse::<TaskState>()?;
        let kind = kind.parse::<TaskKind>()?;
        Ok(Self::new(ids, kind, priority, state))
    }

    /// Task identifier.
    pub const fn id(&self) -> TaskId {
        self.id
    }

    /// Task type.
    pub const fn kind(&self) -> TaskKind {
        self.kind
    }

    /// Priority level.
    pub const fn priority(&self) -> Priority {
        self.priority
    }

    /// Current state.
    pub const fn state(&self) -> TaskState {
        self.state
    }

    /// Steps completed so far.
    pub fn progress(&self) -> u32 {
        self.progress.load(Ordering::Acquire)
    }

    /// Wait-request signal (one-shot per task lifetime).
    pub const fn wait_request(&self) -> &Signal {
        &self.wait_request
    }

    /// Event-release signal.
    pub const fn event_release(&self) -> &Signal {
        &self.event_release
    }

    /// Independent copy of the observable fields.
    pub fn snapshot(&self) -> TaskSnapshot {
        TaskSnapshot {
            id: self.id,
            kind: self.kind,
            priority: self.priority,
            state: self.state,
            progress: self.progress(),
        }
    }

    pub(crate) fn set_state(&mut self, state: TaskState) {
        self.state = state;
    }

    pub(crate) fn progress_handle(&self) -> Arc<AtomicU32> {
        Arc::clone(&self.progress)
    }
}
