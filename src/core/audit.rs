//! Audit log and sink implementations.
//!
//! Every scheduler transition produces an [`AuditSnapshot`]: a deep copy of the
//! current task and of every queue, taken inside the same critical section as
//! the transition itself. The [`AuditLog`] keeps all of them and is the record
//! published once the scheduler drains; [`AuditSink`]s are optional observers
//! that see each snapshot as it is taken.

use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;

use serde::{Deserialize, Serialize};

use crate::core::task::{Priority, TaskId, TaskSnapshot, TaskState};

/// The state change a snapshot was taken for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transition {
    /// Task that moved.
    pub task_id: TaskId,
    /// Previous state, `None` on submission.
    pub from: Option<TaskState>,
    /// New state.
    pub to: TaskState,
}

impl Transition {
    /// Build a transition.
    pub const fn new(task_id: TaskId, from: Option<TaskState>, to: TaskState) -> Self {
        Self { task_id, from, to }
    }
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.from {
            Some(from) => write!(f, "task {from} -> {} | ID={}", self.to, self.task_id),
            None => write!(f, "task -> {} | ID={}", self.to, self.task_id),
        }
    }
}

/// Immutable record of the whole scheduler state after one transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditSnapshot {
    /// Order in which the snapshot was taken.
    pub seq: u64,
    /// Human-readable transition label, e.g. `task ready -> running | ID=3`.
    pub label: String,
    /// Structured form of the label.
    pub transition: Transition,
    /// Running task, if any.
    pub current: Option<TaskSnapshot>,
    /// Ready queues indexed by priority, head first.
    pub ready: Vec<Vec<TaskSnapshot>>,
    /// Waiting queues indexed by priority, head first.
    pub waiting: Vec<Vec<TaskSnapshot>>,
    /// Suspended queue, head first.
    pub suspended: Vec<TaskSnapshot>,
    /// Capture time, milliseconds since the Unix epoch.
    pub timestamp_ms: u128,
}

impl AuditSnapshot {
    /// Total tasks across the ready queues.
    pub fn ready_count(&self) -> usize {
        self.ready.iter().map(Vec::len).sum()
    }

    /// Ready queue for one level.
    pub fn ready_level(&self, priority: Priority) -> &[TaskSnapshot] {
        self.ready
            .get(priority.index())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Every task in the snapshot: current first, then suspended, ready and
    /// waiting queues.
    pub fn tasks(&self) -> impl Iterator<Item = &TaskSnapshot> {
        self.current
            .iter()
            .chain(self.suspended.iter())
            .chain(self.ready.iter().flatten())
            .chain(self.waiting.iter().flatten())
    }

    /// Locate a task anywhere in the snapshot.
    pub fn find(&self, id: TaskId) -> Option<&TaskSnapshot> {
        self.tasks().find(|t| t.id == id)
    }
}

/// Append-only store of snapshots.
#[derive(Debug, Default)]
pub struct AuditLog {
    snapshots: Vec<AuditSnapshot>,
    next_seq: u64,
    finalized: bool,
}

impl AuditLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve the sequence number for the next snapshot.
    pub fn next_seq(&mut self) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        seq
    }

    /// Append a snapshot. A finalized log is read-only: the snapshot is
    /// dropped and `false` returned.
    pub fn append(&mut self, snapshot: AuditSnapshot) -> bool {
        if self.finalized {
            tracing::debug!(seq = snapshot.seq, "audit log finalized, snapshot not kept");
            return false;
        }
        self.snapshots.push(snapshot);
        true
    }

    /// Stable sort by timestamp, ties by sequence number.
    pub fn finalize(&mut self) {
        self.snapshots.sort_by_key(|s| (s.timestamp_ms, s.seq));
        self.finalized = true;
    }

    /// Whether [`AuditLog::finalize`] has run.
    pub const fn is_finalized(&self) -> bool {
        self.finalized
    }

    /// Recorded snapshots.
    pub fn snapshots(&self) -> &[AuditSnapshot] {
        &self.snapshots
    }

    /// Number of snapshots.
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// True when nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Serialize the trail as a JSON array.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.snapshots)
    }
}

/// Observer notified of every snapshot as it is taken.
///
/// Called while the scheduler state lock is held, so implementations must not
/// block.
pub trait AuditSink: Send {
    /// Record a snapshot.
    fn record(&mut self, snapshot: &AuditSnapshot);
}

/// Shared sinks, so a caller can keep a handle and read what was recorded.
impl<T: AuditSink> AuditSink for Arc<Mutex<T>> {
    fn record(&mut self, snapshot: &AuditSnapshot) {
        self.lock().record(snapshot);
    }
}

/// In-memory sink keeping the most recent snapshots.
pub struct InMemoryAuditSink {
    snapshots: VecDeque<AuditSnapshot>,
    max_snapshots: usize,
}

impl InMemoryAuditSink {
    /// Create a new in-memory sink with a bounded buffer.
    pub fn new(max_snapshots: usize) -> Self {
        Self {
            snapshots: VecDeque::with_capacity(max_snapshots.min(1024)),
            max_snapshots,
        }
    }

    /// Retrieve a copy of stored snapshots, oldest first.
    pub fn snapshots(&self) -> Vec<AuditSnapshot> {
        self.snapshots.iter().cloned().collect()
    }
}

impl AuditSink for InMemoryAuditSink {
    fn record(&mut self, snapshot: &AuditSnapshot) {
        if self.max_snapshots == 0 {
            return;
        }
        if self.snapshots.len() >= self.max_snapshots {
            self.snapshots.pop_front();
        }
        self.snapshots.push_back(snapshot.clone());
    }
}

/// Sink that logs each snapshot at debug level.
#[derive(Debug, Default)]
pub struct TracingAuditSink;

impl AuditSink for TracingAuditSink {
    fn record(&mut self, snapshot: &AuditSnapshot) {
        let ids = |queue: &[TaskSnapshot]| queue.iter().map(|t| t.id).collect::<Vec<_>>();
        tracing::debug!(
            seq = snapshot.seq,
            current = ?snapshot.current.as_ref().map(|t| t.id),
            suspended = ?ids(&snapshot.suspended),
            ready = ?snapshot.ready.iter().map(|q| ids(q)).collect::<Vec<_>>(),
            waiting = ?snapshot.waiting.iter().map(|q| ids(q)).collect::<Vec<_>>(),
            "{}",
            snapshot.label
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::task::TaskKind;

    fn task(id: TaskId, priority: Priority, state: TaskState) -> TaskSnapshot {
        TaskSnapshot {
            id,
            kind: TaskKind::Basic,
            priority,
            state,
            progress: 0,
        }
    }

    fn snapshot(seq: u64, timestamp_ms: u128) -> AuditSnapshot {
        let transition = Transition::new(seq, None, TaskState::Suspended);
        AuditSnapshot {
            seq,
            label: transition.to_string(),
            transition,
            current: None,
            ready: vec![Vec::new(); 4],
            waiting: vec![Vec::new(); 4],
            suspended: vec![task(seq, Priority::P0, TaskState::Suspended)],
            timestamp_ms,
        }
    }

    #[test]
    fn test_transition_labels() {
        let submit = Transition::new(7, None, TaskState::Suspended);
        assert_eq!(submit.to_string(), "task -> suspended | ID=7");

        let run = Transition::new(3, Some(TaskState::Ready), TaskState::Running);
        assert_eq!(run.to_string(), "task ready -> running | ID=3");
    }

    #[test]
    fn test_finalize_is_stable_sort() {
        let mut log = AuditLog::new();
        log.append(snapshot(0, 20));
        log.append(snapshot(1, 10));
        log.append(snapshot(2, 20));
        log.append(snapshot(3, 10));
        assert!(!log.is_finalized());

        log.finalize();
        let order: Vec<u64> = log.snapshots().iter().map(|s| s.seq).collect();
        assert_eq!(order, vec![1, 3, 0, 2]);
        assert!(log.is_finalized());
    }

    #[test]
    fn test_finalize_breaks_timestamp_ties_by_seq() {
        let mut log = AuditLog::new();
        log.append(snapshot(2, 10));
        log.append(snapshot(1, 10));
        log.append(snapshot(0, 5));

        log.finalize();
        let order: Vec<u64> = log.snapshots().iter().map(|s| s.seq).collect();
        assert_eq!(order, vec![0, 1, 2]);
    }

    #[test]
    fn test_finalized_log_rejects_appends() {
        let mut log = AuditLog::new();
        assert!(log.append(snapshot(0, 1)));
        log.finalize();

        assert!(!log.append(snapshot(1, 2)));
        assert_eq!(log.len(), 1);
        assert_eq!(log.snapshots()[0].seq, 0);
    }

    #[test]
    fn test_find_and_counts() {
        let mut snap = snapshot(0, 1);
        snap.current = Some(task(9, Priority::P1, TaskState::Running));
        snap.ready[Priority::P2.index()].push(task(4, Priority::P2, TaskState::Ready));
        snap.waiting[Priority::P0.index()].push(task(5, Priority::P0, TaskState::Waiting));

        assert_eq!(snap.ready_count(), 1);
        assert_eq!(snap.ready_level(Priority::P2)[0].id, 4);
        assert_eq!(snap.find(9).unwrap().state, TaskState::Running);
        assert_eq!(snap.find(5).unwrap().state, TaskState::Waiting);
        assert!(snap.find(42).is_none());
        assert_eq!(snap.tasks().count(), 4);
    }

    #[test]
    fn test_in_memory_sink_overflow() {
        let mut sink = InMemoryAuditSink::new(2);
        sink.record(&snapshot(0, 1));
        sink.record(&snapshot(1, 2));
        sink.record(&snapshot(2, 3));

        let kept = sink.snapshots();
        assert_eq!(kept.len(), 2);
        assert_eq!(kept[0].seq, 1);
        assert_eq!(kept[1].seq, 2);
    }

    #[test]
    fn test_shared_sink_records_through_handle() {
        let shared = Arc::new(Mutex::new(InMemoryAuditSink::new(8)));
        let mut boxed: Box<dyn AuditSink> = Box::new(Arc::clone(&shared));
        boxed.record(&snapshot(0, 1));
        assert_eq!(shared.lock().snapshots().len(), 1);
    }

    #[test]
    fn test_seq_and_json_export() {
        let mut log = AuditLog::new();
        assert_eq!(log.next_seq(), 0);
        assert_eq!(log.next_seq(), 1);
        log.append(snapshot(0, 5));

        let json = log.to_json().unwrap();
        let parsed: Vec<AuditSnapshot> = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, log.snapshots());
    }
}
