//! Signaling primitives exchanged between tasks, runners and the control loops.
//!
//! - [`Signal`]: a shared flag moving through `Unset -> Set -> Consumed`, used for
//!   a task's wait-request and event-release.
//! - [`PreemptNotifier`]: best-effort, non-blocking delivery of preemption
//!   requests to the dispatcher.
//! - [`TerminalSignal`]: single-fire, broadcast notification that the scheduler
//!   has drained.

use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::sync::watch;

use crate::core::task::{Priority, TaskId};

/// Lifecycle of a [`Signal`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalState {
    /// Not raised yet.
    #[default]
    Unset,
    /// Raised and waiting to be consumed.
    Set,
    /// Raised and consumed by the scheduler.
    Consumed,
}

/// Shared signal with capacity one.
///
/// Clones observe the same state. Every operation is a compare-and-set on the
/// current state and reports whether it took effect, so raising an already-set
/// signal is a no-op rather than a blocking send.
#[derive(Debug, Clone, Default)]
pub struct Signal {
    state: Arc<Mutex<SignalState>>,
}

impl Signal {
    /// Create an unset signal.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state.
    pub fn state(&self) -> SignalState {
        *self.state.lock()
    }

    /// True while raised but not yet consumed.
    pub fn is_set(&self) -> bool {
        self.state() == SignalState::Set
    }

    /// `Unset -> Set`.
    pub fn raise(&self) -> bool {
        self.transition(SignalState::Unset, SignalState::Set)
    }

    /// `Set -> Consumed`.
    pub fn consume(&self) -> bool {
        self.transition(SignalState::Set, SignalState::Consumed)
    }

    /// `Consumed -> Unset`, so the signal can be raised again.
    pub fn rearm(&self) -> bool {
        self.transition(SignalState::Consumed, SignalState::Unset)
    }

    fn transition(&self, from: SignalState, to: SignalState) -> bool {
        let mut state = self.state.lock();
        if *state == from {
            *state = to;
            true
        } else {
            false
        }
    }
}

/// Request to interrupt the running task in favor of a higher-priority one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PreemptRequest {
    /// Task that was running when the request was made.
    pub target: TaskId,
    /// Task that just became ready.
    pub candidate: TaskId,
    /// Priority of the candidate.
    pub priority: Priority,
}

/// Sending half of the preemption channel.
///
/// The channel holds a single pending request. When it is occupied a new
/// request is dropped and [`PreemptNotifier::try_notify`] returns `false`; the
/// caller may retry on a later event, scheduling is only delayed.
#[derive(Debug, Clone)]
pub struct PreemptNotifier {
    tx: mpsc::Sender<PreemptRequest>,
}

impl PreemptNotifier {
    /// Create a notifier and the receiver consumed by the dispatcher.
    pub fn channel() -> (Self, mpsc::Receiver<PreemptRequest>) {
        let (tx, rx) = mpsc::channel(1);
        (Self { tx }, rx)
    }

    /// Attempt a non-blocking delivery.
    pub fn try_notify(&self, request: PreemptRequest) -> bool {
        match self.tx.try_send(request) {
            Ok(()) => {
                tracing::debug!(
                    target_task = request.target,
                    candidate = request.candidate,
                    "preemption requested"
                );
                true
            }
            Err(TrySendError::Full(dropped)) => {
                tracing::debug!(
                    candidate = dropped.candidate,
                    "preemption channel busy, request dropped"
                );
                false
            }
            Err(TrySendError::Closed(_)) => false,
        }
    }
}

/// Fires the terminal signal.
#[derive(Debug)]
pub(crate) struct TerminalTrigger {
    tx: watch::Sender<bool>,
}

impl TerminalTrigger {
    pub(crate) fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx }
    }

    /// Returns `true` only for the call that actually fired it.
    pub(crate) fn fire(&self) -> bool {
        self.tx.send_if_modified(|fired| {
            if *fired {
                false
            } else {
                *fired = true;
                true
            }
        })
    }

    pub(crate) fn subscribe(&self) -> TerminalSignal {
        TerminalSignal {
            rx: self.tx.subscribe(),
        }
    }
}

/// Single-fire notification that the scheduler drained.
///
/// Any number of clones may wait on it; once fired it stays fired.
#[derive(Debug, Clone)]
pub struct TerminalSignal {
    rx: watch::Receiver<bool>,
}

impl TerminalSignal {
    /// True once the scheduler has drained.
    pub fn is_fired(&self) -> bool {
        *self.rx.borrow()
    }

    /// Wait until the scheduler drains. Returns immediately if it already has.
    pub async fn wait(&self) {
        let mut rx = self.rx.clone();
        let _ = rx.wait_for(|fired| *fired).await;
    }
}
