//! Scheduler facade: submission, startup, terminal signal and audit access.

use std::future::Future;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::Instrument;
use uuid::Uuid;

use crate::builders::SchedulerBuilder;
use crate::config::SchedulerConfig;
use crate::core::admission::admission_loop;
use crate::core::audit::{AuditSink, AuditSnapshot};
use crate::core::dispatcher::dispatch_loop;
use crate::core::signal::{PreemptNotifier, PreemptRequest, TerminalSignal, TerminalTrigger};
use crate::core::state::{SchedulerState, StateCounts};
use crate::core::task::{IdAllocator, Task, TaskId, TaskSnapshot};
use crate::core::SchedulerError;
use crate::runtime::TokioSpawner;

/// Abstraction for spawning the control loops and task runners on a runtime.
pub trait Spawn {
    /// Spawn a detached future.
    fn spawn<F>(&self, fut: F)
    where
        F: Future<Output = ()> + Send + 'static;
}

/// Point-in-time view of a scheduler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulerStatus {
    /// Scheduler instance identifier.
    pub run_id: String,
    /// Whether the terminal signal has fired.
    pub drained: bool,
    /// Queue sizes and running task.
    #[serde(flatten)]
    pub counts: StateCounts,
}

/// State shared by the facade and both control loops.
pub(crate) struct Shared {
    pub(crate) config: SchedulerConfig,
    pub(crate) state: Mutex<SchedulerState>,
    pub(crate) terminal: TerminalTrigger,
    pub(crate) preempt: PreemptNotifier,
}

/// Priority-preemptive scheduler.
///
/// ```rust,ignore
/// use prometheus_preemptive_scheduler::config::SchedulerConfig;
/// use prometheus_preemptive_scheduler::core::{Priority, Scheduler, Task, TaskKind, TaskState};
/// use prometheus_preemptive_scheduler::runtime::TokioSpawner;
///
/// let scheduler = Scheduler::new(SchedulerConfig::default(), TokioSpawner::current())?;
/// let ids = scheduler.id_allocator();
/// scheduler.submit(Task::new(&ids, TaskKind::Basic, Priority::P3, TaskState::Suspended));
/// scheduler.start()?;
/// scheduler.wait_drained().await;
/// let trail = scheduler.audit_trail()?;
/// ```
pub struct Scheduler<S = TokioSpawner> {
    shared: Arc<Shared>,
    spawner: S,
    ids: Arc<IdAllocator>,
    preempt_rx: Mutex<Option<mpsc::Receiver<PreemptRequest>>>,
    run_id: Uuid,
}

impl<S> Scheduler<S> {
    /// Build a scheduler from a validated configuration.
    pub fn new(config: SchedulerConfig, spawner: S) -> Result<Self, SchedulerError> {
        SchedulerBuilder::new(config).build(spawner)
    }

    pub(crate) fn from_parts(
        config: SchedulerConfig,
        sinks: Vec<Box<dyn AuditSink>>,
        spawner: S,
    ) -> Self {
        let (preempt, preempt_rx) = PreemptNotifier::channel();
        let state = SchedulerState::new(&config, sinks);
        Self {
            shared: Arc::new(Shared {
                config,
                state: Mutex::new(state),
                terminal: TerminalTrigger::new(),
                preempt,
            }),
            spawner,
            ids: Arc::new(IdAllocator::new()),
            preempt_rx: Mutex::new(Some(preempt_rx)),
            run_id: Uuid::new_v4(),
        }
    }

    /// Configuration this scheduler was built with.
    pub fn config(&self) -> &SchedulerConfig {
        &self.shared.config
    }

    /// Identifier of this scheduler instance, attached to its log span.
    pub const fn run_id(&self) -> Uuid {
        self.run_id
    }

    /// Allocator to construct tasks for this scheduler with.
    pub fn id_allocator(&self) -> Arc<IdAllocator> {
        Arc::clone(&self.ids)
    }

    /// Accept a task. Its state is forced to Suspended; no other validation is
    /// done. Safe to call concurrently, before or after [`Scheduler::start`].
    pub fn submit(&self, task: Task) -> TaskId {
        let id = self.shared.state.lock().submit(task);
        if self.is_drained() {
            tracing::warn!("task {} submitted after the scheduler drained", id);
        } else {
            tracing::info!("task {} -> suspended", id);
        }
        id
    }

    /// Single-fire signal raised when the scheduler drains.
    pub fn terminal(&self) -> TerminalSignal {
        self.shared.terminal.subscribe()
    }

    /// Whether the terminal signal has fired.
    pub fn is_drained(&self) -> bool {
        self.terminal().is_fired()
    }

    /// Wait for the terminal signal.
    pub async fn wait_drained(&self) {
        self.terminal().wait().await;
    }

    /// Finalized audit trail, ordered by timestamp.
    pub fn audit_trail(&self) -> Result<Vec<AuditSnapshot>, SchedulerError> {
        let state = self.shared.state.lock();
        if !state.audit().is_finalized() {
            return Err(SchedulerError::NotDrained);
        }
        Ok(state.audit().snapshots().to_vec())
    }

    /// Whether `task_id` is the current task.
    pub fn is_running(&self, task_id: TaskId) -> bool {
        self.shared.state.lock().is_running(task_id)
    }

    /// Final snapshots of tasks that ran to completion, in completion order.
    pub fn completed(&self) -> Vec<TaskSnapshot> {
        self.shared.state.lock().completed().to_vec()
    }

    /// Current queue sizes, running task and drain flag.
    pub fn status(&self) -> SchedulerStatus {
        let counts = self.shared.state.lock().counts();
        SchedulerStatus {
            run_id: self.run_id.to_string(),
            drained: self.is_drained(),
            counts,
        }
    }
}

impl<S> Scheduler<S>
where
    S: Spawn + Clone + Send + Sync + 'static,
{
    /// Spawn the dispatcher and admission controller.
    pub fn start(&self) -> Result<(), SchedulerError> {
        let preempt_rx = self
            .preempt_rx
            .lock()
            .take()
            .ok_or(SchedulerError::AlreadyStarted)?;

        let span = tracing::info_span!("scheduler", run_id = %self.run_id);
        self.spawner.spawn(
            dispatch_loop(Arc::clone(&self.shared), self.spawner.clone(), preempt_rx)
                .instrument(span.clone()),
        );
        self.spawner
            .spawn(admission_loop(Arc::clone(&self.shared)).instrument(span));
        tracing::info!(run_id = %self.run_id, "scheduler started");
        Ok(())
    }
}
