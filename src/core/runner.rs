//! Task runner: the step loop that advances one task while it is running.
//!
//! A runner is spawned by the dispatcher for every run of a task. It shares the
//! task's progress counter and signals, checks for interruption between steps
//! and reports exactly one [`RunOutcome`] back to the dispatcher.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::oneshot::{self, error::TryRecvError};

use crate::config::SchedulerConfig;
use crate::core::signal::Signal;
use crate::core::task::{Task, TaskId, TaskKind};

/// Why a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// Progress reached the limit.
    Completed,
    /// Extended task reached its checkpoint and yields until released.
    WaitRequested,
    /// Interrupted between steps; progress is preserved.
    Preempted,
}

/// Step parameters shared by every runner of a scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunnerSettings {
    /// Progress at which a task is done.
    pub progress_limit: u32,
    /// Progress at which wait-request / event-release fire.
    pub checkpoint: u32,
    /// Simulated work per step.
    pub step_quantum: Duration,
}

impl RunnerSettings {
    /// Settings derived from scheduler configuration.
    pub const fn from_config(config: &SchedulerConfig) -> Self {
        Self {
            progress_limit: config.progress_limit,
            checkpoint: config.checkpoint(),
            step_quantum: config.step_quantum(),
        }
    }
}

/// Drives one run of one task.
#[derive(Debug)]
pub struct TaskRunner {
    task_id: TaskId,
    kind: TaskKind,
    progress: Arc<AtomicU32>,
    wait_request: Signal,
    event_release: Signal,
    settings: RunnerSettings,
}

impl TaskRunner {
    /// Bind a runner to the task's progress counter and signals.
    pub fn new(task: &Task, settings: RunnerSettings) -> Self {
        Self {
            task_id: task.id(),
            kind: task.kind(),
            progress: task.progress_handle(),
            wait_request: task.wait_request().clone(),
            event_release: task.event_release().clone(),
            settings,
        }
    }

    /// Task this runner drives.
    pub const fn task_id(&self) -> TaskId {
        self.task_id
    }

    /// Run until an outcome is reached and report it on `outcome`.
    pub async fn run(self, interrupt: oneshot::Receiver<()>, outcome: oneshot::Sender<RunOutcome>) {
        let result = self.step_loop(interrupt).await;
        if outcome.send(result).is_err() {
            tracing::warn!(task_id = self.task_id, ?result, "run outcome had no receiver");
        }
    }

    /// The step loop. Interruption is only observed between steps.
    pub async fn step_loop(&self, mut interrupt: oneshot::Receiver<()>) -> RunOutcome {
        let RunnerSettings {
            progress_limit,
            checkpoint,
            step_quantum,
        } = self.settings;
        let mut event_raised = false;

        loop {
            match interrupt.try_recv() {
                Err(TryRecvError::Empty) => {}
                Ok(()) | Err(TryRecvError::Closed) => {
                    tracing::info!("task {} interrupted", self.task_id);
                    return RunOutcome::Preempted;
                }
            }

            let progress = self.progress.load(Ordering::Acquire);
            if progress >= progress_limit {
                return RunOutcome::Completed;
            }

            if progress == checkpoint {
                match self.kind {
                    TaskKind::Extended => {
                        if self.wait_request.raise() {
                            tracing::info!("task {} waiting", self.task_id);
                            return RunOutcome::WaitRequested;
                        }
                    }
                    TaskKind::Basic if !event_raised => {
                        event_raised = true;
                        if self.event_release.raise() {
                            tracing::info!("task {} event release", self.task_id);
                        }
                    }
                    TaskKind::Basic => {}
                }
            }

            let progress = progress + 1;
            self.progress.store(progress, Ordering::Release);
            tracing::debug!("task {} progress: {}/{}", self.task_id, progress, progress_limit);
            tokio::time::sleep(step_quantum).await;
        }
    }
}
