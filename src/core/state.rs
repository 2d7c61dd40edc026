//! Scheduler state and the transitions applied to it.
//!
//! All queues, the current-task slot and the audit log live in one structure
//! behind one lock, so every transition and the snapshot that records it
//! happen in a single critical section. Methods here never block or await.

use serde::{Deserialize, Serialize};

use crate::config::{SchedulerConfig, READY_HEADROOM};
use crate::core::audit::{AuditLog, AuditSink, AuditSnapshot, Transition};
use crate::core::queue_set::QueueSet;
use crate::core::runner::{RunOutcome, RunnerSettings, TaskRunner};
use crate::core::signal::PreemptRequest;
use crate::core::task::{Priority, Task, TaskId, TaskSnapshot, TaskState};
use crate::util::clock::now_ms;

/// A task that has just entered a ready queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Promotion {
    pub(crate) task_id: TaskId,
    pub(crate) priority: Priority,
    /// Set when the promoted task outranks the running one.
    pub(crate) preempt: Option<PreemptRequest>,
}

/// Queue sizes and the running task at one instant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateCounts {
    /// Running task, if any.
    pub running: Option<TaskId>,
    /// Tasks across the ready queues.
    pub ready: usize,
    /// Tasks across the waiting queues.
    pub waiting: usize,
    /// Tasks in the suspended queue.
    pub suspended: usize,
    /// Tasks that ran to completion.
    pub completed: usize,
}

pub(crate) struct SchedulerState {
    queues: QueueSet,
    current: Option<Task>,
    completed: Vec<TaskSnapshot>,
    audit: AuditLog,
    sinks: Vec<Box<dyn AuditSink>>,
    ready_capacity: usize,
    admission_limit: usize,
    runner_settings: RunnerSettings,
}

impl SchedulerState {
    pub(crate) fn new(config: &SchedulerConfig, sinks: Vec<Box<dyn AuditSink>>) -> Self {
        Self {
            queues: QueueSet::default(),
            current: None,
            completed: Vec::new(),
            audit: AuditLog::new(),
            sinks,
            ready_capacity: config.ready_capacity,
            admission_limit: config.admission_limit,
            runner_settings: RunnerSettings::from_config(config),
        }
    }

    /// Force the task to Suspended and append it to the suspended queue.
    pub(crate) fn submit(&mut self, mut task: Task) -> TaskId {
        let id = task.id();
        task.set_state(TaskState::Suspended);
        self.queues.suspended.push_back(task);
        self.record(Transition::new(id, None, TaskState::Suspended));
        id
    }

    /// Pop the highest-priority ready task, make it current and return its
    /// runner. `None` if a task is already running or nothing is ready.
    pub(crate) fn dispatch_next(&mut self) -> Option<TaskRunner> {
        if self.current.is_some() {
            return None;
        }
        let mut task = self.queues.ready.pop_highest()?;
        task.set_state(TaskState::Running);
        task.event_release().rearm();
        let runner = TaskRunner::new(&task, self.runner_settings);
        let id = task.id();
        self.current = Some(task);
        self.record(Transition::new(id, Some(TaskState::Ready), TaskState::Running));
        Some(runner)
    }

    /// Apply a run outcome to the current task. Returns the task's new state,
    /// or `None` if `task_id` is not the current task.
    pub(crate) fn finish_run(&mut self, task_id: TaskId, outcome: RunOutcome) -> Option<TaskState> {
        let mut task = match self.current.take() {
            Some(task) if task.id() == task_id => task,
            other => {
                self.current = other;
                tracing::warn!(task_id, ?outcome, "run outcome for a task that is not current");
                return None;
            }
        };

        let next = match outcome {
            RunOutcome::Preempted => {
                task.set_state(TaskState::Ready);
                self.queues.ready.push_front(task);
                TaskState::Ready
            }
            RunOutcome::Completed => {
                task.set_state(TaskState::Suspended);
                self.completed.push(task.snapshot());
                TaskState::Suspended
            }
            RunOutcome::WaitRequested => {
                task.wait_request().consume();
                task.set_state(TaskState::Waiting);
                self.queues.waiting.push_back(task);
                TaskState::Waiting
            }
        };
        self.record(Transition::new(task_id, Some(TaskState::Running), next));
        Some(next)
    }

    /// Promote the oldest suspended task while the ready queues are below the
    /// admission limit.
    pub(crate) fn admit_next(&mut self) -> Option<Promotion> {
        if self.queues.ready.len() >= self.admission_limit {
            return None;
        }
        let mut task = self.queues.suspended.pop_front()?;
        task.set_state(TaskState::Ready);
        let promotion = self.promotion(&task);
        self.queues.ready.push_back(task);
        self.record(Transition::new(
            promotion.task_id,
            Some(TaskState::Suspended),
            TaskState::Ready,
        ));
        Some(promotion)
    }

    /// If the running task has an unconsumed event-release and a task is
    /// waiting, consume the event and move the highest-priority waiting task to
    /// the head of its ready queue.
    pub(crate) fn resume_waiting(&mut self) -> Option<Promotion> {
        let event = self.current.as_ref()?.event_release();
        if !event.is_set() || self.queues.ready.len() + READY_HEADROOM > self.ready_capacity {
            return None;
        }
        let mut task = self.queues.waiting.pop_highest()?;
        event.consume();
        task.set_state(TaskState::Ready);
        let promotion = self.promotion(&task);
        self.queues.ready.push_front(task);
        self.record(Transition::new(
            promotion.task_id,
            Some(TaskState::Waiting),
            TaskState::Ready,
        ));
        Some(promotion)
    }

    pub(crate) fn is_running(&self, task_id: TaskId) -> bool {
        self.current.as_ref().is_some_and(|t| t.id() == task_id)
    }

    pub(crate) fn finalize_audit(&mut self) {
        self.audit.finalize();
    }

    pub(crate) const fn audit(&self) -> &AuditLog {
        &self.audit
    }

    pub(crate) fn completed(&self) -> &[TaskSnapshot] {
        &self.completed
    }

    pub(crate) fn counts(&self) -> StateCounts {
        StateCounts {
            running: self.current.as_ref().map(Task::id),
            ready: self.queues.ready.len(),
            waiting: self.queues.waiting.len(),
            suspended: self.queues.suspended.len(),
            completed: self.completed.len(),
        }
    }

    fn promotion(&self, task: &Task) -> Promotion {
        let preempt = self
            .current
            .as_ref()
            .filter(|current| task.priority() > current.priority())
            .map(|current| PreemptRequest {
                target: current.id(),
                candidate: task.id(),
                priority: task.priority(),
            });
        Promotion {
            task_id: task.id(),
            priority: task.priority(),
            preempt,
        }
    }

    fn record(&mut self, transition: Transition) {
        let snapshot = AuditSnapshot {
            seq: self.audit.next_seq(),
            label: transition.to_string(),
            transition,
            current: self.current.as_ref().map(Task::snapshot),
            ready: self.queues.ready_snapshot(),
            waiting: self.queues.waiting_snapshot(),
            suspended: self.queues.suspended_snapshot(),
            timestamp_ms: now_ms(),
        };
        for sink in &mut self.sinks {
            sink.record(&snapshot);
        }
        self.audit.append(snapshot);
    }
}
