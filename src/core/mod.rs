//! Task model, scheduling state machine and the control loops that drive it.

pub mod error;
pub mod task;
pub mod signal;
pub mod runner;
pub mod audit;
pub mod verify;
pub mod scheduler;
mod admission;
mod dispatcher;
mod queue_set;
mod state;

pub use error::{AppResult, AuditViolation, SchedulerError, TaskError};
pub use task::{
    IdAllocator, Priority, Task, TaskId, TaskKind, TaskSnapshot, TaskState, PRIORITY_LEVELS,
};
pub use signal::{PreemptNotifier, PreemptRequest, Signal, SignalState, TerminalSignal};
pub use runner::{RunOutcome, RunnerSettings, TaskRunner};
pub use audit::{
    AuditLog, AuditSink, AuditSnapshot, InMemoryAuditSink, TracingAuditSink, Transition,
};
pub use verify::verify_trail;
pub use scheduler::{Scheduler, SchedulerStatus, Spawn};
pub use state::StateCounts;
