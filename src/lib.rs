//! # Prometheus Preemptive Scheduler
//!
//! A simulation of a single-processor, priority-preemptive task scheduler.
//!
//! Tasks carry one of four priority levels and move through a small state
//! machine (Suspended, Ready, Running, Waiting). Two control loops share one
//! scheduler state:
//!
//! - **Dispatcher**: runs the highest-priority ready task, interrupts it when
//!   a higher-priority task becomes ready, and drains the scheduler after a
//!   configurable number of idle polls.
//! - **Admission controller**: promotes suspended tasks into the ready queues
//!   under a bounded ready count, and resumes waiting tasks when the running
//!   task raises its event-release.
//!
//! Every state change is captured as an [`AuditSnapshot`](core::AuditSnapshot)
//! in the same critical section as the change. Once drained, the trail can be
//! checked with [`core::verify`].
//!
//! ```rust,ignore
//! use prometheus_preemptive_scheduler::config::SchedulerConfig;
//! use prometheus_preemptive_scheduler::core::{verify_trail, Priority, Scheduler, Task, TaskKind, TaskState};
//! use prometheus_preemptive_scheduler::runtime::TokioSpawner;
//!
//! let scheduler = Scheduler::new(SchedulerConfig::default(), TokioSpawner::current())?;
//! let ids = scheduler.id_allocator();
//! for priority in [Priority::P3, Priority::P0] {
//!     scheduler.submit(Task::new(&ids, TaskKind::Basic, priority, TaskState::Suspended));
//! }
//! scheduler.start()?;
//! scheduler.wait_drained().await;
//! verify_trail(&scheduler.audit_trail()?, scheduler.config().ready_capacity)?;
//! ```
//!
//! See `tests/scheduler_scenarios_test.rs` for complete runs under simulated
//! time.

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Task model, scheduling state machine and control loops.
pub mod core;
/// Scheduler configuration.
pub mod config;
/// Builders to construct schedulers from configuration.
pub mod builders;
/// Queue containers.
pub mod infra;
/// Runtime adapters and API surface.
pub mod runtime;
/// Shared utilities.
pub mod util;
