//! Runs a random workload through the scheduler and checks the audit trail.
//!
//! Configuration comes from `SCHEDULER_*` environment variables (a `.env` file
//! is loaded if present). `SIMULATE_TASKS` sets the workload size and
//! `SIMULATE_JSON=1` prints the full audit trail as JSON.

use anyhow::Context;
use rand::Rng;

use prometheus_preemptive_scheduler::config::SchedulerConfig;
use prometheus_preemptive_scheduler::core::{
    verify, AppResult, AuditLog, Priority, Scheduler, Task, TaskKind, TaskState,
};
use prometheus_preemptive_scheduler::runtime::TokioSpawner;
use prometheus_preemptive_scheduler::util::init_tracing_with_default;

const DEFAULT_TASKS: usize = 10;

#[tokio::main]
async fn main() -> AppResult<()> {
    init_tracing_with_default("info");

    let config = SchedulerConfig::from_env()
        .map_err(anyhow::Error::msg)
        .context("loading scheduler configuration")?;
    let task_count = match std::env::var("SIMULATE_TASKS") {
        Ok(raw) => raw.parse().context("SIMULATE_TASKS must be a count")?,
        Err(_) => DEFAULT_TASKS,
    };
    let dump_json = std::env::var("SIMULATE_JSON").is_ok_and(|v| v == "1");

    let scheduler = Scheduler::new(config, TokioSpawner::current())?;
    let ids = scheduler.id_allocator();
    let mut rng = rand::rng();
    for _ in 0..task_count {
        let kind = if rng.random_bool(0.5) {
            TaskKind::Basic
        } else {
            TaskKind::Extended
        };
        let priority = Priority::from_index(rng.random_range(0..Priority::DESCENDING.len()))
            .unwrap_or(Priority::P0);
        scheduler.submit(Task::new(&ids, kind, priority, TaskState::Suspended));
    }

    scheduler.start()?;
    scheduler.wait_drained().await;

    let trail = scheduler.audit_trail()?;
    verify::verify_trail(&trail, scheduler.config().ready_capacity)
        .context("audit trail failed verification")?;

    let status = scheduler.status();
    tracing::info!(
        snapshots = trail.len(),
        completed = status.counts.completed,
        waiting = status.counts.waiting,
        run_order = ?verify::run_order(&trail),
        "simulation finished"
    );

    if dump_json {
        let mut log = AuditLog::new();
        for snapshot in trail {
            log.append(snapshot);
        }
        println!("{}", log.to_json()?);
    } else {
        println!("{}", serde_json::to_string_pretty(&status)?);
    }
    Ok(())
}
