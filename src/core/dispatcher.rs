//! Dispatcher loop: runs the highest-priority ready task and applies the
//! outcome of each run.

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};

use crate::core::runner::{RunOutcome, TaskRunner};
use crate::core::scheduler::{Shared, Spawn};
use crate::core::signal::PreemptRequest;
use crate::core::task::TaskState;

/// Runs until the scheduler has been idle for `idle_poll_limit` consecutive
/// polls, then finalizes the audit log and fires the terminal signal.
pub(crate) async fn dispatch_loop<S>(
    shared: Arc<Shared>,
    spawner: S,
    mut preempt_rx: mpsc::Receiver<PreemptRequest>,
) where
    S: Spawn,
{
    let idle_poll = shared.config.idle_poll();
    let idle_poll_limit = shared.config.idle_poll_limit;
    let mut idle_polls = 0u32;

    loop {
        let runner = shared.state.lock().dispatch_next();
        let Some(runner) = runner else {
            tokio::time::sleep(idle_poll).await;
            idle_polls += 1;
            if idle_polls >= idle_poll_limit {
                drain(&shared, idle_polls);
                return;
            }
            continue;
        };

        idle_polls = 0;
        let task_id = runner.task_id();
        tracing::info!("task {} ready -> running", task_id);

        let outcome = supervise(runner, &spawner, &mut preempt_rx).await;
        let next = shared.state.lock().finish_run(task_id, outcome);
        match next {
            Some(TaskState::Suspended) => tracing::info!("task {} done", task_id),
            Some(state) => tracing::info!("task {} running -> {}", task_id, state),
            None => {}
        }
    }
}

/// Spawn the runner and wait for its outcome, forwarding at most one
/// interruption when a preemption request targets this run.
async fn supervise<S>(
    runner: TaskRunner,
    spawner: &S,
    preempt_rx: &mut mpsc::Receiver<PreemptRequest>,
) -> RunOutcome
where
    S: Spawn,
{
    let task_id = runner.task_id();
    let (interrupt_tx, interrupt_rx) = oneshot::channel();
    let (outcome_tx, mut outcome_rx) = oneshot::channel();
    spawner.spawn(runner.run(interrupt_rx, outcome_tx));

    let mut interrupt = Some(interrupt_tx);
    loop {
        tokio::select! {
            biased;
            outcome = &mut outcome_rx => {
                return outcome.unwrap_or_else(|_| {
                    tracing::error!("runner for task {} stopped without an outcome", task_id);
                    RunOutcome::Preempted
                });
            }
            Some(request) = preempt_rx.recv(), if interrupt.is_some() => {
                if request.target != task_id {
                    tracing::debug!(
                        target_task = request.target,
                        running = task_id,
                        "discarding stale preemption request"
                    );
                    continue;
                }
                if let Some(tx) = interrupt.take() {
                    tracing::info!(
                        "interrupting task {} for task {} ({})",
                        task_id,
                        request.candidate,
                        request.priority
                    );
                    // the runner may already be reporting an outcome; that outcome wins
                    let _ = tx.send(());
                }
            }
        }
    }
}

fn drain(shared: &Shared, idle_polls: u32) {
    shared.state.lock().finalize_audit();
    if shared.terminal.fire() {
        tracing::info!(idle_polls, "scheduler drained");
    }
}
