//! Admission controller: promotes suspended tasks, resumes waiting tasks and
//! asks the dispatcher to preempt when a higher-priority task becomes ready.

use std::sync::Arc;

use crate::core::scheduler::Shared;
use crate::core::signal::PreemptNotifier;
use crate::core::state::Promotion;

/// Polls until the terminal signal fires.
pub(crate) async fn admission_loop(shared: Arc<Shared>) {
    let poll = shared.config.admission_poll();
    let terminal = shared.terminal.subscribe();

    while !terminal.is_fired() {
        let admitted = shared.state.lock().admit_next();
        if let Some(promotion) = admitted {
            tracing::info!("task {} suspended -> ready", promotion.task_id);
            request_preemption(&shared.preempt, promotion);
        }

        let resumed = shared.state.lock().resume_waiting();
        if let Some(promotion) = resumed {
            tracing::info!("task {} waiting -> ready", promotion.task_id);
            request_preemption(&shared.preempt, promotion);
        }

        tokio::time::sleep(poll).await;
    }
    tracing::debug!("admission controller stopped");
}

fn request_preemption(notifier: &PreemptNotifier, promotion: Promotion) {
    let Some(request) = promotion.preempt else {
        return;
    };
    if !notifier.try_notify(request) {
        tracing::debug!(
            "preemption by task {} ({}) not delivered",
            promotion.task_id,
            promotion.priority
        );
    }
}
