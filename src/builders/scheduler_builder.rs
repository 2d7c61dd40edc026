//! Builder that validates configuration and wires audit sinks into a scheduler.

use crate::config::SchedulerConfig;
use crate::core::{AuditSink, Scheduler, SchedulerError, TracingAuditSink};

/// Collects configuration and audit sinks, then builds a [`Scheduler`].
pub struct SchedulerBuilder {
    config: SchedulerConfig,
    sinks: Vec<Box<dyn AuditSink>>,
}

impl SchedulerBuilder {
    /// Start from a configuration.
    pub fn new(config: SchedulerConfig) -> Self {
        Self {
            config,
            sinks: Vec::new(),
        }
    }

    /// Attach an observer that sees every snapshot as it is taken.
    #[must_use]
    pub fn with_audit_sink(mut self, sink: Box<dyn AuditSink>) -> Self {
        self.sinks.push(sink);
        self
    }

    /// Validate the configuration and build the scheduler.
    pub fn build<S>(self, spawner: S) -> Result<Scheduler<S>, SchedulerError> {
        self.config
            .validate()
            .map_err(|e| SchedulerError::InvalidConfig(format!("config invalid: {e}")))?;

        let mut sinks = self.sinks;
        if self.config.log_snapshots {
            sinks.push(Box::new(TracingAuditSink));
        }
        Ok(Scheduler::from_parts(self.config, sinks, spawner))
    }
}

/// Build a scheduler from configuration with no extra audit sinks.
pub fn build_scheduler<S>(cfg: &SchedulerConfig, spawner: S) -> Result<Scheduler<S>, SchedulerError> {
    SchedulerBuilder::new(cfg.clone()).build(spawner)
}
