//! Scheduler configuration.
//!
//! Values are fixed once a scheduler is built. Defaults reproduce the reference
//! simulation: five ready slots with admission stopping at three, ten idle
//! polls of 100 ms before draining, and tasks of five two-second steps.

use std::fmt::Display;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Ready slots kept free by admission: one for a resumed waiting task and one
/// for the task it preempts.
///
/// Resumption also requires this headroom, so with a tight `ready_capacity` a
/// raised event-release can stay unused until the releasing task's run ends.
pub const READY_HEADROOM: usize = 2;

/// Root scheduler configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Hard bound on tasks across all ready queues.
    pub ready_capacity: usize,
    /// Admission promotes suspended tasks only while fewer than this many are
    /// ready.
    pub admission_limit: usize,
    /// Consecutive empty dispatcher polls before the scheduler drains.
    pub idle_poll_limit: u32,
    /// Dispatcher sleep between empty polls, in milliseconds.
    pub idle_poll_ms: u64,
    /// Admission controller sleep between iterations, in milliseconds.
    pub admission_poll_ms: u64,
    /// Simulated work per task step, in milliseconds.
    pub step_quantum_ms: u64,
    /// Steps a task needs to complete.
    pub progress_limit: u32,
    /// Log every audit snapshot at debug level.
    pub log_snapshots: bool,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            ready_capacity: 5,
            admission_limit: 3,
            idle_poll_limit: 10,
            idle_poll_ms: 100,
            admission_poll_ms: 10,
            step_quantum_ms: 2000,
            progress_limit: 5,
            log_snapshots: false,
        }
    }
}

impl SchedulerConfig {
    /// Progress at which tasks raise their wait-request or event-release.
    pub const fn checkpoint(&self) -> u32 {
        self.progress_limit / 2
    }

    /// Dispatcher idle poll interval.
    pub const fn idle_poll(&self) -> Duration {
        Duration::from_millis(self.idle_poll_ms)
    }

    /// Admission controller poll interval.
    pub const fn admission_poll(&self) -> Duration {
        Duration::from_millis(self.admission_poll_ms)
    }

    /// Simulated work per step.
    pub const fn step_quantum(&self) -> Duration {
        Duration::from_millis(self.step_quantum_ms)
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), String> {
        if self.ready_capacity == 0 {
            return Err("ready_capacity must be greater than 0".into());
        }
        if self.admission_limit == 0 {
            return Err("admission_limit must be greater than 0".into());
        }
        if self.admission_limit + READY_HEADROOM > self.ready_capacity {
            return Err(format!(
                "admission_limit ({}) must leave {READY_HEADROOM} free slots below ready_capacity ({})",
                self.admission_limit, self.ready_capacity
            ));
        }
        if self.idle_poll_limit == 0 {
            return Err("idle_poll_limit must be greater than 0".into());
        }
        if self.idle_poll_ms == 0 {
            return Err("idle_poll_ms must be greater than 0".into());
        }
        if self.admission_poll_ms == 0 {
            return Err("admission_poll_ms must be greater than 0".into());
        }
        if self.step_quantum_ms == 0 {
            return Err("step_quantum_ms must be greater than 0".into());
        }
        if self.progress_limit == 0 {
            return Err("progress_limit must be greater than 0".into());
        }
        Ok(())
    }

    /// Parse scheduler configuration from a JSON string and validate.
    pub fn from_json_str(input: &str) -> Result<Self, String> {
        let cfg: Self = serde_json::from_str(input).map_err(|e| format!("parse error: {e}"))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Load `.env` if present, then read `SCHEDULER_*` variables over the
    /// defaults and validate.
    pub fn from_env() -> Result<Self, String> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`SchedulerConfig::from_env`] with a custom variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();
        read_var(&lookup, "SCHEDULER_READY_CAPACITY", &mut cfg.ready_capacity)?;
        read_var(&lookup, "SCHEDULER_ADMISSION_LIMIT", &mut cfg.admission_limit)?;
        read_var(&lookup, "SCHEDULER_IDLE_POLL_LIMIT", &mut cfg.idle_poll_limit)?;
        read_var(&lookup, "SCHEDULER_IDLE_POLL_MS", &mut cfg.idle_poll_ms)?;
        read_var(&lookup, "SCHEDULER_ADMISSION_POLL_MS", &mut cfg.admission_poll_ms)?;
        read_var(&lookup, "SCHEDULER_STEP_QUANTUM_MS", &mut cfg.step_quantum_ms)?;
        read_var(&lookup, "SCHEDULER_PROGRESS_LIMIT", &mut cfg.progress_limit)?;
        read_var(&lookup, "SCHEDULER_LOG_SNAPSHOTS", &mut cfg.log_snapshots)?;
        cfg.validate()?;
        Ok(cfg)
    }
}

fn read_var<F, T>(lookup: &F, key: &str, slot: &mut T) -> Result<(), String>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: Display,
{
    if let Some(raw) = lookup(key) {
        *slot = raw
            .trim()
            .parse()
            .map_err(|e| format!("{key}={raw:?}: {e}"))?;
    }
    Ok(())
}
