//! Tests for configuration validation

use std::collections::HashMap;
use std::time::Duration;

use prometheus_preemptive_scheduler::config::{SchedulerConfig, READY_HEADROOM};

#[test]
fn test_default_config_is_valid() {
    let cfg = SchedulerConfig::default();
    assert!(cfg.validate().is_ok());
    assert_eq!(cfg.ready_capacity, 5);
    assert_eq!(cfg.admission_limit, 3);
    assert_eq!(cfg.checkpoint(), 2);
    assert_eq!(cfg.idle_poll(), Duration::from_millis(100));
    assert_eq!(cfg.step_quantum(), Duration::from_secs(2));
}

#[test]
fn test_admission_limit_must_leave_headroom() {
    let cfg = SchedulerConfig {
        ready_capacity: 4,
        admission_limit: 4 - READY_HEADROOM + 1,
        ..SchedulerConfig::default()
    };
    assert!(cfg.validate().is_err());

    let cfg = SchedulerConfig {
        ready_capacity: 4,
        admission_limit: 4 - READY_HEADROOM,
        ..SchedulerConfig::default()
    };
    assert!(cfg.validate().is_ok());
}

#[test]
fn test_zero_values_rejected() {
    let zeroed = [
        SchedulerConfig { ready_capacity: 0, ..SchedulerConfig::default() },
        SchedulerConfig { admission_limit: 0, ..SchedulerConfig::default() },
        SchedulerConfig { idle_poll_limit: 0, ..SchedulerConfig::default() },
        SchedulerConfig { idle_poll_ms: 0, ..SchedulerConfig::default() },
        SchedulerConfig { admission_poll_ms: 0, ..SchedulerConfig::default() },
        SchedulerConfig { step_quantum_ms: 0, ..SchedulerConfig::default() },
        SchedulerConfig { progress_limit: 0, ..SchedulerConfig::default() },
    ];
    for cfg in zeroed {
        assert!(cfg.validate().is_err(), "{cfg:?} should be rejected");
    }
}

#[test]
fn test_from_json_str_fills_defaults() {
    let cfg = SchedulerConfig::from_json_str(r#"{"step_quantum_ms": 50, "progress_limit": 7}"#)
        .unwrap();
    assert_eq!(cfg.step_quantum_ms, 50);
    assert_eq!(cfg.progress_limit, 7);
    assert_eq!(cfg.checkpoint(), 3);
    assert_eq!(cfg.ready_capacity, 5);
}

#[test]
fn test_from_json_str_validates() {
    let err = SchedulerConfig::from_json_str(r#"{"ready_capacity": 3}"#).unwrap_err();
    assert!(err.contains("admission_limit"));
    assert!(SchedulerConfig::from_json_str("not json").is_err());
}

#[test]
fn test_from_lookup_overrides() {
    let vars: HashMap<&str, &str> = [
        ("SCHEDULER_READY_CAPACITY", "8"),
        ("SCHEDULER_ADMISSION_LIMIT", "6"),
        ("SCHEDULER_LOG_SNAPSHOTS", "true"),
    ]
    .into_iter()
    .collect();
    let cfg = SchedulerConfig::from_lookup(|key| vars.get(key).map(ToString::to_string)).unwrap();
    assert_eq!(cfg.ready_capacity, 8);
    assert_eq!(cfg.admission_limit, 6);
    assert!(cfg.log_snapshots);
    assert_eq!(cfg.idle_poll_limit, 10);
}

#[test]
fn test_from_lookup_rejects_garbage() {
    let result = SchedulerConfig::from_lookup(|key| {
        (key == "SCHEDULER_IDLE_POLL_MS").then(|| "soon".to_string())
    });
    assert!(result.is_err());
}
