//! Tests for utility functions

use prometheus_preemptive_scheduler::util::now_ms;

#[test]
fn test_now_ms_is_after_epoch() {
    // 2020-01-01T00:00:00Z
    assert!(now_ms() > 1_577_836_800_000);
}

#[test]
fn test_now_ms_does_not_go_backwards() {
    let first = now_ms();
    let second = now_ms();
    assert!(second >= first);
}

#[test]
fn test_init_tracing_is_idempotent() {
    prometheus_preemptive_scheduler::util::init_tracing();
    prometheus_preemptive_scheduler::util::init_tracing_with_default("debug");
}
