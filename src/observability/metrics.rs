//! Metrics collection.
//!
//! # Metrics
//! - `circuit_breaker_transitions_total` (counter): transitions by breaker, from, to
//! - `circuit_breaker_state` (gauge): 0=closed, 1=half_open, 2=open
//! - `circuit_breaker_rejections_total` (counter): rejected calls by breaker, reason
//!
//! # Design Decisions
//! - Backed by the `metrics` facade; the host application installs the exporter
//! - Labels are the breaker name and state names only

use crate::resilience::BreakerState;

pub fn record_transition(name: &str, from: BreakerState, to: BreakerState) {
    ::metrics::counter!(
        "circuit_breaker_transitions_total",
        "breaker" => name.to_string(),
        "from" => from.as_str(),
        "to" => to.as_str()
    )
    .increment(1);

    record_state(name, to);
}

pub fn record_state(name: &str, state: BreakerState) {
    ::metrics::gauge!("circuit_breaker_state", "breaker" => name.to_string()).set(f64::from(state as u8));
}

pub fn record_rejection(name: &str, reason: &'static str) {
    ::metrics::counter!(
        "circuit_breaker_rejections_total",
        "breaker" => name.to_string(),
        "reason" => reason
    )
    .increment(1);
}
