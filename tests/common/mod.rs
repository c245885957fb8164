//! Shared helpers for integration tests.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use circuit_guard::{BreakerConfig, BreakerState, CircuitBreaker, TransitionListener};

/// Transitions seen by a breaker, in order.
pub type TransitionLog = Arc<Mutex<Vec<(BreakerState, BreakerState)>>>;

/// probe_limit=3, threshold=0.5, min_requests=10, 60s window, 60s open.
pub fn standard_config() -> BreakerConfig {
    BreakerConfig::default()
}

/// Breaker with a listener that records every transition.
pub fn recorded_breaker(name: &str, config: BreakerConfig) -> (CircuitBreaker, TransitionLog) {
    let log: TransitionLog = Arc::new(Mutex::new(Vec::new()));
    let sink = log.clone();
    let listener: Arc<dyn TransitionListener> =
        Arc::new(move |_: &str, from: BreakerState, to: BreakerState| {
            sink.lock().unwrap().push((from, to));
        });

    let breaker = CircuitBreaker::new(name, config)
        .expect("valid config")
        .with_listener(listener);
    (breaker, log)
}

pub fn succeed(breaker: &CircuitBreaker) {
    breaker
        .call(|| Ok::<_, &str>(()))
        .expect("call should be admitted and succeed");
}

pub fn fail(breaker: &CircuitBreaker) {
    let err = breaker.call(|| Err::<(), _>("downstream error")).unwrap_err();
    assert!(!err.is_rejected(), "call was rejected instead of failing: {err}");
}

/// Feed 4 successes then 6 failures: 60% failures over 10 requests.
pub fn trip(breaker: &CircuitBreaker) {
    for _ in 0..4 {
        succeed(breaker);
    }
    for _ in 0..6 {
        fail(breaker);
    }
    assert_eq!(breaker.state(), BreakerState::Open);
}

pub fn secs(n: u64) -> Duration {
    Duration::from_secs(n)
}
