//! Circuit breaker for protecting calls to a degraded dependency.
//!
//! # States
//! - Closed: normal operation, calls pass through and outcomes are counted
//! - Open: dependency assumed down, calls fail fast
//! - Half-Open: a bounded number of probe calls test recovery
//!
//! # Call Flow
//! ```text
//! call(op)
//!     → admission (locked): evaluate due transitions, admit or reject
//!     → op runs (unlocked)
//!     → outcome (locked): drop if generation moved on, else record + apply policy
//!     → transitions queued (locked), delivered in order (unlocked)
//! ```
//!
//! # Design Decisions
//! - One state mutex, never held while the operation or the listener runs
//! - Transitions are queued in the order they happen and delivered by one
//!   caller at a time; a caller that finds delivery in progress leaves its
//!   transitions to the caller already delivering
//! - Time-based transitions are evaluated lazily on every query; no timer task
//! - Outcomes from a previous generation are discarded, not counted
//! - A panicking or cancelled operation counts as a failure

use std::collections::VecDeque;
use std::fmt;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, TryLockError};

use serde::Serialize;
use tokio::time::Instant;

use crate::config::loader::ConfigError;
use crate::config::validation::validate_breaker;
use crate::observability::metrics;
use crate::observability::TracingListener;
use crate::resilience::config::BreakerConfig;
use crate::resilience::counts::Counts;
use crate::resilience::error::BreakerError;
use crate::resilience::guard::CallGuard;
use crate::resilience::listener::TransitionListener;
use crate::resilience::machine::{Machine, Rejection, Transition};
use crate::resilience::state::BreakerState;

/// Point-in-time view of a breaker.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BreakerSnapshot {
    pub name: String,
    pub state: BreakerState,
    pub generation: u64,
    pub counts: Counts,
}

/// A named circuit breaker.
///
/// Share it between tasks or threads with `Arc`; every method takes `&self`.
///
/// ```rust
/// use circuit_guard::{BreakerError, CircuitBreaker};
///
/// let breaker = CircuitBreaker::with_defaults("inventory");
///
/// let value = breaker.call(|| Ok::<_, std::io::Error>(42)).unwrap();
/// assert_eq!(value, 42);
///
/// let err = breaker.call(|| Err::<(), _>("timeout")).unwrap_err();
/// assert!(matches!(err, BreakerError::Inner("timeout")));
/// ```
pub struct CircuitBreaker {
    name: String,
    config: BreakerConfig,
    machine: Mutex<Machine>,
    pending: Mutex<VecDeque<Transition>>,
    delivering: Mutex<()>,
    listener: Arc<dyn TransitionListener>,
}

impl CircuitBreaker {
    /// Create a breaker after validating its configuration.
    pub fn new(name: impl Into<String>, config: BreakerConfig) -> Result<Self, ConfigError> {
        let name = name.into();
        let errors = validate_breaker(&name, &config);
        if !errors.is_empty() {
            return Err(ConfigError::Validation(errors));
        }
        Ok(Self::build(name, config))
    }

    /// Create a breaker with the default configuration.
    pub fn with_defaults(name: impl Into<String>) -> Self {
        Self::build(name.into(), BreakerConfig::default())
    }

    fn build(name: String, config: BreakerConfig) -> Self {
        let machine = Machine::new(&config, Instant::now());
        Self {
            name,
            config,
            machine: Mutex::new(machine),
            pending: Mutex::new(VecDeque::new()),
            delivering: Mutex::new(()),
            listener: Arc::new(TracingListener),
        }
    }

    /// Replace the transition listener (structured logging + metrics by default).
    pub fn with_listener(mut self, listener: Arc<dyn TransitionListener>) -> Self {
        self.listener = listener;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn config(&self) -> &BreakerConfig {
        &self.config
    }

    /// Current state, after applying any due rollover or Open → HalfOpen move.
    pub fn state(&self) -> BreakerState {
        let state = {
            let mut machine = self.lock();
            let (state, _, transition) = machine.current_state(&self.config, Instant::now());
            self.enqueue(transition);
            state
        };
        self.notify();
        state
    }

    /// Counters of the current window.
    pub fn counts(&self) -> Counts {
        self.snapshot().counts
    }

    /// Current generation. Strictly increases on every rollover, transition and reset.
    pub fn generation(&self) -> u64 {
        self.snapshot().generation
    }

    pub fn snapshot(&self) -> BreakerSnapshot {
        let snapshot = {
            let mut machine = self.lock();
            let (state, generation, transition) = machine.current_state(&self.config, Instant::now());
            self.enqueue(transition);
            BreakerSnapshot {
                name: self.name.clone(),
                state,
                generation,
                counts: machine.counts(),
            }
        };
        self.notify();
        snapshot
    }

    /// Force the breaker closed with a fresh window, regardless of timers.
    pub fn reset(&self) {
        {
            let mut machine = self.lock();
            let transition = machine.reset(&self.config, Instant::now());
            self.enqueue(transition);
        }
        tracing::info!(breaker = %self.name, "Circuit breaker reset");
        self.notify();
    }

    /// Run a synchronous operation under the breaker.
    ///
    /// `Err` from the operation counts as a failure and comes back as
    /// [`BreakerError::Inner`]. A panic counts as a failure and keeps unwinding.
    pub fn call<T, E, F>(&self, operation: F) -> Result<T, BreakerError<E>>
    where
        F: FnOnce() -> Result<T, E>,
    {
        let guard = self.before_request::<E>()?;
        let result = operation();
        guard.settle(result.is_ok());
        result.map_err(BreakerError::Inner)
    }

    /// Run an asynchronous operation under the breaker.
    ///
    /// `operation` is only invoked once the call is admitted. The breaker puts
    /// no deadline on the future; wrap it in `tokio::time::timeout` inside
    /// `operation` if one is needed. Dropping the returned future while the
    /// operation is in flight records a failure.
    pub async fn call_async<T, E, F, Fut>(&self, operation: F) -> Result<T, BreakerError<E>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let guard = self.before_request::<E>()?;
        let result = operation().await;
        guard.settle(result.is_ok());
        result.map_err(BreakerError::Inner)
    }

    fn before_request<E>(&self) -> Result<CallGuard<'_>, BreakerError<E>> {
        let admission = {
            let mut machine = self.lock();
            let (state, generation, transition) = machine.current_state(&self.config, Instant::now());
            self.enqueue(transition);
            machine.admit(state, &self.config).map(|()| generation)
        };
        self.notify();

        match admission {
            Ok(generation) => Ok(CallGuard::new(self, generation)),
            Err(rejection) => {
                let err = match rejection {
                    Rejection::Open => BreakerError::Open { name: self.name.clone() },
                    Rejection::TooManyRequests => BreakerError::TooManyRequests { name: self.name.clone() },
                };
                tracing::debug!(breaker = %self.name, reason = err.kind(), "Call rejected");
                metrics::record_rejection(&self.name, err.kind());
                Err(err)
            }
        }
    }

    pub(crate) fn after_request(&self, generation: u64, success: bool) {
        {
            let mut machine = self.lock();
            let now = Instant::now();
            let (state, current, rolled) = machine.current_state(&self.config, now);
            self.enqueue(rolled);

            if generation != current {
                tracing::trace!(
                    breaker = %self.name,
                    generation,
                    current,
                    success,
                    "Discarding outcome from a stale generation"
                );
            } else if success {
                self.enqueue(machine.on_success(state, &self.config, now));
            } else {
                self.enqueue(machine.on_failure(state, &self.config, now));
            }
        }

        self.notify();
    }

    fn lock(&self) -> MutexGuard<'_, Machine> {
        // The lock is never held across user code, so poisoning cannot leave
        // the machine half-updated.
        self.machine.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Queue a transition. Callers hold the state lock, so the queue order is
    /// the order in which transitions happened.
    fn enqueue(&self, transition: Option<Transition>) {
        if let Some(transition) = transition {
            self.pending_queue().push_back(transition);
        }
    }

    /// Deliver queued transitions to the listener, oldest first.
    ///
    /// Only one caller delivers at a time. Anyone else, including a listener
    /// that calls back into this breaker, returns at once and its transitions
    /// go out with the current delivery.
    fn notify(&self) {
        loop {
            let delivering = match self.delivering.try_lock() {
                Ok(guard) => guard,
                Err(TryLockError::Poisoned(poisoned)) => poisoned.into_inner(),
                Err(TryLockError::WouldBlock) => return,
            };

            loop {
                // Pop in its own statement so the queue is unlocked while the listener runs.
                let next = self.pending_queue().pop_front();
                let Some(Transition { from, to }) = next else {
                    break;
                };
                self.listener.on_transition(&self.name, from, to);
            }
            drop(delivering);

            // A transition queued after the last pop whose caller saw delivery
            // still in progress.
            if self.pending_queue().is_empty() {
                return;
            }
        }
    }

    fn pending_queue(&self) -> MutexGuard<'_, VecDeque<Transition>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for CircuitBreaker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CircuitBreaker")
            .field("name", &self.name)
            .field("config", &self.config)
            .field("machine", &*self.lock())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn quick_trip() -> BreakerConfig {
        BreakerConfig::default()
            .with_min_requests(2)
            .with_open_duration(Duration::from_secs(30))
    }

    #[test]
    fn test_rejects_invalid_config() {
        let result = CircuitBreaker::new("bad", BreakerConfig::default().with_probe_limit(0));
        assert!(matches!(result, Err(ConfigError::Validation(errors)) if errors.len() == 1));
    }

    #[test]
    fn test_operation_error_passes_through() {
        let breaker = CircuitBreaker::with_defaults("db");
        let err = breaker
            .call(|| Err::<(), _>(std::io::Error::other("reset by peer")))
            .unwrap_err();

        assert_eq!(err.to_string(), "reset by peer");
        assert_eq!(breaker.counts().total_failures, 1);
    }

    #[test]
    fn test_open_breaker_never_runs_operation() {
        let breaker = CircuitBreaker::new("db", quick_trip()).unwrap();
        let _ = breaker.call(|| Err::<(), _>("down"));
        let _ = breaker.call(|| Err::<(), _>("down"));
        assert_eq!(breaker.state(), BreakerState::Open);

        let mut ran = false;
        let err = breaker
            .call(|| {
                ran = true;
                Ok::<_, &str>(())
            })
            .unwrap_err();

        assert!(!ran);
        assert!(matches!(err, BreakerError::Open { ref name } if name == "db"));
    }

    #[test]
    fn test_panic_is_recorded_then_propagates() {
        let breaker = CircuitBreaker::with_defaults("panicky");

        let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _ = breaker.call(|| -> Result<(), &str> { panic!("boom") });
        }));

        assert!(outcome.is_err());
        let counts = breaker.counts();
        assert_eq!(counts.requests, 1);
        assert_eq!(counts.total_failures, 1);
    }

    #[test]
    fn test_listener_sees_transitions() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let breaker = CircuitBreaker::new("orders", quick_trip())
            .unwrap()
            .with_listener(Arc::new(move |name: &str, from: BreakerState, to: BreakerState| {
                sink.lock().unwrap().push((name.to_string(), from, to));
            }));

        let _ = breaker.call(|| Err::<(), _>("down"));
        let _ = breaker.call(|| Err::<(), _>("down"));
        breaker.reset();

        let seen = seen.lock().unwrap();
        assert_eq!(
            *seen,
            vec![
                ("orders".to_string(), BreakerState::Closed, BreakerState::Open),
                ("orders".to_string(), BreakerState::Open, BreakerState::Closed),
            ]
        );
    }

    #[test]
    fn test_listener_may_query_breaker() {
        let breaker = Arc::new_cyclic(|weak: &std::sync::Weak<CircuitBreaker>| {
            let weak = weak.clone();
            CircuitBreaker::new("reentrant", quick_trip())
                .unwrap()
                .with_listener(Arc::new(move |_: &str, _: BreakerState, to: BreakerState| {
                    if let Some(breaker) = weak.upgrade() {
                        assert_eq!(breaker.state(), to);
                    }
                }))
        });

        let _ = breaker.call(|| Err::<(), _>("down"));
        let _ = breaker.call(|| Err::<(), _>("down"));
        assert_eq!(breaker.state(), BreakerState::Open);
    }

    #[test]
    fn test_transition_raised_by_listener_is_delivered_next() {
        // Zero open duration: querying an open breaker moves it to half-open.
        let config = quick_trip().with_open_duration(Duration::ZERO);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();

        let breaker = Arc::new_cyclic(|weak: &std::sync::Weak<CircuitBreaker>| {
            let weak = weak.clone();
            CircuitBreaker::new("chained", config)
                .unwrap()
                .with_listener(Arc::new(move |_: &str, from: BreakerState, to: BreakerState| {
                    sink.lock().unwrap().push((from, to));
                    if to == BreakerState::Open {
                        if let Some(breaker) = weak.upgrade() {
                            assert_eq!(breaker.state(), BreakerState::HalfOpen);
                        }
                    }
                }))
        });

        let _ = breaker.call(|| Err::<(), _>("down"));
        let _ = breaker.call(|| Err::<(), _>("down"));

        assert_eq!(
            *seen.lock().unwrap(),
            vec![
                (BreakerState::Closed, BreakerState::Open),
                (BreakerState::Open, BreakerState::HalfOpen),
            ]
        );
    }

    #[test]
    fn test_snapshot_serializes() {
        let breaker = CircuitBreaker::with_defaults("email");
        let _ = breaker.call(|| Ok::<_, &str>(()));

        let json = serde_json::to_value(breaker.snapshot()).unwrap();
        assert_eq!(json["name"], "email");
        assert_eq!(json["state"], "closed");
        assert_eq!(json["counts"]["total_successes"], 1);
    }
}
