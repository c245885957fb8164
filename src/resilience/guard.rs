//! Outcome guard for an admitted call.

use std::fmt;

use crate::resilience::circuit_breaker::CircuitBreaker;

/// A RAII guard that reports the outcome of one admitted call.
///
/// Dropping the guard without settling it counts as a failure. That covers a
/// panicking operation (the guard drops during unwinding) and a cancelled
/// `call_async` future (the guard drops with the future).
pub(crate) struct CallGuard<'a> {
    breaker: &'a CircuitBreaker,
    generation: u64,
    settled: bool,
}

impl<'a> CallGuard<'a> {
    pub(crate) fn new(breaker: &'a CircuitBreaker, generation: u64) -> Self {
        Self {
            breaker,
            generation,
            settled: false,
        }
    }

    /// Record the operation's outcome.
    pub(crate) fn settle(mut self, success: bool) {
        self.settled = true;
        self.breaker.after_request(self.generation, success);
    }
}

impl fmt::Debug for CallGuard<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallGuard")
            .field("breaker", &self.breaker.name())
            .field("generation", &self.generation)
            .field("settled", &self.settled)
            .finish()
    }
}

impl Drop for CallGuard<'_> {
    fn drop(&mut self) {
        if self.settled {
            return;
        }

        if std::thread::panicking() {
            tracing::warn!(breaker = %self.breaker.name(), "Protected operation panicked, recording failure");
        } else {
            tracing::debug!(breaker = %self.breaker.name(), "Protected call dropped before completion, recording failure");
        }
        self.breaker.after_request(self.generation, false);
    }
}
