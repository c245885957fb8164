//! Statistics window.
//!
//! # Responsibilities
//! - Count requests and outcomes for the current generation
//! - Track consecutive successes/failures
//! - Provide the failure rate used by the trip check
//!
//! # Design Decisions
//! - Plain counters, no interior mutability; the breaker lock guards them
//! - Cleared (never decremented) on rollover and on every transition

use serde::Serialize;

/// Request and outcome counters for one generation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Counts {
    /// Admitted requests, including ones still in flight.
    pub requests: u32,
    pub total_successes: u32,
    pub total_failures: u32,
    pub consecutive_successes: u32,
    pub consecutive_failures: u32,
}

impl Counts {
    pub(crate) fn on_request(&mut self) {
        self.requests = self.requests.saturating_add(1);
    }

    pub(crate) fn on_success(&mut self) {
        self.total_successes = self.total_successes.saturating_add(1);
        self.consecutive_successes = self.consecutive_successes.saturating_add(1);
        self.consecutive_failures = 0;
    }

    pub(crate) fn on_failure(&mut self) {
        self.total_failures = self.total_failures.saturating_add(1);
        self.consecutive_failures = self.consecutive_failures.saturating_add(1);
        self.consecutive_successes = 0;
    }

    pub(crate) fn clear(&mut self) {
        *self = Counts::default();
    }

    /// Fraction of admitted requests that failed. Zero when nothing was admitted.
    pub fn failure_rate(&self) -> f64 {
        if self.requests == 0 {
            return 0.0;
        }
        f64::from(self.total_failures) / f64::from(self.requests)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_consecutive_counters_reset_each_other() {
        let mut counts = Counts::default();
        counts.on_request();
        counts.on_request();
        counts.on_request();

        counts.on_success();
        counts.on_success();
        assert_eq!(counts.consecutive_successes, 2);

        counts.on_failure();
        assert_eq!(counts.consecutive_successes, 0);
        assert_eq!(counts.consecutive_failures, 1);
        assert_eq!(counts.total_successes, 2);
        assert_eq!(counts.total_failures, 1);
    }

    #[test]
    fn test_failure_rate() {
        let mut counts = Counts::default();
        assert_eq!(counts.failure_rate(), 0.0);

        for _ in 0..4 {
            counts.on_request();
        }
        counts.on_failure();
        assert!((counts.failure_rate() - 0.25).abs() < f64::EPSILON);
    }

    #[test]
    fn test_clear() {
        let mut counts = Counts::default();
        counts.on_request();
        counts.on_failure();
        counts.clear();
        assert_eq!(counts, Counts::default());
    }
}
