//! Runtime breaker configuration.

use std::time::Duration;

/// Thresholds and timings for a single breaker.
///
/// Immutable once handed to a breaker. Each field can be overridden
/// independently from the defaults:
///
/// ```rust
/// use std::time::Duration;
/// use circuit_guard::BreakerConfig;
///
/// let config = BreakerConfig::default()
///     .with_probe_limit(5)
///     .with_open_duration(Duration::from_secs(30));
/// assert_eq!(config.probe_limit, 5);
/// assert_eq!(config.min_requests, 10);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct BreakerConfig {
    /// Maximum trial calls admitted per half-open generation, and the number
    /// of consecutive successes needed to close again.
    pub probe_limit: u32,

    /// Lifetime of a closed statistics window. Zero rolls the window over on
    /// every evaluation, so the breaker never accumulates enough to trip.
    pub closed_window: Duration,

    /// Time spent open before probing.
    pub open_duration: Duration,

    /// Failure rate in (0, 1] that trips the breaker.
    pub failure_rate_threshold: f64,

    /// Requests below this count never trip the breaker.
    pub min_requests: u32,
}

impl Default for BreakerConfig {
    fn default() -> Self {
        Self {
            probe_limit: 3,
            closed_window: Duration::from_secs(60),
            open_duration: Duration::from_secs(60),
            failure_rate_threshold: 0.5,
            min_requests: 10,
        }
    }
}

impl BreakerConfig {
    pub fn with_probe_limit(mut self, probe_limit: u32) -> Self {
        self.probe_limit = probe_limit;
        self
    }

    pub fn with_closed_window(mut self, closed_window: Duration) -> Self {
        self.closed_window = closed_window;
        self
    }

    pub fn with_open_duration(mut self, open_duration: Duration) -> Self {
        self.open_duration = open_duration;
        self
    }

    pub fn with_failure_rate_threshold(mut self, threshold: f64) -> Self {
        self.failure_rate_threshold = threshold;
        self
    }

    pub fn with_min_requests(mut self, min_requests: u32) -> Self {
        self.min_requests = min_requests;
        self
    }
}
