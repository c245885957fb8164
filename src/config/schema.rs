//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from TOML. Durations are
//! whole seconds in the file and become `Duration`s in [`BreakerConfig`].

use std::time::Duration;
use serde::{Deserialize, Serialize};

use crate::resilience::BreakerConfig;

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct Settings {
    /// Logging settings.
    pub observability: ObservabilityConfig,

    /// Settings used by every breaker without an override.
    pub defaults: BreakerSettings,

    /// Per-breaker overrides, keyed by name.
    pub breakers: Vec<BreakerOverride>,
}

impl Settings {
    /// Effective settings for the breaker called `name`.
    pub fn settings_for(&self, name: &str) -> BreakerSettings {
        match self.breakers.iter().find(|b| b.name == name) {
            Some(over) => self.defaults.merge(over),
            None => self.defaults.clone(),
        }
    }

    /// Effective settings of every explicitly configured breaker.
    pub fn resolved(&self) -> Vec<NamedBreakerSettings> {
        self.breakers
            .iter()
            .map(|over| NamedBreakerSettings {
                name: over.name.clone(),
                settings: self.defaults.merge(over),
            })
            .collect()
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log filter used when `RUST_LOG` is unset (e.g. "info", "circuit_guard=debug").
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

/// Breaker thresholds and timings as written in the config file.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct BreakerSettings {
    /// Probe calls allowed while half-open.
    pub probe_limit: u32,

    /// Closed window lifetime in seconds.
    pub closed_window_secs: u64,

    /// Seconds spent open before probing.
    pub open_duration_secs: u64,

    /// Failure rate in (0, 1] that trips the breaker.
    pub failure_rate_threshold: f64,

    /// Minimum requests in a window before the breaker may trip.
    pub min_requests: u32,
}

impl Default for BreakerSettings {
    fn default() -> Self {
        let config = BreakerConfig::default();
        Self {
            probe_limit: config.probe_limit,
            closed_window_secs: config.closed_window.as_secs(),
            open_duration_secs: config.open_duration.as_secs(),
            failure_rate_threshold: config.failure_rate_threshold,
            min_requests: config.min_requests,
        }
    }
}

impl BreakerSettings {
    /// Apply the fields set in `over` on top of these settings.
    pub fn merge(&self, over: &BreakerOverride) -> BreakerSettings {
        BreakerSettings {
            probe_limit: over.probe_limit.unwrap_or(self.probe_limit),
            closed_window_secs: over.closed_window_secs.unwrap_or(self.closed_window_secs),
            open_duration_secs: over.open_duration_secs.unwrap_or(self.open_duration_secs),
            failure_rate_threshold: over.failure_rate_threshold.unwrap_or(self.failure_rate_threshold),
            min_requests: over.min_requests.unwrap_or(self.min_requests),
        }
    }

    pub fn to_config(&self) -> BreakerConfig {
        BreakerConfig {
            probe_limit: self.probe_limit,
            closed_window: Duration::from_secs(self.closed_window_secs),
            open_duration: Duration::from_secs(self.open_duration_secs),
            failure_rate_threshold: self.failure_rate_threshold,
            min_requests: self.min_requests,
        }
    }
}

/// Named override; unset fields fall back to `[defaults]`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct BreakerOverride {
    pub name: String,
    pub probe_limit: Option<u32>,
    pub closed_window_secs: Option<u64>,
    pub open_duration_secs: Option<u64>,
    pub failure_rate_threshold: Option<f64>,
    pub min_requests: Option<u32>,
}

/// A breaker name with its effective settings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NamedBreakerSettings {
    pub name: String,
    #[serde(flatten)]
    pub settings: BreakerSettings,
}
