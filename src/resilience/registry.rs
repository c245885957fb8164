//! Named breaker registry.
//!
//! # Responsibilities
//! - Hand out one shared breaker per dependency name
//! - Build breakers lazily from `Settings` (override or defaults)
//! - Report and reset every breaker at once
//!
//! # Design Decisions
//! - Owned by the caller; there is no process-wide registry
//! - Breakers never share state, the registry only indexes them

use std::sync::Arc;
use dashmap::DashMap;

use crate::config::loader::ConfigError;
use crate::config::schema::Settings;
use crate::config::validation::validate_config;
use crate::observability::TracingListener;
use crate::resilience::circuit_breaker::{BreakerSnapshot, CircuitBreaker};
use crate::resilience::listener::TransitionListener;

/// Map of breaker name to shared breaker.
pub struct BreakerRegistry {
    settings: Settings,
    breakers: DashMap<String, Arc<CircuitBreaker>>,
    listener: Arc<dyn TransitionListener>,
}

impl BreakerRegistry {
    /// Create a registry from validated settings.
    pub fn new(settings: Settings) -> Result<Self, ConfigError> {
        validate_config(&settings).map_err(ConfigError::Validation)?;
        Ok(Self {
            settings,
            breakers: DashMap::new(),
            listener: Arc::new(TracingListener),
        })
    }

    /// Use `listener` for every breaker created from now on.
    pub fn with_listener(mut self, listener: Arc<dyn TransitionListener>) -> Self {
        self.listener = listener;
        self
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// The breaker for `name`, created on first use.
    pub fn get(&self, name: &str) -> Result<Arc<CircuitBreaker>, ConfigError> {
        if let Some(existing) = self.breakers.get(name) {
            return Ok(existing.value().clone());
        }

        let config = self.settings.settings_for(name).to_config();
        let breaker = CircuitBreaker::new(name, config)?.with_listener(self.listener.clone());

        // Another thread may have raced us; keep whichever landed first.
        let entry = self
            .breakers
            .entry(name.to_string())
            .or_insert_with(|| {
                tracing::debug!(breaker = %name, "Circuit breaker created");
                Arc::new(breaker)
            });
        Ok(entry.value().clone())
    }

    /// Snapshots of every breaker created so far, sorted by name.
    pub fn snapshots(&self) -> Vec<BreakerSnapshot> {
        // Collect first so no shard lock is held while breakers lock themselves.
        let breakers: Vec<Arc<CircuitBreaker>> =
            self.breakers.iter().map(|entry| entry.value().clone()).collect();

        let mut snapshots: Vec<BreakerSnapshot> = breakers.iter().map(|b| b.snapshot()).collect();
        snapshots.sort_by(|a, b| a.name.cmp(&b.name));
        snapshots
    }

    /// Reset every breaker created so far.
    pub fn reset_all(&self) {
        let breakers: Vec<Arc<CircuitBreaker>> =
            self.breakers.iter().map(|entry| entry.value().clone()).collect();

        for breaker in breakers {
            breaker.reset();
        }
    }

    pub fn len(&self) -> usize {
        self.breakers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.breakers.is_empty()
    }
}
