//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (probe limit, failure-rate threshold)
//! - Detect duplicate breaker names
//!
//! # Design Decisions
//! - Returns all validation errors, not just the first
//! - Validation is a pure function of the settings
//! - Runs before a config is accepted, and in `CircuitBreaker::new`

use std::collections::HashSet;
use thiserror::Error;

use crate::config::schema::Settings;
use crate::resilience::BreakerConfig;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("breaker name must not be empty")]
    EmptyName,

    #[error("breaker {name}: probe_limit must be at least 1")]
    ProbeLimit { name: String },

    #[error("breaker {name}: failure_rate_threshold must be in (0, 1], got {value}")]
    FailureRateThreshold { name: String, value: f64 },

    #[error("breaker {name} is configured more than once")]
    DuplicateName { name: String },
}

/// Check one breaker's runtime configuration.
pub fn validate_breaker(name: &str, config: &BreakerConfig) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if name.trim().is_empty() {
        errors.push(ValidationError::EmptyName);
    }

    if config.probe_limit == 0 {
        errors.push(ValidationError::ProbeLimit { name: name.to_string() });
    }

    let threshold = config.failure_rate_threshold;
    // NaN fails both comparisons.
    if !(threshold > 0.0 && threshold <= 1.0) {
        errors.push(ValidationError::FailureRateThreshold {
            name: name.to_string(),
            value: threshold,
        });
    }

    errors
}

/// Check the whole configuration file.
pub fn validate_config(settings: &Settings) -> Result<(), Vec<ValidationError>> {
    let mut errors = validate_breaker("defaults", &settings.defaults.to_config());

    let mut seen = HashSet::new();
    for resolved in settings.resolved() {
        if !seen.insert(resolved.name.clone()) {
            errors.push(ValidationError::DuplicateName { name: resolved.name.clone() });
        }
        errors.extend(validate_breaker(&resolved.name, &resolved.settings.to_config()));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::BreakerOverride;

    #[test]
    fn test_defaults_are_valid() {
        assert!(validate_breaker("api", &BreakerConfig::default()).is_empty());
        assert!(validate_config(&Settings::default()).is_ok());
    }

    #[test]
    fn test_threshold_bounds() {
        for bad in [0.0, -0.1, 1.01, f64::NAN] {
            let config = BreakerConfig::default().with_failure_rate_threshold(bad);
            assert_eq!(validate_breaker("api", &config).len(), 1, "threshold {bad} accepted");
        }
        let config = BreakerConfig::default().with_failure_rate_threshold(1.0);
        assert!(validate_breaker("api", &config).is_empty());
    }

    #[test]
    fn test_collects_every_error() {
        let settings = Settings {
            breakers: vec![
                BreakerOverride {
                    name: "sms".into(),
                    probe_limit: Some(0),
                    failure_rate_threshold: Some(2.0),
                    ..Default::default()
                },
                BreakerOverride { name: "sms".into(), ..Default::default() },
                BreakerOverride { name: " ".into(), ..Default::default() },
            ],
            ..Default::default()
        };

        let errors = validate_config(&settings).unwrap_err();
        assert!(errors.contains(&ValidationError::ProbeLimit { name: "sms".into() }));
        assert!(errors.contains(&ValidationError::DuplicateName { name: "sms".into() }));
        assert!(errors.contains(&ValidationError::EmptyName));
        assert!(errors
            .iter()
            .any(|e| matches!(e, ValidationError::FailureRateThreshold { value, .. } if *value == 2.0)));
    }
}
