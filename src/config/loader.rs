//! Configuration loading from disk.

use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::config::schema::Settings;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<Settings, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parse and validate configuration from TOML text.
pub fn parse_config(content: &str) -> Result<Settings, ConfigError> {
    let settings: Settings = toml::from_str(content)?;
    validate_config(&settings).map_err(ConfigError::Validation)?;
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_uses_defaults() {
        let settings = parse_config("").unwrap();
        assert_eq!(settings.observability.log_level, "info");
        assert_eq!(settings.defaults.probe_limit, 3);
        assert!(settings.breakers.is_empty());
    }

    #[test]
    fn test_parse_overrides() {
        let settings = parse_config(
            r#"
            [defaults]
            min_requests = 20

            [[breakers]]
            name = "sms"
            open_duration_secs = 15
            "#,
        )
        .unwrap();

        let sms = settings.settings_for("sms");
        assert_eq!(sms.min_requests, 20);
        assert_eq!(sms.open_duration_secs, 15);
    }

    #[test]
    fn test_validation_errors_are_joined() {
        let err = parse_config(
            r#"
            [defaults]
            probe_limit = 0
            failure_rate_threshold = 0.0
            "#,
        )
        .unwrap_err();

        assert_eq!(
            err.to_string(),
            "Validation failed: breaker defaults: probe_limit must be at least 1, \
             breaker defaults: failure_rate_threshold must be in (0, 1], got 0"
        );
    }

    #[test]
    fn test_syntax_error() {
        assert!(matches!(parse_config("defaults = ["), Err(ConfigError::Parse(_))));
    }
}
