//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (read & deserialize)
//!     → validation.rs (semantic checks)
//!     → Settings (validated, immutable)
//!     → BreakerRegistry builds breakers from it on demand
//! ```
//!
//! # Design Decisions
//! - All fields have defaults to allow minimal configs
//! - Per-breaker overrides only name what differs from `[defaults]`
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{BreakerOverride, BreakerSettings, ObservabilityConfig, Settings};
pub use validation::ValidationError;
