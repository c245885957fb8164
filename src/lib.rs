//! Circuit breakers for calls to unreliable dependencies.
//!
//! # Architecture Overview
//!
//! ```text
//!     caller ──call(op)──▶ ┌──────────────────────────────────────────┐
//!                          │              CircuitBreaker               │
//!                          │  admission ─▶ op (unlocked) ─▶ outcome    │
//!                          │      │                           │        │
//!                          │      ▼                           ▼        │
//!                          │   machine (state, generation, expiry)     │
//!                          │      │                                    │
//!                          │      ▼                                    │
//!                          │   counts (window)                         │
//!                          └──────────────┬────────────────────────────┘
//!                                         │ (name, from, to)
//!                                         ▼
//!                               observability (log + metrics)
//! ```
//!
//! - `resilience`: the breaker, its state machine and the registry
//! - `config`: TOML settings, defaults and validation
//! - `observability`: logging setup, metrics and the default listener

// Core
pub mod resilience;

// Cross-cutting concerns
pub mod config;
pub mod observability;

pub use config::Settings;
pub use resilience::{
    BreakerConfig, BreakerError, BreakerRegistry, BreakerSnapshot, BreakerState, CircuitBreaker,
    Counts, TransitionListener,
};
