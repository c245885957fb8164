//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Caller invokes CircuitBreaker::call / call_async:
//!     → circuit_breaker.rs (lock, admission decision)
//!         → machine.rs (lazy rollover / Open → HalfOpen, admission rules)
//!         → counts.rs (request counted against the window)
//!     → operation runs unlocked, guarded by guard.rs
//!     → circuit_breaker.rs (lock, generation check)
//!         → machine.rs (record outcome, trip / close)
//!     → listener.rs (transition notification, in order, after unlock)
//! ```
//!
//! # Design Decisions
//! - Each breaker is independent, local, in-memory state
//! - Rejections are returned to the caller; nothing is retried internally
//! - Operation errors pass through untouched inside `BreakerError::Inner`

pub mod circuit_breaker;
pub mod config;
pub mod counts;
pub mod error;
mod guard;
pub mod listener;
mod machine;
pub mod registry;
pub mod state;

pub use circuit_breaker::{BreakerSnapshot, CircuitBreaker};
pub use config::BreakerConfig;
pub use counts::Counts;
pub use error::BreakerError;
pub use listener::TransitionListener;
pub use machine::Transition;
pub use registry::BreakerRegistry;
pub use state::BreakerState;
