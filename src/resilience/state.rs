//! Breaker state.
//!
//! # States
//! - Closed: calls pass through, outcomes are counted
//! - Open: calls fail fast until the open duration elapses
//! - HalfOpen: a limited number of probe calls test recovery
//!
//! # State Transitions
//! ```text
//! Closed → Open: requests >= min_requests and failure rate >= threshold
//! Open → HalfOpen: open duration elapsed (evaluated lazily)
//! HalfOpen → Closed: consecutive successes >= probe_limit
//! HalfOpen → Open: any recorded failure
//! any → Closed: reset()
//! ```

use std::fmt;
use serde::Serialize;

/// Breaker state.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BreakerState {
    /// Allowing calls.
    #[default]
    Closed = 0,
    /// Probing with a bounded number of trial calls.
    HalfOpen = 1,
    /// Rejecting calls.
    Open = 2,
}

impl BreakerState {
    pub fn as_str(&self) -> &'static str {
        match self {
            BreakerState::Closed => "closed",
            BreakerState::HalfOpen => "half_open",
            BreakerState::Open => "open",
        }
    }
}

impl fmt::Display for BreakerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
