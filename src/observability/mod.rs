//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Breakers produce:
//!     → transition notifications (TracingListener by default)
//!         → structured log event (tracing)
//!         → metrics.rs (transition counter, state gauge)
//!     → rejections → metrics.rs (rejection counter)
//!
//! Consumers:
//!     → logging.rs subscriber (stdout)
//!     → whichever `metrics` recorder the host installs
//! ```
//!
//! # Design Decisions
//! - The breaker only produces (name, from, to); formatting and routing live here
//! - Metrics are no-ops until a recorder is installed

pub mod logging;
pub mod metrics;

use crate::resilience::{BreakerState, TransitionListener};

/// Default transition listener: one log event plus metrics per transition.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingListener;

impl TransitionListener for TracingListener {
    fn on_transition(&self, name: &str, from: BreakerState, to: BreakerState) {
        match to {
            BreakerState::Open => {
                tracing::warn!(breaker = %name, from = %from, to = %to, "Circuit breaker state changed");
            }
            _ => {
                tracing::info!(breaker = %name, from = %from, to = %to, "Circuit breaker state changed");
            }
        }
        metrics::record_transition(name, from, to);
    }
}
