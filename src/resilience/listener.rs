//! Transition notifications.

use crate::resilience::state::BreakerState;

/// Receives `(breaker name, previous state, new state)` on every state change.
///
/// Called after the breaker lock is released, so implementations may query
/// the breaker. Closures with the matching signature implement this trait.
pub trait TransitionListener: Send + Sync {
    fn on_transition(&self, name: &str, from: BreakerState, to: BreakerState);
}

impl<F> TransitionListener for F
where
    F: Fn(&str, BreakerState, BreakerState) + Send + Sync,
{
    fn on_transition(&self, name: &str, from: BreakerState, to: BreakerState) {
        self(name, from, to)
    }
}
