//! State-transition policy.
//!
//! # Responsibilities
//! - Evaluate time-based transitions lazily (window rollover, Open → HalfOpen)
//! - Decide admission for the current state
//! - Apply recorded outcomes and trip/close the breaker
//!
//! # Design Decisions
//! - No locking and no clock access here; callers pass `now` and hold the lock
//! - Every transition bumps the generation so in-flight outcomes from an older
//!   window can be recognised by a single integer comparison
//! - Transitions are returned, not emitted; the breaker notifies after unlocking

use tokio::time::Instant;

use crate::resilience::config::BreakerConfig;
use crate::resilience::counts::Counts;
use crate::resilience::state::BreakerState;

/// A state change produced by the policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: BreakerState,
    pub to: BreakerState,
}

/// Why admission was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Rejection {
    Open,
    TooManyRequests,
}

#[derive(Debug)]
pub(crate) struct Machine {
    state: BreakerState,
    generation: u64,
    counts: Counts,
    expiry: Option<Instant>,
}

impl Machine {
    pub(crate) fn new(config: &BreakerConfig, now: Instant) -> Self {
        Self {
            state: BreakerState::Closed,
            generation: 0,
            counts: Counts::default(),
            expiry: Some(now + config.closed_window),
        }
    }

    pub(crate) fn generation(&self) -> u64 {
        self.generation
    }

    pub(crate) fn counts(&self) -> Counts {
        self.counts
    }

    /// Apply any due time-based change and return the resulting state and
    /// generation.
    pub(crate) fn current_state(
        &mut self,
        config: &BreakerConfig,
        now: Instant,
    ) -> (BreakerState, u64, Option<Transition>) {
        let mut transition = None;

        match self.state {
            BreakerState::Closed => {
                if matches!(self.expiry, Some(expiry) if now >= expiry) {
                    // Stale window: fresh counts, same state.
                    self.new_generation(config, now);
                }
            }
            BreakerState::Open => {
                if self.expiry.map_or(true, |expiry| now >= expiry) {
                    transition = self.set_state(BreakerState::HalfOpen, config, now);
                }
            }
            BreakerState::HalfOpen => {}
        }

        (self.state, self.generation, transition)
    }

    /// Admit one call in `state`, counting it against the window.
    pub(crate) fn admit(&mut self, state: BreakerState, config: &BreakerConfig) -> Result<(), Rejection> {
        match state {
            BreakerState::Open => return Err(Rejection::Open),
            BreakerState::HalfOpen if self.counts.requests >= config.probe_limit => {
                return Err(Rejection::TooManyRequests);
            }
            _ => {}
        }

        self.counts.on_request();
        Ok(())
    }

    pub(crate) fn on_success(
        &mut self,
        state: BreakerState,
        config: &BreakerConfig,
        now: Instant,
    ) -> Option<Transition> {
        self.counts.on_success();

        if state == BreakerState::HalfOpen && self.counts.consecutive_successes >= config.probe_limit {
            return self.set_state(BreakerState::Closed, config, now);
        }
        None
    }

    pub(crate) fn on_failure(
        &mut self,
        state: BreakerState,
        config: &BreakerConfig,
        now: Instant,
    ) -> Option<Transition> {
        self.counts.on_failure();

        match state {
            BreakerState::HalfOpen => self.set_state(BreakerState::Open, config, now),
            BreakerState::Closed => {
                if self.counts.requests >= config.min_requests
                    && self.counts.failure_rate() >= config.failure_rate_threshold
                {
                    self.set_state(BreakerState::Open, config, now)
                } else {
                    None
                }
            }
            BreakerState::Open => None,
        }
    }

    /// Force the machine back to Closed with a fresh window.
    pub(crate) fn reset(&mut self, config: &BreakerConfig, now: Instant) -> Option<Transition> {
        let from = self.state;
        self.state = BreakerState::Closed;
        self.new_generation(config, now);

        (from != BreakerState::Closed).then_some(Transition {
            from,
            to: BreakerState::Closed,
        })
    }

    fn set_state(&mut self, to: BreakerState, config: &BreakerConfig, now: Instant) -> Option<Transition> {
        if self.state == to {
            return None;
        }

        let from = self.state;
        self.state = to;
        self.new_generation(config, now);

        Some(Transition { from, to })
    }

    fn new_generation(&mut self, config: &BreakerConfig, now: Instant) {
        self.generation += 1;
        self.counts.clear();

        self.expiry = match self.state {
            BreakerState::Closed => Some(now + config.closed_window),
            BreakerState::Open => Some(now + config.open_duration),
            BreakerState::HalfOpen => None,
        };
    }
}
