//! Errors returned by a protected call.

use thiserror::Error;

/// Outcome of a call that did not produce a value.
///
/// Rejections (`Open`, `TooManyRequests`) mean the operation never ran.
/// `Inner` carries the operation's own error untouched.
#[derive(Debug, Error)]
pub enum BreakerError<E> {
    /// The breaker is open and failing fast.
    #[error("circuit breaker {name} is open")]
    Open { name: String },

    /// The breaker is half-open and its probe quota is used up.
    #[error("circuit breaker {name} is half-open, too many requests")]
    TooManyRequests { name: String },

    /// The protected operation failed.
    #[error("{0}")]
    Inner(E),
}

impl<E> BreakerError<E> {
    /// True when the breaker refused the call without running it.
    pub fn is_rejected(&self) -> bool {
        matches!(self, BreakerError::Open { .. } | BreakerError::TooManyRequests { .. })
    }

    /// The operation's error, if the operation ran and failed.
    pub fn into_inner(self) -> Option<E> {
        match self {
            BreakerError::Inner(e) => Some(e),
            _ => None,
        }
    }

    /// Label used for metrics and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            BreakerError::Open { .. } => "open",
            BreakerError::TooManyRequests { .. } => "too_many_requests",
            BreakerError::Inner(_) => "operation",
        }
    }
}
