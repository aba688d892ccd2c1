//! Error types for the retry engine.
//!
//! Two failure families exist and never mix: configuration errors are raised
//! once, at build time, before any request is processed; controller faults
//! (`RetryError`) are raised mid-flight when a user-supplied delay strategy
//! or waiter fails. Transport-level failures are not errors at this layer at
//! all: they travel as [`Outcome::Failed`](crate::Outcome::Failed) values
//! and re-enter the normal filter/delay/cap cycle.

use thiserror::Error;

/// Boxed error produced by user-supplied delay strategies and waiters.
pub type StrategyError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors produced while building a retry policy.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A retry policy cannot be built without a filter.
    #[error("retry policy requires a filter")]
    MissingFilter,
}

/// Hard failures raised by the retry controller itself.
///
/// These bypass retry accounting: a faulty delay strategy or waiter is never
/// retried, and the fault surfaces to the caller in place of an outcome.
#[derive(Debug, Error)]
pub enum RetryError {
    /// The delay strategy failed while computing the wait before a resend.
    #[error("delay strategy failed after {retries} resends")]
    Delay {
        /// Resends already issued when the fault occurred.
        retries: usize,
        #[source]
        source: StrategyError,
    },
    /// The waiter failed while applying the computed delay.
    #[error("waiter failed after {retries} resends")]
    Wait {
        /// Resends already issued when the fault occurred.
        retries: usize,
        #[source]
        source: StrategyError,
    },
}

impl RetryError {
    /// Number of resends already issued when the fault occurred.
    pub fn retries(&self) -> usize {
        match self {
            Self::Delay { retries, .. } | Self::Wait { retries, .. } => *retries,
        }
    }

    /// Check if this fault came from the delay strategy.
    pub fn is_delay(&self) -> bool {
        matches!(self, Self::Delay { .. })
    }

    /// Check if this fault came from the waiter.
    pub fn is_wait(&self) -> bool {
        matches!(self, Self::Wait { .. })
    }
}
