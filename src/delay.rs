//! Delay strategies governing the wait before each resend.
//!
//! Delays are computed in milliseconds throughout; the waiter receives a
//! `Duration`, so no unit mismatch can occur between the two. Attempt
//! semantics: `retries` is the number of resends already issued, so the
//! default exponential strategy yields no wait before the very first resend
//! (`delay(0) = 0`, the fractional half-step truncates) and doubles from
//! there: `delay(n) = base * 2^(n-1)`.
//!
//! Built-in strategies saturate at [`MAX_DELAY`] when a computation would
//! overflow; custom strategies pass their value through uncapped.
//!
//! Example
//! ```rust
//! use std::time::Duration;
//! use mulligan::{Delay, DelayStrategy, Method, Outcome, RequestHandle, Response};
//!
//! let delay = Delay::exponential();
//! let request = RequestHandle::new(Method::Get, "http://localhost/widgets");
//! let outcome = Outcome::completed(Response::new(503));
//! assert_eq!(delay.delay(0, &request, &outcome).unwrap(), Duration::ZERO);
//! assert_eq!(delay.delay(1, &request, &outcome).unwrap(), Duration::from_millis(1));
//! assert_eq!(delay.delay(4, &request, &outcome).unwrap(), Duration::from_millis(8));
//! ```

use crate::error::StrategyError;
use crate::outcome::Outcome;
use crate::transport::RequestHandle;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Maximum delay used when calculations overflow (1 day).
pub const MAX_DELAY: Duration = Duration::from_secs(24 * 60 * 60);

/// Computes the wait before a resend from the attempt count and outcome.
///
/// A fault from a strategy is fatal for the logical request: the controller
/// surfaces it instead of retrying.
pub trait DelayStrategy: Send + Sync {
    fn delay(
        &self,
        retries: usize,
        request: &RequestHandle,
        outcome: &Outcome,
    ) -> Result<Duration, StrategyError>;
}

type CustomFn =
    dyn Fn(usize, &RequestHandle, &Outcome) -> Result<Duration, StrategyError> + Send + Sync;

#[derive(Clone)]
enum DelayKind {
    Constant(Duration),
    Exponential { base: Duration },
    Custom(Arc<CustomFn>),
}

/// Built-in delay strategies.
#[derive(Clone)]
pub struct Delay {
    kind: DelayKind,
}

impl Delay {
    /// Constant delay before every resend.
    pub fn constant(delay: Duration) -> Self {
        Self { kind: DelayKind::Constant(delay) }
    }

    /// Default exponential backoff with a 1 ms base: `0, 1, 2, 4, 8, ...` ms.
    pub fn exponential() -> Self {
        Self::exponential_with_base(Duration::from_millis(1))
    }

    /// Exponential backoff over a custom base: `delay(n) = base * 2^(n-1)`,
    /// with `delay(0) = 0`.
    pub fn exponential_with_base(base: Duration) -> Self {
        Self { kind: DelayKind::Exponential { base } }
    }

    /// Arbitrary fallible strategy. The returned value is passed through
    /// uncapped; an `Err` aborts the retry cycle for the logical request.
    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(usize, &RequestHandle, &Outcome) -> Result<Duration, StrategyError>
            + Send
            + Sync
            + 'static,
    {
        Self { kind: DelayKind::Custom(Arc::new(f)) }
    }

    fn exponential_delay(base: Duration, retries: usize) -> Duration {
        if retries == 0 {
            // 2^(n-1) at n = 0 is a fractional half-step that truncates to
            // zero: the first resend goes out without a wait.
            return Duration::ZERO;
        }
        let exponent = retries.saturating_sub(1).min(u32::MAX as usize) as u32;
        let multiplier = 2u128.saturating_pow(exponent);
        let nanos = base.as_nanos().saturating_mul(multiplier);
        Duration::from_nanos(nanos.min(MAX_DELAY.as_nanos()) as u64)
    }
}

impl DelayStrategy for Delay {
    fn delay(
        &self,
        retries: usize,
        request: &RequestHandle,
        outcome: &Outcome,
    ) -> Result<Duration, StrategyError> {
        match &self.kind {
            DelayKind::Constant(delay) => Ok(*delay),
            DelayKind::Exponential { base } => Ok(Self::exponential_delay(*base, retries)),
            DelayKind::Custom(f) => f(retries, request, outcome),
        }
    }
}

impl fmt::Debug for Delay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            DelayKind::Constant(delay) => f.debug_tuple("Constant").field(delay).finish(),
            DelayKind::Exponential { base } => {
                f.debug_struct("Exponential").field("base", base).finish()
            }
            DelayKind::Custom(_) => f.write_str("Custom(<fn>)"),
        }
    }
}
