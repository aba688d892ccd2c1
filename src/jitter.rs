//! Jitter strategies to spread retry delays.
//!
//! A fleet of clients retrying on the same schedule hammers a recovering
//! server in lockstep; jitter randomizes each computed delay to spread the
//! load. Which strategy:
//! - `None`: deterministic delays for tests or tightly controlled workflows.
//! - `Full`: uniform in `[0, delay]`.
//! - `Equal`: uniform in `[delay/2, delay]`, keeps a floor while adding
//!   randomness.
//!
//! Notes:
//! - RNG: `rand`'s thread-local RNG by default; deterministic RNGs can be
//!   injected via `apply_with_rng`.
//! - Precision: millisecond conversions saturate to `u64::MAX` on very large
//!   durations.
//!
//! Apply jitter to a policy by wrapping its delay strategy in
//! [`JitteredDelay`]:
//! ```rust
//! use mulligan::{Delay, Jitter, JitteredDelay};
//!
//! let delay = JitteredDelay::new(Delay::exponential(), Jitter::Full);
//! ```

use crate::delay::DelayStrategy;
use crate::error::StrategyError;
use crate::outcome::Outcome;
use crate::transport::RequestHandle;
use rand::{rng, Rng};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Jitter strategy for randomizing retry delays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "config", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "config", serde(rename_all = "snake_case"))]
pub enum Jitter {
    /// Use the exact computed delay.
    None,
    /// Random between 0 and the computed delay.
    Full,
    /// Random between half and the full computed delay.
    Equal,
}

impl Jitter {
    /// Apply jitter to a delay duration.
    pub fn apply(&self, delay: Duration) -> Duration {
        let mut rng = rng();
        self.apply_with_rng(delay, &mut rng)
    }

    /// Apply jitter with a custom RNG (for testing).
    pub fn apply_with_rng<R: Rng>(&self, delay: Duration, rng: &mut R) -> Duration {
        match self {
            Jitter::None => delay,
            Jitter::Full => {
                let millis = Self::as_millis_saturated(delay);
                if millis == 0 {
                    return Duration::ZERO;
                }
                Duration::from_millis(rng.random_range(0..=millis))
            }
            Jitter::Equal => {
                let millis = Self::as_millis_saturated(delay);
                if millis == 0 {
                    return Duration::ZERO;
                }
                let half = millis / 2;
                Duration::from_millis(rng.random_range(half..=millis))
            }
        }
    }

    fn as_millis_saturated(duration: Duration) -> u64 {
        duration.as_millis().try_into().unwrap_or(u64::MAX)
    }
}

/// Delay decorator applying jitter to the wrapped strategy's output.
///
/// A zero delay stays zero, so the default exponential's no-wait first resend
/// is preserved under jitter.
#[derive(Clone)]
pub struct JitteredDelay {
    inner: Arc<dyn DelayStrategy>,
    jitter: Jitter,
}

impl JitteredDelay {
    pub fn new<D>(inner: D, jitter: Jitter) -> Self
    where
        D: DelayStrategy + 'static,
    {
        Self { inner: Arc::new(inner), jitter }
    }
}

impl DelayStrategy for JitteredDelay {
    fn delay(
        &self,
        retries: usize,
        request: &RequestHandle,
        outcome: &Outcome,
    ) -> Result<Duration, StrategyError> {
        Ok(self.jitter.apply(self.inner.delay(retries, request, outcome)?))
    }
}

impl fmt::Debug for JitteredDelay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JitteredDelay")
            .field("inner", &"<delay>")
            .field("jitter", &self.jitter)
            .finish()
    }
}
