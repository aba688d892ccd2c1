//! Retry policy and controller.
//!
//! The policy is the immutable decision bundle: filter, delay strategy,
//! resend cap, waiter. The controller owns the per-request loop, splicing
//! each resend's outcome into the original completion so the caller observes
//! exactly one terminal outcome per logical request.
//!
//! Semantics:
//! - `max_attempts` counts resends per logical request (the original
//!   submission is attempt count 0); default 5.
//! - A resend is issued only when the attempt count is below the cap AND the
//!   filter yields `Retry`. The cap is checked first, so on exhaustion the
//!   filter has been consulted exactly `max_attempts` times.
//! - Exhaustion and filter vetoes are not errors: the last outcome is
//!   delivered as-is. Only delay/waiter faults surface as [`RetryError`].
//! - Attempt state lives inside the `settle` future; dropping the future
//!   cancels all further retries for that logical request.
//!
//! Example
//! ```rust
//! use mulligan::{
//!     Delay, InstantWaiter, Method, Outcome, RequestHandle, Response, RetryController,
//!     RetryPolicy, StatusFilter, Transport,
//! };
//!
//! struct Recovering;
//!
//! #[async_trait::async_trait]
//! impl Transport for Recovering {
//!     async fn resend(&self, _request: &RequestHandle) -> Outcome {
//!         Outcome::completed(Response::new(200))
//!     }
//! }
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let policy = RetryPolicy::builder()
//!     .filter(StatusFilter::default())
//!     .delay(Delay::exponential())
//!     .max_attempts(2)
//!     .waiter(InstantWaiter)
//!     .build()
//!     .unwrap();
//! let controller = RetryController::new(policy, Recovering);
//!
//! let request = RequestHandle::new(Method::Get, "http://localhost/health");
//! let first = Outcome::completed(Response::new(503));
//! let settled = controller.settle(&request, first).await.unwrap();
//! assert_eq!(settled.status(), Some(200));
//! # });
//! ```

use crate::delay::{Delay, DelayStrategy};
use crate::error::{ConfigError, RetryError};
use crate::filter::{Filter, Verdict};
use crate::outcome::Outcome;
use crate::transport::{RequestHandle, Transport};
use crate::waiter::{TokioWaiter, Waiter};
use std::fmt;
use std::sync::Arc;

/// Default resend cap per logical request.
pub const DEFAULT_MAX_ATTEMPTS: usize = 5;

/// Immutable retry configuration, shared read-only across all logical
/// requests a controller handles.
#[derive(Clone)]
pub struct RetryPolicy {
    filter: Arc<dyn Filter>,
    delay: Arc<dyn DelayStrategy>,
    max_attempts: usize,
    waiter: Arc<dyn Waiter>,
}

impl fmt::Debug for RetryPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryPolicy")
            .field("filter", &"<filter>")
            .field("delay", &"<delay>")
            .field("max_attempts", &self.max_attempts)
            .field("waiter", &self.waiter)
            .finish()
    }
}

impl RetryPolicy {
    /// Construct a new builder with defaults.
    pub fn builder() -> RetryPolicyBuilder {
        RetryPolicyBuilder::new()
    }

    pub fn max_attempts(&self) -> usize {
        self.max_attempts
    }

    /// Decision half of the retry state machine for one completed attempt.
    ///
    /// Given the outcome of attempt count `retries`, consults the cap and
    /// then the filter; when both allow a resend, computes the delay and
    /// waits it out. `Ok(true)` means the caller should issue the resend and
    /// feed the new outcome back in with `retries + 1`.
    ///
    /// A fault from the delay strategy or waiter is fatal and bypasses retry
    /// accounting.
    pub async fn should_resend(
        &self,
        retries: usize,
        request: &RequestHandle,
        outcome: &Outcome,
    ) -> Result<bool, RetryError> {
        if retries >= self.max_attempts {
            tracing::debug!(
                target: "mulligan::retry",
                retries,
                max_attempts = self.max_attempts,
                url = request.url(),
                "retry budget exhausted"
            );
            return Ok(false);
        }
        if self.filter.verdict(retries, request, outcome) != Verdict::Retry {
            return Ok(false);
        }
        let delay = self
            .delay
            .delay(retries, request, outcome)
            .map_err(|source| RetryError::Delay { retries, source })?;
        self.waiter
            .wait(delay, outcome)
            .await
            .map_err(|source| RetryError::Wait { retries, source })?;
        Ok(true)
    }
}

/// Builder for [`RetryPolicy`].
///
/// A filter is required; everything else has defaults: exponential delay,
/// `max_attempts = 5`, real-time waiter.
pub struct RetryPolicyBuilder {
    filter: Option<Arc<dyn Filter>>,
    delay: Arc<dyn DelayStrategy>,
    max_attempts: usize,
    waiter: Arc<dyn Waiter>,
}

impl RetryPolicyBuilder {
    pub fn new() -> Self {
        Self {
            filter: None,
            delay: Arc::new(Delay::exponential()),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            waiter: Arc::new(TokioWaiter),
        }
    }

    /// Set the filter deciding which outcomes are retried. Required; compose
    /// multiple filters with [`FilterChain`](crate::FilterChain).
    pub fn filter<F>(mut self, filter: F) -> Self
    where
        F: Filter + 'static,
    {
        self.filter = Some(Arc::new(filter));
        self
    }

    /// Set the delay strategy. Defaults to exponential backoff.
    pub fn delay<D>(mut self, delay: D) -> Self
    where
        D: DelayStrategy + 'static,
    {
        self.delay = Arc::new(delay);
        self
    }

    /// Set the resend cap per logical request.
    pub fn max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Provide a custom waiter implementation.
    pub fn waiter<W>(mut self, waiter: W) -> Self
    where
        W: Waiter + 'static,
    {
        self.waiter = Arc::new(waiter);
        self
    }

    /// Build the policy, validating the configuration.
    pub fn build(self) -> Result<RetryPolicy, ConfigError> {
        let filter = self.filter.ok_or(ConfigError::MissingFilter)?;
        Ok(RetryPolicy {
            filter,
            delay: self.delay,
            max_attempts: self.max_attempts,
            waiter: self.waiter,
        })
    }
}

impl Default for RetryPolicyBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Orchestrates resends for one transport.
pub struct RetryController<T> {
    policy: RetryPolicy,
    transport: T,
}

impl<T: Transport> RetryController<T> {
    pub fn new(policy: RetryPolicy, transport: T) -> Self {
        Self { policy, transport }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Entry point invoked when a request reaches a terminal outcome.
    ///
    /// Runs the filter/delay/resend cycle until the policy settles, then
    /// returns the final outcome: intermediate failed outcomes are replaced
    /// by the outcome of the resend, so the caller observes exactly one
    /// terminal outcome per logical request. Attempts are strictly
    /// sequential; a request is never resent while a previous attempt's
    /// outcome is outstanding.
    pub async fn settle(
        &self,
        request: &RequestHandle,
        outcome: Outcome,
    ) -> Result<Outcome, RetryError> {
        let mut retries = 0usize;
        let mut outcome = outcome;
        while self.policy.should_resend(retries, request, &outcome).await? {
            retries += 1;
            outcome = self.transport.resend(request).await;
        }
        Ok(outcome)
    }
}
