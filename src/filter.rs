//! Filter chain evaluation and the built-in filters.
//!
//! A filter classifies one completed attempt with a tri-state [`Verdict`]:
//! `Retry` and `BreakChain` both stop the chain (deciding for and against a
//! resend respectively), `Defer` passes the question to the next link. The
//! ordering is significant: `BreakChain` is a hard veto that later links can
//! never override, which is why the idempotent-method filter belongs at the
//! front of a chain.
//!
//! Semantics:
//! - A single filter is evaluated as a chain of length 1.
//! - A closure returning `bool` is a valid filter: `true` maps to `Retry`,
//!   `false` to `Defer`.
//! - An exhausted chain (all links deferred) means no resend.
//!
//! Example
//! ```rust
//! use mulligan::{FilterChain, IdempotentFilter, Method, Outcome, RequestHandle, Response,
//!     StatusFilter};
//!
//! let chain = FilterChain::new()
//!     .link(IdempotentFilter)
//!     .link(StatusFilter::default());
//!
//! let request = RequestHandle::new(Method::Get, "http://localhost/widgets");
//! let outcome = Outcome::completed(Response::new(503));
//! assert!(chain.evaluate(0, &request, &outcome));
//!
//! let post = RequestHandle::new(Method::Post, "http://localhost/widgets");
//! assert!(!chain.evaluate(0, &post, &outcome));
//! ```

use crate::outcome::{Outcome, TransportCode};
use crate::transport::RequestHandle;
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

/// Tri-state result of one filter invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Stop the chain; resend the request.
    Retry,
    /// No opinion; ask the next link.
    Defer,
    /// Stop the chain; veto the resend. Later links never run.
    BreakChain,
}

impl From<bool> for Verdict {
    fn from(retry: bool) -> Self {
        if retry {
            Verdict::Retry
        } else {
            Verdict::Defer
        }
    }
}

/// Classifies whether a completed attempt should be retried.
///
/// Implemented by the built-in filters, by [`FilterChain`] itself, and by any
/// closure of `(retries, request, outcome)` returning a [`Verdict`] or `bool`.
/// Filters hold no per-request state and may be shared across chains.
pub trait Filter: Send + Sync {
    fn verdict(&self, retries: usize, request: &RequestHandle, outcome: &Outcome) -> Verdict;
}

impl<F, V> Filter for F
where
    F: Fn(usize, &RequestHandle, &Outcome) -> V + Send + Sync,
    V: Into<Verdict>,
{
    fn verdict(&self, retries: usize, request: &RequestHandle, outcome: &Outcome) -> Verdict {
        self(retries, request, outcome).into()
    }
}

/// Ordered sequence of filters with short-circuit evaluation.
#[derive(Clone, Default)]
pub struct FilterChain {
    links: Vec<Arc<dyn Filter>>,
}

impl FilterChain {
    pub fn new() -> Self {
        Self { links: Vec::new() }
    }

    /// Append a filter at the end of the chain.
    pub fn link<F>(mut self, filter: F) -> Self
    where
        F: Filter + 'static,
    {
        self.links.push(Arc::new(filter));
        self
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    /// Evaluate links in order: `Retry` stops with `true`, `BreakChain` stops
    /// with `false`, `Defer` moves on. An exhausted chain yields `false`.
    pub fn evaluate(&self, retries: usize, request: &RequestHandle, outcome: &Outcome) -> bool {
        for link in &self.links {
            match link.verdict(retries, request, outcome) {
                Verdict::Retry => return true,
                Verdict::BreakChain => return false,
                Verdict::Defer => {}
            }
        }
        false
    }
}

impl Filter for FilterChain {
    fn verdict(&self, retries: usize, request: &RequestHandle, outcome: &Outcome) -> Verdict {
        self.evaluate(retries, request, outcome).into()
    }
}

impl fmt::Debug for FilterChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterChain").field("links", &self.links.len()).finish()
    }
}

/// Retries completed attempts whose status code is in the configured set.
///
/// Outcomes with no response (pure transport failures) defer; pair with a
/// [`TransportErrorFilter`] to cover those.
#[derive(Debug, Clone)]
pub struct StatusFilter {
    codes: HashSet<u16>,
}

impl StatusFilter {
    /// Status codes retried by default.
    pub const DEFAULT_CODES: [u16; 2] = [500, 503];

    pub fn new<I>(codes: I) -> Self
    where
        I: IntoIterator<Item = u16>,
    {
        Self { codes: codes.into_iter().collect() }
    }
}

impl Default for StatusFilter {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CODES)
    }
}

impl Filter for StatusFilter {
    fn verdict(&self, _retries: usize, _request: &RequestHandle, outcome: &Outcome) -> Verdict {
        match outcome.status() {
            Some(status) if self.codes.contains(&status) => Verdict::Retry,
            _ => Verdict::Defer,
        }
    }
}

/// Retries failed attempts whose transport error code is in the configured set.
#[derive(Debug, Clone)]
pub struct TransportErrorFilter {
    codes: HashSet<TransportCode>,
}

impl TransportErrorFilter {
    pub fn new<I>(codes: I) -> Self
    where
        I: IntoIterator<Item = TransportCode>,
    {
        Self { codes: codes.into_iter().collect() }
    }
}

impl Default for TransportErrorFilter {
    fn default() -> Self {
        Self::new(TransportCode::default_retryable())
    }
}

impl Filter for TransportErrorFilter {
    fn verdict(&self, _retries: usize, _request: &RequestHandle, outcome: &Outcome) -> Verdict {
        match outcome.transport_code() {
            Some(code) if self.codes.contains(&code) => Verdict::Retry,
            _ => Verdict::Defer,
        }
    }
}

/// Vetoes retries for methods that are not idempotent by default.
///
/// `Defer` for GET/HEAD/OPTIONS/PUT/DELETE, `BreakChain` for everything else,
/// independent of the outcome. Place it early in a chain so the veto lands
/// before any status or transport filter can vote to retry.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdempotentFilter;

impl Filter for IdempotentFilter {
    fn verdict(&self, _retries: usize, request: &RequestHandle, _outcome: &Outcome) -> Verdict {
        if request.method().is_idempotent() {
            Verdict::Defer
        } else {
            Verdict::BreakChain
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outcome::{Response, TransportError};
    use crate::transport::Method;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn request() -> RequestHandle {
        RequestHandle::new(Method::Get, "http://localhost/widgets")
    }

    fn status(code: u16) -> Outcome {
        Outcome::completed(Response::new(code))
    }

    fn transport_failure(code: TransportCode) -> Outcome {
        Outcome::failed(TransportError::new(code, "boom"))
    }

    #[test]
    fn bool_maps_to_retry_or_defer() {
        assert_eq!(Verdict::from(true), Verdict::Retry);
        assert_eq!(Verdict::from(false), Verdict::Defer);
    }

    #[test]
    fn closure_returning_bool_is_a_filter() {
        let filter = |_: usize, _: &RequestHandle, outcome: &Outcome| outcome.is_failed();
        assert_eq!(
            filter.verdict(0, &request(), &transport_failure(TransportCode::TimedOut)),
            Verdict::Retry
        );
        assert_eq!(filter.verdict(0, &request(), &status(200)), Verdict::Defer);
    }

    #[test]
    fn retry_short_circuits_later_links() {
        let invoked = std::sync::Arc::new(AtomicUsize::new(0));
        let counter = invoked.clone();
        let chain = FilterChain::new()
            .link(|_: usize, _: &RequestHandle, _: &Outcome| Verdict::Retry)
            .link(move |_: usize, _: &RequestHandle, _: &Outcome| {
                counter.fetch_add(1, Ordering::SeqCst);
                Verdict::Defer
            });
        assert!(chain.evaluate(0, &request(), &status(500)));
        assert_eq!(invoked.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn break_chain_is_a_hard_veto() {
        let invoked = std::sync::Arc::new(AtomicUsize::new(0));
        let counter = invoked.clone();
        let chain = FilterChain::new()
            .link(|_: usize, _: &RequestHandle, _: &Outcome| Verdict::Defer)
            .link(|_: usize, _: &RequestHandle, _: &Outcome| Verdict::BreakChain)
            .link(move |_: usize, _: &RequestHandle, _: &Outcome| {
                counter.fetch_add(1, Ordering::SeqCst);
                Verdict::Retry
            });
        assert!(!chain.evaluate(0, &request(), &status(500)));
        assert_eq!(invoked.load(Ordering::SeqCst), 0, "vetoed link must never run");
    }

    #[test]
    fn exhausted_chain_defers_to_no_resend() {
        let chain = FilterChain::new()
            .link(|_: usize, _: &RequestHandle, _: &Outcome| Verdict::Defer)
            .link(|_: usize, _: &RequestHandle, _: &Outcome| Verdict::Defer);
        assert!(!chain.evaluate(3, &request(), &status(500)));
        assert!(!FilterChain::new().evaluate(0, &request(), &status(500)));
    }

    #[test]
    fn chain_composes_as_a_filter() {
        let inner = FilterChain::new().link(StatusFilter::default());
        let outer = FilterChain::new().link(inner);
        assert_eq!(outer.len(), 1);
        assert!(outer.evaluate(0, &request(), &status(503)));
        assert!(!outer.evaluate(0, &request(), &status(200)));
    }

    #[test]
    fn status_filter_default_set() {
        let filter = StatusFilter::default();
        assert_eq!(filter.verdict(0, &request(), &status(500)), Verdict::Retry);
        assert_eq!(filter.verdict(0, &request(), &status(503)), Verdict::Retry);
        assert_eq!(filter.verdict(0, &request(), &status(200)), Verdict::Defer);
        assert_eq!(filter.verdict(0, &request(), &status(404)), Verdict::Defer);
    }

    #[test]
    fn status_filter_defers_without_a_response() {
        let filter = StatusFilter::default();
        let outcome = transport_failure(TransportCode::ConnectionReset);
        assert_eq!(filter.verdict(0, &request(), &outcome), Verdict::Defer);
    }

    #[test]
    fn status_filter_custom_codes() {
        let filter = StatusFilter::new([429]);
        assert_eq!(filter.verdict(0, &request(), &status(429)), Verdict::Retry);
        assert_eq!(filter.verdict(0, &request(), &status(500)), Verdict::Defer);
    }

    #[test]
    fn transport_filter_default_set() {
        let filter = TransportErrorFilter::default();
        for code in TransportCode::default_retryable() {
            assert_eq!(filter.verdict(0, &request(), &transport_failure(code)), Verdict::Retry);
        }
        assert_eq!(
            filter.verdict(0, &request(), &transport_failure(TransportCode::TooManyRedirects)),
            Verdict::Defer
        );
        assert_eq!(filter.verdict(0, &request(), &status(503)), Verdict::Defer);
    }

    #[test]
    fn idempotent_filter_is_outcome_independent() {
        let filter = IdempotentFilter;
        for outcome in [status(503), transport_failure(TransportCode::TimedOut)] {
            for method in [Method::Get, Method::Head, Method::Options, Method::Put, Method::Delete]
            {
                let request = RequestHandle::new(method, "http://localhost/");
                assert_eq!(filter.verdict(0, &request, &outcome), Verdict::Defer);
            }
            for method in [Method::Post, Method::Patch] {
                let request = RequestHandle::new(method, "http://localhost/");
                assert_eq!(filter.verdict(0, &request, &outcome), Verdict::BreakChain);
            }
        }
    }
}
