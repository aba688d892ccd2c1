#![forbid(unsafe_code)]
#![deny(warnings)]
#![cfg_attr(not(test), deny(clippy::all))]

//! # Mulligan ⛳
//!
//! Transport-retry policy engine for HTTP clients: given a request that has
//! completed (with a response or a transport failure), decide whether to
//! resend it, how long to wait first, and how many resends may occur before
//! the failure reaches the caller, then splice the resend's outcome into the
//! original completion so the caller only ever sees the final one.
//!
//! ## Features
//!
//! - **Filter chains** with tri-state verdicts (retry / defer / veto) and
//!   ordered short-circuiting
//! - **Built-in filters** for status codes, transport error classes, and
//!   idempotent-method gating
//! - **Exponential backoff** (milliseconds, `2^(n-1)` with no wait before the
//!   first resend) plus constant and custom strategies
//! - **Decorators**: jitter and structured delay logging, composable around
//!   any strategy
//! - **Injectable waiters** for deterministic tests
//! - **Tower layer** for service-shaped transports
//!
//! ## Quick Start
//!
//! ```rust
//! use mulligan::{Delay, FilterChain, IdempotentFilter, RetryPolicy, StatusFilter,
//!     TransportErrorFilter};
//!
//! let policy = RetryPolicy::builder()
//!     .filter(
//!         FilterChain::new()
//!             .link(IdempotentFilter)
//!             .link(StatusFilter::default())
//!             .link(TransportErrorFilter::default()),
//!     )
//!     .delay(Delay::exponential())
//!     .max_attempts(3)
//!     .build()
//!     .unwrap();
//! assert_eq!(policy.max_attempts(), 3);
//! ```
//!
//! Hand the policy to a [`RetryController`] together with your transport, and
//! call [`RetryController::settle`] whenever a request reaches a terminal
//! outcome.

#[cfg(feature = "config")]
pub mod config;
pub mod delay;
pub mod error;
pub mod filter;
pub mod jitter;
pub mod log;
pub mod outcome;
pub mod prelude;
pub mod retry;
pub mod service;
pub mod transport;
pub mod waiter;

// Re-exports
pub use delay::{Delay, DelayStrategy, MAX_DELAY};
pub use error::{ConfigError, RetryError, StrategyError};
pub use filter::{
    Filter, FilterChain, IdempotentFilter, StatusFilter, TransportErrorFilter, Verdict,
};
pub use jitter::{Jitter, JitteredDelay};
pub use log::{LogSink, LoggedDelay, MemorySink, RetryRecord, TracingSink};
pub use outcome::{Outcome, Response, TransferTimings, TransportCode, TransportError};
pub use retry::{RetryController, RetryPolicy, RetryPolicyBuilder, DEFAULT_MAX_ATTEMPTS};
pub use service::{RetryLayer, RetryService};
pub use transport::{Method, RequestHandle, Transport, UnknownMethod};
pub use waiter::{InstantWaiter, TokioWaiter, TrackingWaiter, Waiter};

#[cfg(feature = "config")]
pub use config::RetryConfig;
