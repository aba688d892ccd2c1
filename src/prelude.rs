//! Convenient re-exports for common mulligan types.
pub use crate::{
    delay::{Delay, DelayStrategy, MAX_DELAY},
    error::{ConfigError, RetryError, StrategyError},
    filter::{Filter, FilterChain, IdempotentFilter, StatusFilter, TransportErrorFilter, Verdict},
    jitter::{Jitter, JitteredDelay},
    log::{LogSink, LoggedDelay, MemorySink, RetryRecord, TracingSink},
    outcome::{Outcome, Response, TransferTimings, TransportCode, TransportError},
    retry::{RetryController, RetryPolicy, RetryPolicyBuilder, DEFAULT_MAX_ATTEMPTS},
    service::{RetryLayer, RetryService},
    transport::{Method, RequestHandle, Transport},
    waiter::{InstantWaiter, TokioWaiter, TrackingWaiter, Waiter},
};

#[cfg(feature = "config")]
pub use crate::config::RetryConfig;
