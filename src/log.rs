//! Logging decorator for delay strategies.
//!
//! [`LoggedDelay`] wraps any [`DelayStrategy`]: on each invocation it first
//! computes the delay via the wrapped strategy, then emits one structured
//! [`RetryRecord`] through its [`LogSink`], and returns the delay unchanged;
//! logging never alters retry behavior. The default sink forwards to
//! `tracing`; [`MemorySink`] captures formatted lines for tests.

use crate::delay::DelayStrategy;
use crate::error::StrategyError;
use crate::outcome::Outcome;
use crate::transport::{Method, RequestHandle};
use std::fmt;
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// One retry decision, as seen by the logging decorator.
#[derive(Debug, Clone)]
pub struct RetryRecord {
    pub timestamp: SystemTime,
    pub method: Method,
    pub url: String,
    /// Status code or transport error description of the triggering outcome.
    pub outcome: String,
    /// 1-based attempt number (attempt count + 1).
    pub retries: usize,
    /// Computed wait before the resend.
    pub delay: Duration,
    pub connect_time: Option<Duration>,
    pub total_time: Option<Duration>,
}

impl RetryRecord {
    /// Render the record as a single log line.
    pub fn format(&self) -> String {
        let ts = self.timestamp.duration_since(UNIX_EPOCH).unwrap_or_default().as_secs();
        format!(
            "[{}] {} {} - {} - Retries: {}, Delay: {}, Time: {}, {}",
            ts,
            self.method,
            self.url,
            self.outcome,
            self.retries,
            self.delay.as_millis(),
            Self::secs(self.connect_time),
            Self::secs(self.total_time),
        )
    }

    fn secs(duration: Option<Duration>) -> String {
        match duration {
            Some(d) => format!("{:.3}", d.as_secs_f64()),
            None => "-".to_string(),
        }
    }
}

/// Destination for retry records.
pub trait LogSink: Send + Sync {
    fn record(&self, record: &RetryRecord);
}

/// Default sink forwarding records to `tracing` at info level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn record(&self, record: &RetryRecord) {
        tracing::info!(
            target: "mulligan::retry",
            method = %record.method,
            url = %record.url,
            outcome = %record.outcome,
            retries = record.retries,
            delay_ms = record.delay.as_millis() as u64,
            "{}",
            record.format()
        );
    }
}

/// Sink capturing formatted lines in memory, for tests.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    lines: Arc<Mutex<Vec<String>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().unwrap().clone()
    }
}

impl LogSink for MemorySink {
    fn record(&self, record: &RetryRecord) {
        self.lines.lock().unwrap().push(record.format());
    }
}

/// Delay decorator that logs each computed delay.
#[derive(Clone)]
pub struct LoggedDelay {
    inner: Arc<dyn DelayStrategy>,
    sink: Arc<dyn LogSink>,
}

impl LoggedDelay {
    /// Wrap a strategy, logging through `tracing`.
    pub fn new<D>(inner: D) -> Self
    where
        D: DelayStrategy + 'static,
    {
        Self::with_sink(inner, TracingSink)
    }

    /// Wrap a strategy with a custom sink.
    pub fn with_sink<D, S>(inner: D, sink: S) -> Self
    where
        D: DelayStrategy + 'static,
        S: LogSink + 'static,
    {
        Self { inner: Arc::new(inner), sink: Arc::new(sink) }
    }
}

impl DelayStrategy for LoggedDelay {
    fn delay(
        &self,
        retries: usize,
        request: &RequestHandle,
        outcome: &Outcome,
    ) -> Result<Duration, StrategyError> {
        let delay = self.inner.delay(retries, request, outcome)?;
        let timings = outcome.timings();
        self.sink.record(&RetryRecord {
            timestamp: SystemTime::now(),
            method: request.method(),
            url: request.url().to_string(),
            outcome: outcome.describe(),
            retries: retries + 1,
            delay,
            connect_time: timings.connect,
            total_time: timings.total,
        });
        Ok(delay)
    }
}

impl fmt::Debug for LoggedDelay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoggedDelay")
            .field("inner", &"<delay>")
            .field("sink", &"<sink>")
            .finish()
    }
}
