//! Abstraction for the wait between attempts.
//!
//! Enables fast, deterministic tests without real time delays. The waiter
//! receives the outcome that triggered the wait so adaptive implementations
//! can inspect it (e.g. honor a server-provided pacing hint); the built-in
//! waiters ignore it.

use crate::error::StrategyError;
use crate::outcome::Outcome;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Suspension primitive applied between attempts.
///
/// A fault is fatal for the logical request: the controller surfaces it
/// instead of retrying.
pub trait Waiter: Send + Sync + std::fmt::Debug {
    fn wait<'a>(
        &'a self,
        delay: Duration,
        outcome: &'a Outcome,
    ) -> Pin<Box<dyn Future<Output = Result<(), StrategyError>> + Send + 'a>>;
}

/// Production waiter backed by the tokio timer.
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioWaiter;

impl Waiter for TokioWaiter {
    fn wait<'a>(
        &'a self,
        delay: Duration,
        _outcome: &'a Outcome,
    ) -> Pin<Box<dyn Future<Output = Result<(), StrategyError>> + Send + 'a>> {
        Box::pin(async move {
            tokio::time::sleep(delay).await;
            Ok(())
        })
    }
}

/// Test waiter that doesn't actually wait.
#[derive(Debug, Default, Clone, Copy)]
pub struct InstantWaiter;

impl Waiter for InstantWaiter {
    fn wait<'a>(
        &'a self,
        _delay: Duration,
        _outcome: &'a Outcome,
    ) -> Pin<Box<dyn Future<Output = Result<(), StrategyError>> + Send + 'a>> {
        Box::pin(async { Ok(()) })
    }
}

/// Test waiter that records every requested delay.
#[derive(Debug, Clone)]
pub struct TrackingWaiter {
    calls: Arc<Mutex<Vec<Duration>>>,
}

impl TrackingWaiter {
    pub fn new() -> Self {
        Self { calls: Arc::new(Mutex::new(Vec::new())) }
    }

    pub fn calls(&self) -> Vec<Duration> {
        self.calls.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.calls.lock().unwrap().clear();
    }
}

impl Default for TrackingWaiter {
    fn default() -> Self {
        Self::new()
    }
}

impl Waiter for TrackingWaiter {
    fn wait<'a>(
        &'a self,
        delay: Duration,
        _outcome: &'a Outcome,
    ) -> Pin<Box<dyn Future<Output = Result<(), StrategyError>> + Send + 'a>> {
        self.calls.lock().unwrap().push(delay);
        Box::pin(async { Ok(()) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outcome::Response;

    fn outcome() -> Outcome {
        Outcome::completed(Response::new(503))
    }

    #[tokio::test]
    async fn instant_waiter_doesnt_wait() {
        let start = std::time::Instant::now();
        InstantWaiter.wait(Duration::from_secs(10), &outcome()).await.unwrap();
        assert!(start.elapsed() < Duration::from_millis(100));
    }

    #[tokio::test]
    async fn tracking_waiter_records_calls() {
        let waiter = TrackingWaiter::new();
        waiter.wait(Duration::from_millis(100), &outcome()).await.unwrap();
        waiter.wait(Duration::from_millis(200), &outcome()).await.unwrap();
        waiter.wait(Duration::from_millis(400), &outcome()).await.unwrap();

        let calls = waiter.calls();
        assert_eq!(calls.len(), 3);
        assert_eq!(calls[0], Duration::from_millis(100));
        assert_eq!(calls[1], Duration::from_millis(200));
        assert_eq!(calls[2], Duration::from_millis(400));
    }

    #[tokio::test]
    async fn tracking_waiter_can_clear() {
        let waiter = TrackingWaiter::new();
        waiter.wait(Duration::from_millis(100), &outcome()).await.unwrap();
        assert_eq!(waiter.calls().len(), 1);

        waiter.clear();
        assert!(waiter.calls().is_empty());
    }

    #[tokio::test]
    async fn tokio_waiter_actually_waits() {
        let start = std::time::Instant::now();
        TokioWaiter.wait(Duration::from_millis(50), &outcome()).await.unwrap();
        // Small tolerance for timing jitter
        assert!(start.elapsed() >= Duration::from_millis(45));
    }
}
