//! Retry layer behavior inside a tower stack.

use mulligan::{
    Delay, InstantWaiter, Method, Outcome, RequestHandle, Response, RetryLayer, RetryPolicy,
    StatusFilter,
};
use std::collections::VecDeque;
use std::convert::Infallible;
use std::future::{ready, Ready};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use std::time::Duration;
use tower::{Layer, Service, ServiceExt};

fn request() -> RequestHandle {
    RequestHandle::new(Method::Get, "http://localhost/widgets")
}

fn status(code: u16) -> Outcome {
    Outcome::completed(Response::new(code))
}

fn policy(max_attempts: usize) -> RetryPolicy {
    RetryPolicy::builder()
        .filter(StatusFilter::default())
        .delay(Delay::constant(Duration::ZERO))
        .max_attempts(max_attempts)
        .waiter(InstantWaiter)
        .build()
        .expect("policy")
}

/// Transport-shaped service serving scripted outcomes and counting calls.
#[derive(Clone)]
struct ScriptedService {
    script: Arc<Mutex<VecDeque<Outcome>>>,
    calls: Arc<AtomicUsize>,
}

impl ScriptedService {
    fn new<I>(outcomes: I) -> Self
    where
        I: IntoIterator<Item = Outcome>,
    {
        Self {
            script: Arc::new(Mutex::new(outcomes.into_iter().collect())),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Service<RequestHandle> for ScriptedService {
    type Response = Outcome;
    type Error = Infallible;
    type Future = Ready<Result<Outcome, Infallible>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Infallible>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, _request: RequestHandle) -> Self::Future {
        self.calls.fetch_add(1, Ordering::SeqCst);
        ready(Ok(self.script.lock().unwrap().pop_front().expect("script exhausted")))
    }
}

#[tokio::test]
async fn layer_retries_through_the_stack() {
    let inner = ScriptedService::new([status(503), status(200)]);
    let mut service = RetryLayer::new(policy(5)).layer(inner.clone());

    let outcome = service.ready().await.expect("ready").call(request()).await.expect("call");

    assert_eq!(outcome.status(), Some(200));
    assert_eq!(inner.calls(), 2, "initial attempt plus one resend");
}

#[tokio::test]
async fn non_retryable_outcome_takes_one_attempt() {
    let inner = ScriptedService::new([status(404)]);
    let mut service = RetryLayer::new(policy(5)).layer(inner.clone());

    let outcome = service.ready().await.expect("ready").call(request()).await.expect("call");

    assert_eq!(outcome.status(), Some(404));
    assert_eq!(inner.calls(), 1);
}

#[tokio::test]
async fn cap_bounds_the_number_of_calls() {
    let inner = ScriptedService::new([status(503), status(503), status(503)]);
    let mut service = RetryLayer::new(policy(2)).layer(inner.clone());

    let outcome = service.ready().await.expect("ready").call(request()).await.expect("call");

    assert_eq!(outcome.status(), Some(503));
    assert_eq!(inner.calls(), 3, "initial attempt plus two resends");
}
