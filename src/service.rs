//! Tower-native retry layer.
//!
//! Wraps a transport-shaped `Service` so the initial attempt and any resends
//! happen behind one `call`. The inner service is infallible at the type
//! level: attempt failures are reported as [`Outcome::Failed`] values, which
//! re-enter the filter/delay/cap cycle like any other outcome. Only
//! delay/waiter faults surface through the error channel.

use crate::error::RetryError;
use crate::outcome::Outcome;
use crate::retry::RetryPolicy;
use crate::transport::RequestHandle;
use futures::future::BoxFuture;
use std::convert::Infallible;
use std::task::{Context, Poll};
use tower_layer::Layer;
use tower_service::Service;

/// Layer applying a retry policy to a transport service.
#[derive(Clone, Debug)]
pub struct RetryLayer {
    policy: RetryPolicy,
}

impl RetryLayer {
    pub fn new(policy: RetryPolicy) -> Self {
        Self { policy }
    }
}

impl<S> Layer<S> for RetryLayer {
    type Service = RetryService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        RetryService { inner, policy: self.policy.clone() }
    }
}

/// Retry service produced by [`RetryLayer`].
#[derive(Clone, Debug)]
pub struct RetryService<S> {
    inner: S,
    policy: RetryPolicy,
}

impl<S> Service<RequestHandle> for RetryService<S>
where
    S: Service<RequestHandle, Response = Outcome, Error = Infallible> + Clone + Send + 'static,
    S::Future: Send,
{
    type Response = Outcome;
    type Error = RetryError;
    type Future = BoxFuture<'static, Result<Outcome, RetryError>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), RetryError>> {
        self.inner.poll_ready(cx).map_err(|never| match never {})
    }

    fn call(&mut self, request: RequestHandle) -> Self::Future {
        let policy = self.policy.clone();
        let mut inner = self.inner.clone();
        Box::pin(async move {
            let mut outcome = match inner.call(request.clone()).await {
                Ok(outcome) => outcome,
                Err(never) => match never {},
            };
            let mut retries = 0usize;
            while policy.should_resend(retries, &request, &outcome).await? {
                retries += 1;
                outcome = match inner.call(request.clone()).await {
                    Ok(outcome) => outcome,
                    Err(never) => match never {},
                };
            }
            Ok(outcome)
        })
    }
}
