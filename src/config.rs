//! Policy configuration loadable from serialized settings.
//!
//! Gated behind the `config` feature. The declarative form covers the
//! built-in filters and delays; bespoke filters or waiters still go through
//! [`RetryPolicy::builder`].

use crate::delay::Delay;
use crate::error::ConfigError;
use crate::filter::{FilterChain, IdempotentFilter, StatusFilter, TransportErrorFilter};
use crate::jitter::{Jitter, JitteredDelay};
use crate::log::LoggedDelay;
use crate::outcome::TransportCode;
use crate::retry::{RetryPolicy, DEFAULT_MAX_ATTEMPTS};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Declarative retry settings.
///
/// All fields have defaults, so `{}` deserializes to the stock policy:
/// 5 resends, statuses 500/503, the transient transport error family,
/// 1 ms exponential base, no jitter, no delay logging.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RetryConfig {
    /// Resend cap per logical request.
    pub max_attempts: usize,
    /// Status codes retried by the built-in status filter.
    pub status_codes: Vec<u16>,
    /// Transport error classes retried by the built-in transport filter.
    pub transport_codes: Vec<TransportCode>,
    /// Veto retries for non-idempotent methods.
    pub idempotent_only: bool,
    /// Base delay for exponential backoff, in milliseconds.
    pub base_delay_ms: u64,
    /// Jitter applied on top of the computed delay.
    pub jitter: Jitter,
    /// Log each computed delay through `tracing`.
    pub log_delays: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            status_codes: StatusFilter::DEFAULT_CODES.to_vec(),
            transport_codes: TransportCode::default_retryable().to_vec(),
            idempotent_only: false,
            base_delay_ms: 1,
            jitter: Jitter::None,
            log_delays: false,
        }
    }
}

impl RetryConfig {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Build the policy described by these settings.
    pub fn into_policy(self) -> Result<RetryPolicy, ConfigError> {
        let mut chain = FilterChain::new();
        if self.idempotent_only {
            chain = chain.link(IdempotentFilter);
        }
        chain = chain
            .link(StatusFilter::new(self.status_codes))
            .link(TransportErrorFilter::new(self.transport_codes));

        let base = Delay::exponential_with_base(Duration::from_millis(self.base_delay_ms));
        let builder = RetryPolicy::builder().filter(chain).max_attempts(self.max_attempts);
        let builder = match (self.jitter, self.log_delays) {
            (Jitter::None, false) => builder.delay(base),
            (jitter, false) => builder.delay(JitteredDelay::new(base, jitter)),
            (Jitter::None, true) => builder.delay(LoggedDelay::new(base)),
            (jitter, true) => builder.delay(LoggedDelay::new(JitteredDelay::new(base, jitter))),
        };
        builder.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outcome::{Outcome, Response};
    use crate::retry::RetryController;
    use crate::transport::{Method, RequestHandle, Transport};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[derive(Debug, Default)]
    struct CountingTransport {
        resends: AtomicUsize,
    }

    #[async_trait]
    impl Transport for CountingTransport {
        async fn resend(&self, _request: &RequestHandle) -> Outcome {
            self.resends.fetch_add(1, Ordering::SeqCst);
            Outcome::completed(Response::new(200))
        }
    }

    #[test]
    fn empty_json_yields_stock_settings() {
        let config = RetryConfig::from_json("{}").expect("parse");
        assert_eq!(config, RetryConfig::default());
        assert_eq!(config.max_attempts, 5);
        assert_eq!(config.status_codes, vec![500, 503]);
        assert!(!config.idempotent_only);
    }

    #[test]
    fn full_json_round_trips() {
        let json = r#"{
            "max_attempts": 3,
            "status_codes": [429, 503],
            "transport_codes": ["timed_out", "connection_reset"],
            "idempotent_only": true,
            "base_delay_ms": 50,
            "jitter": "full",
            "log_delays": true
        }"#;
        let config = RetryConfig::from_json(json).expect("parse");
        assert_eq!(config.max_attempts, 3);
        assert_eq!(config.status_codes, vec![429, 503]);
        assert_eq!(
            config.transport_codes,
            vec![TransportCode::TimedOut, TransportCode::ConnectionReset]
        );
        assert!(config.idempotent_only);
        assert_eq!(config.base_delay_ms, 50);
        assert_eq!(config.jitter, Jitter::Full);
        assert!(config.log_delays);

        let reparsed =
            RetryConfig::from_json(&serde_json::to_string(&config).expect("serialize"))
                .expect("reparse");
        assert_eq!(reparsed, config);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        assert!(RetryConfig::from_json(r#"{"max_retries": 3}"#).is_err());
    }

    #[tokio::test]
    async fn idempotent_only_vetoes_post_resends() {
        let config = RetryConfig { idempotent_only: true, ..RetryConfig::default() };
        let policy = config.into_policy().expect("policy");
        let transport = Arc::new(CountingTransport::default());
        let controller = RetryController::new(policy, transport.clone());

        let request = RequestHandle::new(Method::Post, "http://localhost/widgets");
        let settled = controller
            .settle(&request, Outcome::completed(Response::new(503)))
            .await
            .expect("settle");

        assert_eq!(settled.status(), Some(503));
        assert_eq!(transport.resends.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn stock_policy_retries_a_503() {
        let policy = RetryConfig::default().into_policy().expect("policy");
        let transport = Arc::new(CountingTransport::default());
        let controller = RetryController::new(policy, transport.clone());

        let request = RequestHandle::new(Method::Get, "http://localhost/widgets");
        let settled = controller
            .settle(&request, Outcome::completed(Response::new(503)))
            .await
            .expect("settle");

        assert_eq!(settled.status(), Some(200));
        assert_eq!(transport.resends.load(Ordering::SeqCst), 1);
    }
}
