//! Attempt outcomes produced by the transport.
//!
//! An [`Outcome`] is the terminal result of exactly one attempt: a completed
//! exchange carrying a status code, or a transport-level failure carrying an
//! error code. A `Completed` outcome may still signal a logical failure
//! through its status (500, 503); status codes and transport errors are
//! separate failure signals, both inspectable from one value. Outcomes are
//! immutable once produced.

use std::fmt;
use std::time::Duration;

/// Transport-layer failure classes.
///
/// Modeled after the usual client error taxonomy: name resolution, connect,
/// reset, timeout, TLS, redirect, protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "config", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "config", serde(rename_all = "snake_case"))]
pub enum TransportCode {
    /// Hostname could not be resolved.
    DnsFailure,
    /// TCP connection could not be established.
    ConnectFailed,
    /// Peer reset an established connection.
    ConnectionReset,
    /// The attempt exceeded a transport deadline.
    TimedOut,
    /// TLS handshake failed.
    TlsHandshake,
    /// Redirect limit exceeded.
    TooManyRedirects,
    /// Peer violated the protocol.
    Protocol,
}

impl TransportCode {
    /// Failure classes that are transient by default: the connection
    /// reset/timeout/DNS family, plus connect and TLS setup failures.
    pub fn default_retryable() -> [TransportCode; 5] {
        [
            TransportCode::DnsFailure,
            TransportCode::ConnectFailed,
            TransportCode::ConnectionReset,
            TransportCode::TimedOut,
            TransportCode::TlsHandshake,
        ]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TransportCode::DnsFailure => "dns failure",
            TransportCode::ConnectFailed => "connect failed",
            TransportCode::ConnectionReset => "connection reset",
            TransportCode::TimedOut => "timed out",
            TransportCode::TlsHandshake => "tls handshake failed",
            TransportCode::TooManyRedirects => "too many redirects",
            TransportCode::Protocol => "protocol error",
        }
    }
}

impl fmt::Display for TransportCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Transfer timing metadata attached to an outcome, for logging.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransferTimings {
    /// Time spent establishing the connection, if measured.
    pub connect: Option<Duration>,
    /// Total time for the attempt, if measured.
    pub total: Option<Duration>,
}

/// Transport-level error carried by a failed attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportError {
    code: TransportCode,
    message: String,
}

impl TransportError {
    pub fn new(code: TransportCode, message: impl Into<String>) -> Self {
        Self { code, message: message.into() }
    }

    pub fn code(&self) -> TransportCode {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.message.is_empty() {
            write!(f, "{}", self.code)
        } else {
            write!(f, "{}: {}", self.code, self.message)
        }
    }
}

impl std::error::Error for TransportError {}

/// Response summary for a completed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Response {
    status: u16,
}

impl Response {
    pub fn new(status: u16) -> Self {
        Self { status }
    }

    pub fn status(self) -> u16 {
        self.status
    }
}

/// Terminal result of one attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The transport produced a response; its status may still signal a
    /// logical failure.
    Completed {
        response: Response,
        timings: TransferTimings,
    },
    /// The attempt never produced a response.
    Failed {
        error: TransportError,
        timings: TransferTimings,
    },
}

impl Outcome {
    pub fn completed(response: Response) -> Self {
        Outcome::Completed { response, timings: TransferTimings::default() }
    }

    pub fn failed(error: TransportError) -> Self {
        Outcome::Failed { error, timings: TransferTimings::default() }
    }

    /// Attach transfer timing metadata.
    pub fn with_timings(mut self, timings: TransferTimings) -> Self {
        match &mut self {
            Outcome::Completed { timings: t, .. } | Outcome::Failed { timings: t, .. } => {
                *t = timings;
            }
        }
        self
    }

    /// Response status code, if a response exists.
    pub fn status(&self) -> Option<u16> {
        match self {
            Outcome::Completed { response, .. } => Some(response.status()),
            Outcome::Failed { .. } => None,
        }
    }

    /// Transport error code, if the attempt failed at the transport layer.
    pub fn transport_code(&self) -> Option<TransportCode> {
        match self {
            Outcome::Failed { error, .. } => Some(error.code()),
            Outcome::Completed { .. } => None,
        }
    }

    /// The transport error, if any.
    pub fn error(&self) -> Option<&TransportError> {
        match self {
            Outcome::Failed { error, .. } => Some(error),
            Outcome::Completed { .. } => None,
        }
    }

    pub fn timings(&self) -> TransferTimings {
        match self {
            Outcome::Completed { timings, .. } | Outcome::Failed { timings, .. } => *timings,
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, Outcome::Completed { .. })
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Outcome::Failed { .. })
    }

    /// Short description used by the logging decorator: the status code for
    /// completed attempts, the error for failed ones.
    pub fn describe(&self) -> String {
        match self {
            Outcome::Completed { response, .. } => response.status().to_string(),
            Outcome::Failed { error, .. } => error.to_string(),
        }
    }
}
