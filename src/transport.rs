//! Request handles and the transport collaborator seam.
//!
//! The engine never performs network I/O itself. It holds an opaque
//! [`RequestHandle`] (method and target URL, nothing else) and asks the
//! [`Transport`] to execute the same request again when a resend is due.

use crate::outcome::Outcome;
use async_trait::async_trait;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// HTTP request method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Head,
    Options,
    Put,
    Delete,
    Post,
    Patch,
    Connect,
    Trace,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Head => "HEAD",
            Method::Options => "OPTIONS",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
            Method::Post => "POST",
            Method::Patch => "PATCH",
            Method::Connect => "CONNECT",
            Method::Trace => "TRACE",
        }
    }

    /// Methods safe to replay without a dedicated opt-in.
    ///
    /// Deliberately conservative: CONNECT and TRACE are excluded even though
    /// TRACE is idempotent on paper.
    pub fn is_idempotent(self) -> bool {
        matches!(
            self,
            Method::Get | Method::Head | Method::Options | Method::Put | Method::Delete
        )
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unrecognized method name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownMethod(pub String);

impl fmt::Display for UnknownMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown HTTP method: {}", self.0)
    }
}

impl std::error::Error for UnknownMethod {}

impl FromStr for Method {
    type Err = UnknownMethod;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(Method::Get),
            "HEAD" => Ok(Method::Head),
            "OPTIONS" => Ok(Method::Options),
            "PUT" => Ok(Method::Put),
            "DELETE" => Ok(Method::Delete),
            "POST" => Ok(Method::Post),
            "PATCH" => Ok(Method::Patch),
            "CONNECT" => Ok(Method::Connect),
            "TRACE" => Ok(Method::Trace),
            _ => Err(UnknownMethod(s.to_string())),
        }
    }
}

/// Opaque handle for one logical request.
///
/// The engine never inspects or mutates the request body; it reads the method
/// and URL and hands the handle back to the transport for resends. Attempt
/// state is threaded through the controller, never stored on the handle, so
/// concurrent logical requests stay isolated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestHandle {
    method: Method,
    url: String,
}

impl RequestHandle {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self { method, url: url.into() }
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

/// Transport collaborator able to execute a request again.
///
/// A resend that cannot be issued at all must be reported as an
/// [`Outcome::Failed`] value; it then re-enters the normal
/// filter/delay/cap cycle like any other outcome.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Execute the request once more, yielding the outcome of the new attempt.
    async fn resend(&self, request: &RequestHandle) -> Outcome;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn resend(&self, request: &RequestHandle) -> Outcome {
        (**self).resend(request).await
    }
}
