//! The injected request-issuing capability and the caller's request intent.
//!
//! Transports own everything below the resilience core: connection pooling,
//! TLS, redirects, protocol negotiation. The core only ever calls `send` and,
//! at client shutdown, `close`.

use crate::outcome::AttemptOutcome;
use async_trait::async_trait;
use http::{HeaderMap, HeaderName, HeaderValue, Method};
use std::time::Duration;

/// Applied when neither the request nor the caller supplies a timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// A single logical request as handed to the executor.
///
/// Everything beyond the URL and method is passed through to the transport
/// verbatim; the core never inspects headers or body except to honor
/// `Retry-After` on responses.
#[derive(Debug, Clone)]
pub struct RequestSpec {
    pub url: String,
    pub method: Method,
    pub headers: HeaderMap,
    pub body: Option<Vec<u8>>,
    pub timeout: Option<Duration>,
    /// Streaming bodies cannot be replayed, so the client disables retry
    /// for requests that carry this flag.
    pub streaming: bool,
}

impl RequestSpec {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method,
            headers: HeaderMap::new(),
            body: None,
            timeout: None,
            streaming: false,
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::GET, url)
    }

    pub fn post(url: impl Into<String>) -> Self {
        Self::new(Method::POST, url)
    }

    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn streaming(mut self) -> Self {
        self.streaming = true;
        self
    }

    /// Timeout the transport should enforce for each attempt.
    pub fn timeout_or_default(&self) -> Duration {
        self.timeout.unwrap_or(DEFAULT_TIMEOUT)
    }
}

/// Async request-issuing capability.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Issue one attempt. Transport-level problems are reported through the
    /// outcome, never by panicking.
    async fn send(&self, spec: &RequestSpec) -> AttemptOutcome;

    /// Release held resources; a no-op for stateless transports.
    async fn close(&self) {}
}

/// Blocking mirror of [`Transport`].
pub trait BlockingTransport: Send + Sync {
    fn send(&self, spec: &RequestSpec) -> AttemptOutcome;

    fn close(&self) {}
}
