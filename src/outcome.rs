//! Attempt outcomes as produced by the transport capability.

use http::{HeaderMap, StatusCode};
use std::fmt;

/// A complete HTTP response as observed by the resilience core.
///
/// The body is whatever the transport chose to buffer; streaming bodies never
/// reach the core (see [`crate::RequestSpec::streaming`]).
#[derive(Debug, Clone)]
pub struct Response {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl Response {
    /// A response with the given status and no headers or body.
    pub fn new(status: StatusCode) -> Self {
        Self { status, headers: HeaderMap::new(), body: Vec::new() }
    }

    /// Attach a header, replacing any previous value under the same name.
    pub fn with_header(mut self, name: http::HeaderName, value: http::HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Attach a buffered body.
    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }
}

/// Coarse classification of a transport-level failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportErrorKind {
    /// The connection could not be established (DNS, TCP, TLS).
    Connect,
    /// The connection was established but reading or writing failed.
    Io,
    /// The peer violated the protocol (malformed response, bad framing).
    Protocol,
    /// The request could not be serialized or was rejected before sending.
    InvalidRequest,
}

impl fmt::Display for TransportErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TransportErrorKind::Connect => "connect",
            TransportErrorKind::Io => "io",
            TransportErrorKind::Protocol => "protocol",
            TransportErrorKind::InvalidRequest => "invalid request",
        };
        write!(f, "{label}")
    }
}

/// A transport-level failure with its underlying cause.
#[derive(Debug)]
pub struct TransportError {
    pub kind: TransportErrorKind,
    pub cause: Box<dyn std::error::Error + Send + Sync>,
}

impl TransportError {
    pub fn new(
        kind: TransportErrorKind,
        cause: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self { kind, cause: cause.into() }
    }
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "transport {} error: {}", self.kind, self.cause)
    }
}

impl std::error::Error for TransportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&*self.cause as &(dyn std::error::Error + 'static))
    }
}

/// Marker error for attempts that exceeded the transport deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimedOut;

impl fmt::Display for TimedOut {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "the attempt timed out")
    }
}

impl std::error::Error for TimedOut {}

/// Result of one transport invocation.
#[derive(Debug)]
pub enum AttemptOutcome {
    /// The server answered; any status code, including errors.
    Response(Response),
    /// The attempt exceeded the transport deadline.
    TransportTimeout,
    /// The attempt failed below the HTTP layer.
    TransportError(TransportError),
}

impl AttemptOutcome {
    /// Status code, when the outcome is a response.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            AttemptOutcome::Response(response) => Some(response.status),
            _ => None,
        }
    }
}
