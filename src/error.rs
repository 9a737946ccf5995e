//! The single error surface raised by failed calls.

use crate::outcome::Response;
use http::{Method, StatusCode};
use std::fmt;
use std::time::Duration;

/// Boxed error used wherever user code supplies the cause.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Why a call failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The response status was outside the retryable set (or the predicate
    /// declined it).
    NonRetryableStatus,
    /// The retry limit was reached while the last outcome was still
    /// retryable.
    RetriesExhausted,
    /// The next scheduled delay would have overrun `max_total_time`.
    BudgetExhausted,
    /// The circuit breaker rejected admission.
    BreakerOpen,
    /// The transport failed in a way the policy marks as non-retryable.
    TransportFatal,
    /// The user predicate itself failed.
    PredicateError,
}

/// Terminal error for one logical call.
///
/// Carries enough context to reproduce the failure: method, URL, attempt
/// count, total elapsed time, the last observed status, and the underlying
/// cause chain. For status-shaped failures the final response rides along.
#[derive(Debug)]
pub struct RequestError {
    kind: ErrorKind,
    method: Method,
    url: String,
    attempts: u32,
    elapsed: Duration,
    last_status: Option<StatusCode>,
    response: Option<Response>,
    source: Option<BoxError>,
}

impl RequestError {
    pub(crate) fn new(
        kind: ErrorKind,
        method: Method,
        url: String,
        attempts: u32,
        elapsed: Duration,
    ) -> Self {
        Self { kind, method, url, attempts, elapsed, last_status: None, response: None, source: None }
    }

    pub(crate) fn with_status(mut self, status: Option<StatusCode>) -> Self {
        self.last_status = status;
        self
    }

    pub(crate) fn with_response(mut self, response: Response) -> Self {
        self.last_status = Some(response.status);
        self.response = Some(response);
        self
    }

    pub(crate) fn with_source(mut self, source: impl Into<BoxError>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Number of attempts issued before the call gave up.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Wall-clock time spent across all attempts and delays.
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn last_status(&self) -> Option<StatusCode> {
        self.last_status
    }

    /// The final response, when the failure was status-shaped.
    pub fn response(&self) -> Option<&Response> {
        self.response.as_ref()
    }

    /// Take ownership of the final response, when present.
    pub fn into_response(self) -> Option<Response> {
        self.response
    }

    pub fn is_retries_exhausted(&self) -> bool {
        self.kind == ErrorKind::RetriesExhausted
    }

    pub fn is_breaker_open(&self) -> bool {
        self.kind == ErrorKind::BreakerOpen
    }

    pub fn is_budget_exhausted(&self) -> bool {
        self.kind == ErrorKind::BudgetExhausted
    }
}

impl fmt::Display for RequestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} failed: ", self.method, self.url)?;
        match self.kind {
            ErrorKind::NonRetryableStatus => {
                if let Some(status) = self.last_status {
                    write!(f, "non-retryable status {status}")?;
                } else {
                    write!(f, "non-retryable status")?;
                }
            }
            ErrorKind::RetriesExhausted => {
                write!(f, "retries exhausted")?;
                if let Some(status) = self.last_status {
                    write!(f, " (last status {status})")?;
                }
            }
            ErrorKind::BudgetExhausted => write!(f, "time budget exhausted")?,
            ErrorKind::BreakerOpen => write!(f, "circuit breaker open")?,
            ErrorKind::TransportFatal => write!(f, "non-retryable transport error")?,
            ErrorKind::PredicateError => write!(f, "retry predicate failed")?,
        }
        write!(f, " after {} attempt(s) in {:?}", self.attempts, self.elapsed)
    }
}

impl std::error::Error for RequestError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source.as_deref().map(|cause| cause as &(dyn std::error::Error + 'static))
    }
}
