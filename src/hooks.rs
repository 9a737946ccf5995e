//! Lifecycle observation hooks and the records they receive.
//!
//! Hooks are plain callables over immutable records. They return nothing;
//! a panicking hook unwinds through the executor, which is deliberate: the
//! hook runs on the caller's control flow. Internal state (breaker records,
//! time accounting) is always consistent before a hook fires.

use crate::decider::RetryReason;
use crate::error::RequestError;
use crate::outcome::Response;
use http::{Method, StatusCode};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Fired before every attempt is handed to the transport.
#[derive(Debug)]
pub struct RequestInfo<'a> {
    pub url: &'a str,
    pub method: &'a Method,
    /// 1-indexed attempt about to be issued.
    pub attempt: u32,
    pub max_retries: u32,
}

/// Fired after a retry has been scheduled, before the delay elapses.
#[derive(Debug)]
pub struct RetryInfo<'a> {
    pub url: &'a str,
    pub method: &'a Method,
    /// 1-indexed attempt that just failed.
    pub attempt: u32,
    pub max_retries: u32,
    /// Delay about to be slept, after caps and jitter.
    pub wait_time: Duration,
    pub reason: RetryReason,
}

/// Fired once when a call completes successfully.
#[derive(Debug)]
pub struct ResponseInfo<'a> {
    pub url: &'a str,
    pub method: &'a Method,
    /// 1-indexed attempt that produced the response.
    pub attempt: u32,
    pub max_retries: u32,
    pub response: &'a Response,
    pub total_time: Duration,
}

/// Fired once when a call terminates with an error.
#[derive(Debug)]
pub struct FailureInfo<'a> {
    pub url: &'a str,
    pub method: &'a Method,
    pub attempt: u32,
    pub max_retries: u32,
    pub error: &'a RequestError,
    pub status: Option<StatusCode>,
    pub total_time: Duration,
}

pub type RequestHook = Arc<dyn Fn(&RequestInfo<'_>) + Send + Sync>;
pub type RetryHook = Arc<dyn Fn(&RetryInfo<'_>) + Send + Sync>;
pub type ResponseHook = Arc<dyn Fn(&ResponseInfo<'_>) + Send + Sync>;
pub type FailureHook = Arc<dyn Fn(&FailureInfo<'_>) + Send + Sync>;

/// Bundle of the four lifecycle hooks; all optional.
#[derive(Clone, Default)]
pub struct Hooks {
    pub(crate) on_request: Option<RequestHook>,
    pub(crate) on_retry: Option<RetryHook>,
    pub(crate) on_success: Option<ResponseHook>,
    pub(crate) on_failure: Option<FailureHook>,
}

impl Hooks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_request<F>(mut self, hook: F) -> Self
    where
        F: Fn(&RequestInfo<'_>) + Send + Sync + 'static,
    {
        self.on_request = Some(Arc::new(hook));
        self
    }

    pub fn on_retry<F>(mut self, hook: F) -> Self
    where
        F: Fn(&RetryInfo<'_>) + Send + Sync + 'static,
    {
        self.on_retry = Some(Arc::new(hook));
        self
    }

    pub fn on_success<F>(mut self, hook: F) -> Self
    where
        F: Fn(&ResponseInfo<'_>) + Send + Sync + 'static,
    {
        self.on_success = Some(Arc::new(hook));
        self
    }

    pub fn on_failure<F>(mut self, hook: F) -> Self
    where
        F: Fn(&FailureInfo<'_>) + Send + Sync + 'static,
    {
        self.on_failure = Some(Arc::new(hook));
        self
    }

    pub(crate) fn request(&self, info: &RequestInfo<'_>) {
        if let Some(hook) = &self.on_request {
            hook(info);
        }
    }

    pub(crate) fn retry(&self, info: &RetryInfo<'_>) {
        if let Some(hook) = &self.on_retry {
            hook(info);
        }
    }

    pub(crate) fn success(&self, info: &ResponseInfo<'_>) {
        if let Some(hook) = &self.on_success {
            hook(info);
        }
    }

    pub(crate) fn failure(&self, info: &FailureInfo<'_>) {
        if let Some(hook) = &self.on_failure {
            hook(info);
        }
    }
}

impl fmt::Debug for Hooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hooks")
            .field("on_request", &self.on_request.is_some())
            .field("on_retry", &self.on_retry.is_some())
            .field("on_success", &self.on_success.is_some())
            .field("on_failure", &self.on_failure.is_some())
            .finish()
    }
}
