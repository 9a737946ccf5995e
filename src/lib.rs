#![forbid(unsafe_code)]

//! # resilient-http
//!
//! The resilience core of an HTTP client: retry policies, backoff schedules,
//! circuit breakers, time budgets, and lifecycle hooks, all over an injected
//! transport. The crate never touches sockets; it turns one logical request
//! into a governed sequence of attempts against whatever transport you hand
//! it.
//!
//! ## Features
//!
//! - **Backoff strategies**: constant, linear, exponential, Fibonacci, with
//!   per-delay caps, proportional jitter, and `Retry-After` honoring
//! - **Circuit breaker** with half-open probing, shared across calls
//! - **Per-call overrides** merged onto immutable client defaults
//! - **Lifecycle hooks** for request, retry, success, and failure
//! - **Two execution models**, async and blocking, driven by one decision
//!   core so their observable behavior cannot drift apart
//!
//! ## Quick Start
//!
//! ```rust
//! use std::time::Duration;
//! use async_trait::async_trait;
//! use resilient_http::{
//!     AttemptOutcome, Backoff, Client, RequestSpec, Response, RetryConfig, Transport,
//! };
//!
//! struct AlwaysOk;
//!
//! #[async_trait]
//! impl Transport for AlwaysOk {
//!     async fn send(&self, _spec: &RequestSpec) -> AttemptOutcome {
//!         AttemptOutcome::Response(Response::new(http::StatusCode::OK))
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = RetryConfig::builder()
//!         .max_retries(4)
//!         .backoff(Backoff::exponential(Duration::from_millis(200)))
//!         .jitter_factor(0.2)
//!         .build()?;
//!
//!     let client = Client::new(AlwaysOk, config);
//!     let response = client.request(&RequestSpec::get("https://example.com/health")).await?;
//!     assert_eq!(response.status, http::StatusCode::OK);
//!     client.close().await;
//!     Ok(())
//! }
//! ```

mod backoff;
mod blocking;
mod circuit_breaker;
mod client;
mod config;
mod decider;
mod error;
mod executor;
mod hooks;
mod jitter;
mod outcome;
mod retry_after;
mod sleeper;
mod transport;

// Re-exports
pub use backoff::{Backoff, MAX_BACKOFF};
pub use blocking::BlockingClient;
pub use circuit_breaker::{
    default_classifier, BreakerConfigError, BreakerPermit, BreakerRejection, CircuitBreaker,
    CircuitState, Clock, FailureClassifier, MonotonicClock,
};
pub use client::Client;
pub use config::{
    default_retryable_statuses, ConfigError, RetryConfig, RetryConfigBuilder, RetryOverrides,
    RetryPredicate, DEFAULT_BACKOFF_BASE, DEFAULT_MAX_RETRIES,
};
pub use decider::{decide, Decision, FailureCause, RetryReason};
pub use error::{BoxError, ErrorKind, RequestError};
pub use executor::{execute, execute_blocking};
pub use hooks::{
    FailureHook, FailureInfo, Hooks, RequestHook, RequestInfo, ResponseHook, ResponseInfo,
    RetryHook, RetryInfo,
};
pub use jitter::{Jitter, JitterError};
pub use outcome::{AttemptOutcome, Response, TimedOut, TransportError, TransportErrorKind};
pub use sleeper::{
    BlockingSleeper, InstantSleeper, Sleeper, ThreadSleeper, TokioSleeper, TrackingSleeper,
};
pub use transport::{BlockingTransport, RequestSpec, Transport, DEFAULT_TIMEOUT};

pub mod prelude;
