//! Convenient re-exports for common resilient-http types.
pub use crate::{
    backoff::Backoff,
    blocking::BlockingClient,
    circuit_breaker::{CircuitBreaker, CircuitState},
    client::Client,
    config::{RetryConfig, RetryConfigBuilder, RetryOverrides},
    error::{ErrorKind, RequestError},
    hooks::Hooks,
    jitter::Jitter,
    outcome::{AttemptOutcome, Response, TransportError, TransportErrorKind},
    transport::{BlockingTransport, RequestSpec, Transport},
};
