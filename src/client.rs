//! Scoped async client binding a transport to default retry configuration.

use crate::config::{RetryConfig, RetryOverrides};
use crate::error::RequestError;
use crate::executor;
use crate::outcome::Response;
use crate::sleeper::{Sleeper, TokioSleeper};
use crate::transport::{RequestSpec, Transport};
use std::sync::Arc;

/// Async client: a transport handle plus the retry defaults every call
/// starts from.
///
/// The transport handle is either owned (constructed for this client;
/// [`Client::close`] shuts it down) or borrowed (shared `Arc`; closing is the
/// owner's business). Per-call overrides are merged right-biased onto the
/// defaults, so a call can swap any single knob without rebuilding the
/// client.
pub struct Client {
    transport: Arc<dyn Transport>,
    config: RetryConfig,
    owns_transport: bool,
    sleeper: Arc<dyn Sleeper>,
}

impl Client {
    /// Client that owns its transport; `close` will shut the transport down.
    pub fn new(transport: impl Transport + 'static, config: RetryConfig) -> Self {
        Self {
            transport: Arc::new(transport),
            config,
            owns_transport: true,
            sleeper: Arc::new(TokioSleeper),
        }
    }

    /// Client over an externally managed transport; `close` leaves it alone.
    pub fn with_shared(transport: Arc<dyn Transport>, config: RetryConfig) -> Self {
        Self { transport, config, owns_transport: false, sleeper: Arc::new(TokioSleeper) }
    }

    /// Swap the sleep implementation, mainly for tests.
    pub fn with_sleeper(mut self, sleeper: impl Sleeper + 'static) -> Self {
        self.sleeper = Arc::new(sleeper);
        self
    }

    pub fn config(&self) -> &RetryConfig {
        &self.config
    }

    /// Issue one logical request under the client defaults.
    pub async fn request(&self, spec: &RequestSpec) -> Result<Response, RequestError> {
        let config = self.call_config(spec, None);
        executor::execute(spec, &config, &*self.transport, &*self.sleeper).await
    }

    /// Issue one logical request with per-call overrides applied.
    pub async fn request_with(
        &self,
        spec: &RequestSpec,
        overrides: RetryOverrides,
    ) -> Result<Response, RequestError> {
        let config = self.call_config(spec, Some(overrides));
        executor::execute(spec, &config, &*self.transport, &*self.sleeper).await
    }

    /// Release the transport when this client owns it.
    pub async fn close(self) {
        if self.owns_transport {
            self.transport.close().await;
        }
    }

    fn call_config(&self, spec: &RequestSpec, overrides: Option<RetryOverrides>) -> RetryConfig {
        let mut config = match overrides {
            Some(overrides) => self.config.merge(&overrides),
            None => self.config.clone(),
        };
        // A streaming body cannot be replayed.
        if spec.streaming {
            config.max_retries = 0;
        }
        config
    }
}
