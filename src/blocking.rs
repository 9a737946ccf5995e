//! Blocking client mirroring [`crate::Client`].
//!
//! Same configuration shape, same merge semantics, same engine underneath;
//! delays park the calling thread instead of yielding to a runtime.

use crate::config::{RetryConfig, RetryOverrides};
use crate::error::RequestError;
use crate::executor;
use crate::outcome::Response;
use crate::sleeper::{BlockingSleeper, ThreadSleeper};
use crate::transport::{BlockingTransport, RequestSpec};
use std::sync::Arc;

/// Blocking client over a [`BlockingTransport`].
pub struct BlockingClient {
    transport: Arc<dyn BlockingTransport>,
    config: RetryConfig,
    owns_transport: bool,
    sleeper: Arc<dyn BlockingSleeper>,
}

impl BlockingClient {
    /// Client that owns its transport; `close` will shut the transport down.
    pub fn new(transport: impl BlockingTransport + 'static, config: RetryConfig) -> Self {
        Self {
            transport: Arc::new(transport),
            config,
            owns_transport: true,
            sleeper: Arc::new(ThreadSleeper),
        }
    }

    /// Client over an externally managed transport; `close` leaves it alone.
    pub fn with_shared(transport: Arc<dyn BlockingTransport>, config: RetryConfig) -> Self {
        Self { transport, config, owns_transport: false, sleeper: Arc::new(ThreadSleeper) }
    }

    /// Swap the sleep implementation, mainly for tests.
    pub fn with_sleeper(mut self, sleeper: impl BlockingSleeper + 'static) -> Self {
        self.sleeper = Arc::new(sleeper);
        self
    }

    pub fn config(&self) -> &RetryConfig {
        &self.config
    }

    /// Issue one logical request under the client defaults.
    pub fn request(&self, spec: &RequestSpec) -> Result<Response, RequestError> {
        let config = self.call_config(spec, None);
        executor::execute_blocking(spec, &config, &*self.transport, &*self.sleeper)
    }

    /// Issue one logical request with per-call overrides applied.
    pub fn request_with(
        &self,
        spec: &RequestSpec,
        overrides: RetryOverrides,
    ) -> Result<Response, RequestError> {
        let config = self.call_config(spec, Some(overrides));
        executor::execute_blocking(spec, &config, &*self.transport, &*self.sleeper)
    }

    /// Release the transport when this client owns it.
    pub fn close(self) {
        if self.owns_transport {
            self.transport.close();
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
