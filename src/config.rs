//! Retry configuration: immutable per-client defaults, per-call overrides.

use crate::backoff::Backoff;
use crate::circuit_breaker::CircuitBreaker;
use crate::error::BoxError;
use crate::hooks::Hooks;
use crate::jitter::{Jitter, JitterError};
use crate::outcome::AttemptOutcome;
use http::StatusCode;
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Attempt cap applied when the caller does not override it.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Base of the default exponential schedule.
pub const DEFAULT_BACKOFF_BASE: Duration = Duration::from_millis(300);

/// Statuses retried when no predicate overrides the decision.
pub fn default_retryable_statuses() -> BTreeSet<StatusCode> {
    BTreeSet::from([
        StatusCode::TOO_MANY_REQUESTS,
        StatusCode::INTERNAL_SERVER_ERROR,
        StatusCode::BAD_GATEWAY,
        StatusCode::SERVICE_UNAVAILABLE,
        StatusCode::GATEWAY_TIMEOUT,
    ])
}

/// User decision function over the latest outcome.
///
/// `Ok(true)` schedules a retry, `Ok(false)` declines one; `Err` terminates
/// the call with [`crate::ErrorKind::PredicateError`].
pub type RetryPredicate = Arc<dyn Fn(&AttemptOutcome) -> Result<bool, BoxError> + Send + Sync>;

/// Raised when configuration values are out of range.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(transparent)]
    Jitter(#[from] JitterError),
}

/// Immutable settings bundle governing one call (or a client's defaults).
#[derive(Clone)]
pub struct RetryConfig {
    pub(crate) max_retries: u32,
    pub(crate) backoff: Backoff,
    pub(crate) jitter: Jitter,
    pub(crate) retryable_statuses: BTreeSet<StatusCode>,
    pub(crate) predicate: Option<RetryPredicate>,
    pub(crate) max_total_time: Option<Duration>,
    pub(crate) max_wait_time: Option<Duration>,
    pub(crate) breaker: Option<CircuitBreaker>,
    pub(crate) hooks: Hooks,
}

impl RetryConfig {
    pub fn builder() -> RetryConfigBuilder {
        RetryConfigBuilder::new()
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    pub fn backoff(&self) -> &Backoff {
        &self.backoff
    }

    pub fn jitter(&self) -> Jitter {
        self.jitter
    }

    pub fn retryable_statuses(&self) -> &BTreeSet<StatusCode> {
        &self.retryable_statuses
    }

    pub fn predicate(&self) -> Option<&RetryPredicate> {
        self.predicate.as_ref()
    }

    pub fn max_total_time(&self) -> Option<Duration> {
        self.max_total_time
    }

    pub fn max_wait_time(&self) -> Option<Duration> {
        self.max_wait_time
    }

    pub fn breaker(&self) -> Option<&CircuitBreaker> {
        self.breaker.as_ref()
    }

    pub fn hooks(&self) -> &Hooks {
        &self.hooks
    }

    /// Produce a new config with every explicitly overridden field replaced.
    ///
    /// The merge is right-biased: an override beats the client default,
    /// which beats the built-in default. Structural fields (predicate,
    /// breaker, hooks, backoff) replace wholesale.
    pub fn merge(&self, overrides: &RetryOverrides) -> RetryConfig {
        RetryConfig {
            max_retries: overrides.max_retries.unwrap_or(self.max_retries),
            backoff: overrides.backoff.clone().unwrap_or_else(|| self.backoff.clone()),
            jitter: overrides.jitter.unwrap_or(self.jitter),
            retryable_statuses: overrides
                .retryable_statuses
                .clone()
                .unwrap_or_else(|| self.retryable_statuses.clone()),
            predicate: overrides.predicate.clone().or_else(|| self.predicate.clone()),
            max_total_time: overrides.max_total_time.or(self.max_total_time),
            max_wait_time: overrides.max_wait_time.or(self.max_wait_time),
            breaker: overrides.breaker.clone().or_else(|| self.breaker.clone()),
            hooks: overrides.hooks.clone().unwrap_or_else(|| self.hooks.clone()),
        }
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            backoff: Backoff::exponential(DEFAULT_BACKOFF_BASE),
            jitter: Jitter::NONE,
            retryable_statuses: default_retryable_statuses(),
            predicate: None,
            max_total_time: None,
            max_wait_time: None,
            breaker: None,
            hooks: Hooks::default(),
        }
    }
}

impl fmt::Debug for RetryConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryConfig")
            .field("max_retries", &self.max_retries)
            .field("backoff", &self.backoff)
            .field("jitter", &self.jitter)
            .field("retryable_statuses", &self.retryable_statuses)
            .field("predicate", &self.predicate.is_some())
            .field("max_total_time", &self.max_total_time)
            .field("max_wait_time", &self.max_wait_time)
            .field("breaker", &self.breaker)
            .field("hooks", &self.hooks)
            .finish()
    }
}

/// Builder for [`RetryConfig`]; `build` validates the jitter factor.
pub struct RetryConfigBuilder {
    config: RetryConfig,
    jitter_factor: f64,
}

impl RetryConfigBuilder {
    pub fn new() -> Self {
        Self { config: RetryConfig::default(), jitter_factor: 0.0 }
    }

    pub fn max_retries(mut self, max_retries: u32) -> Self {
        self.config.max_retries = max_retries;
        self
    }

    pub fn backoff(mut self, backoff: Backoff) -> Self {
        self.config.backoff = backoff;
        self
    }

    /// Jitter factor in `[0.0, 1.0]`; validated by [`RetryConfigBuilder::build`].
    pub fn jitter_factor(mut self, factor: f64) -> Self {
        self.jitter_factor = factor;
        self
    }

    pub fn retryable_statuses(mut self, statuses: impl IntoIterator<Item = StatusCode>) -> Self {
        self.config.retryable_statuses = statuses.into_iter().collect();
        self
    }

    pub fn predicate<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&AttemptOutcome) -> Result<bool, BoxError> + Send + Sync + 'static,
    {
        self.config.predicate = Some(Arc::new(predicate));
        self
    }

    pub fn max_total_time(mut self, budget: Duration) -> Self {
        self.config.max_total_time = Some(budget);
        self
    }

    pub fn max_wait_time(mut self, cap: Duration) -> Self {
        self.config.max_wait_time = Some(cap);
        self
    }

    pub fn breaker(mut self, breaker: CircuitBreaker) -> Self {
        self.config.breaker = Some(breaker);
        self
    }

    pub fn hooks(mut self, hooks: Hooks) -> Self {
        self.config.hooks = hooks;
        self
    }

    pub fn build(mut self) -> Result<RetryConfig, ConfigError> {
        self.config.jitter = Jitter::new(self.jitter_factor)?;
        Ok(self.config)
    }
}

impl Default for RetryConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Per-call replacements; a `None` field keeps the client default.
///
/// The jitter override carries an already-validated [`Jitter`] so that the
/// merge itself cannot fail.
#[derive(Clone, Default)]
pub struct RetryOverrides {
    pub max_retries: Option<u32>,
    pub backoff: Option<Backoff>,
    pub jitter: Option<Jitter>,
    pub retryable_statuses: Option<BTreeSet<StatusCode>>,
    pub predicate: Option<RetryPredicate>,
    pub max_total_time: Option<Duration>,
    pub max_wait_time: Option<Duration>,
    pub breaker: Option<CircuitBreaker>,
    pub hooks: Option<Hooks>,
}

impl RetryOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = Some(max_retries);
        self
    }

    pub fn backoff(mut self, backoff: Backoff) -> Self {
        self.backoff = Some(backoff);
        self
    }

    pub fn jitter(mut self, jitter: Jitter) -> Self {
        self.jitter = Some(jitter);
        self
    }

    pub fn retryable_statuses(mut self, statuses: impl IntoIterator<Item = StatusCode>) -> Self {
        self.retryable_statuses = Some(statuses.into_iter().collect());
        self
    }

    pub fn predicate<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&AttemptOutcome) -> Result<bool, BoxError> + Send + Sync + 'static,
    {
        self.predicate = Some(Arc::new(predicate));
        self
    }

    pub fn max_total_time(mut self, budget: Duration) -> Self {
        self.max_total_time = Some(budget);
        self
    }

    pub fn max_wait_time(mut self, cap: Duration) -> Self {
        self.max_wait_time = Some(cap);
        self
    }

    pub fn breaker(mut self, breaker: CircuitBreaker) -> Self {
        self.breaker = Some(breaker);
        self
    }

    pub fn hooks(mut self, hooks: Hooks) -> Self {
        self.hooks = Some(hooks);
        self
    }
}
