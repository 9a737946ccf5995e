//! Circuit breaker guarding a shared downstream resource.
//!
//! The breaker outlives any single call: executors hold a clone (cheap, all
//! shared state sits behind one `Arc`) and consult it through the admission
//! protocol. `try_acquire` and `BreakerPermit::record` bracket exactly one
//! transport invocation; a permit dropped without recording releases its
//! half-open probe slot so a cancelled call cannot wedge the breaker.

use crate::outcome::AttemptOutcome;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};
use thiserror::Error;

/// Source of monotonic milliseconds, swappable in tests.
pub trait Clock: Send + Sync + fmt::Debug {
    fn now_millis(&self) -> u64;
}

/// Monotonic clock backed by `Instant::now()`.
#[derive(Debug, Clone)]
pub struct MonotonicClock {
    start: Instant,
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self { start: Instant::now() }
    }
}

impl Clock for MonotonicClock {
    fn now_millis(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }
}

/// Breaker phases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitState {
    Closed,
    Open,
    HalfOpen,
}

/// Which outcomes count against the failure threshold.
pub type FailureClassifier = Arc<dyn Fn(&AttemptOutcome) -> bool + Send + Sync>;

/// Default classification: server errors and transport-level failures.
pub fn default_classifier(outcome: &AttemptOutcome) -> bool {
    match outcome {
        AttemptOutcome::Response(response) => response.status.is_server_error(),
        AttemptOutcome::TransportTimeout | AttemptOutcome::TransportError(_) => true,
    }
}

/// Raised when breaker construction parameters are out of range.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum BreakerConfigError {
    #[error("failure_threshold must be > 0")]
    ZeroThreshold,
    #[error("recovery_timeout must be > 0")]
    ZeroRecovery,
}

/// Admission refusal; terminal for the call that received it.
#[derive(Debug, Error, Clone, Copy)]
#[error("circuit breaker rejected the request ({state:?}, {failure_count} consecutive failures, open for {open_for:?})")]
pub struct BreakerRejection {
    pub state: CircuitState,
    pub failure_count: u32,
    pub open_for: Duration,
}

#[derive(Debug)]
struct BreakerCore {
    state: CircuitState,
    failures: u32,
    opened_at_millis: Option<u64>,
    probe_in_flight: bool,
}

impl BreakerCore {
    fn initial() -> Self {
        Self { state: CircuitState::Closed, failures: 0, opened_at_millis: None, probe_in_flight: false }
    }
}

/// Three-state circuit breaker shared across calls and executors.
///
/// One mutex guards the (state, failure count, open timestamp) triple, so
/// transitions are linearizable and the triple never tears. Critical
/// sections contain no awaits, which lets the same breaker serve the async
/// and the blocking executor alike.
#[derive(Clone)]
pub struct CircuitBreaker {
    core: Arc<Mutex<BreakerCore>>,
    failure_threshold: u32,
    recovery_timeout: Duration,
    classifier: FailureClassifier,
    clock: Arc<dyn Clock>,
}

impl CircuitBreaker {
    /// Breaker that opens after `failure_threshold` consecutive failures and
    /// probes again `recovery_timeout` after opening.
    pub fn new(
        failure_threshold: u32,
        recovery_timeout: Duration,
    ) -> Result<Self, BreakerConfigError> {
        if failure_threshold == 0 {
            return Err(BreakerConfigError::ZeroThreshold);
        }
        if recovery_timeout.is_zero() {
            return Err(BreakerConfigError::ZeroRecovery);
        }
        Ok(Self {
            core: Arc::new(Mutex::new(BreakerCore::initial())),
            failure_threshold,
            recovery_timeout,
            classifier: Arc::new(default_classifier),
            clock: Arc::new(MonotonicClock::default()),
        })
    }

    /// Swap the clock; call before sharing the breaker.
    pub fn with_clock<C: Clock + 'static>(mut self, clock: C) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    /// Replace the failure classification; call before sharing the breaker.
    pub fn with_classifier<F>(mut self, classifier: F) -> Self
    where
        F: Fn(&AttemptOutcome) -> bool + Send + Sync + 'static,
    {
        self.classifier = Arc::new(classifier);
        self
    }

    /// Request admission for one attempt.
    pub fn try_acquire(&self) -> Result<BreakerPermit, BreakerRejection> {
        let mut core = self.lock();
        match core.state {
            CircuitState::Closed => Ok(self.permit(false)),
            CircuitState::Open => {
                let opened_at = core.opened_at_millis.unwrap_or(0);
                let open_for = self.clock.now_millis().saturating_sub(opened_at);
                if open_for >= self.recovery_timeout.as_millis() as u64 {
                    core.state = CircuitState::HalfOpen;
                    core.probe_in_flight = true;
                    tracing::info!(open_for_ms = open_for, "circuit breaker half-open, admitting probe");
                    Ok(self.permit(true))
                } else {
                    Err(BreakerRejection {
                        state: CircuitState::Open,
                        failure_count: core.failures,
                        open_for: Duration::from_millis(open_for),
                    })
                }
            }
            CircuitState::HalfOpen => {
                if core.probe_in_flight {
                    Err(BreakerRejection {
                        state: CircuitState::HalfOpen,
                        failure_count: core.failures,
                        open_for: Duration::ZERO,
                    })
                } else {
                    core.probe_in_flight = true;
                    Ok(self.permit(true))
                }
            }
        }
    }

    /// Current phase.
    pub fn state(&self) -> CircuitState {
        self.lock().state
    }

    /// Consecutive failures observed since the last success.
    pub fn failure_count(&self) -> u32 {
        self.lock().failures
    }

    /// Force the breaker back to Closed, clearing all counters.
    pub fn reset(&self) {
        let mut core = self.lock();
        *core = BreakerCore::initial();
        tracing::info!("circuit breaker reset to closed");
    }

    fn permit(&self, probe: bool) -> BreakerPermit {
        BreakerPermit { breaker: self.clone(), probe, recorded: false }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BreakerCore> {
        self.core.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn apply(&self, failed: bool, probe: bool) {
        let mut core = self.lock();
        if probe {
            core.probe_in_flight = false;
        }
        if failed {
            core.failures = core.failures.saturating_add(1);
            match core.state {
                CircuitState::HalfOpen => {
                    core.state = CircuitState::Open;
                    core.opened_at_millis = Some(self.clock.now_millis());
                    tracing::warn!(failures = core.failures, "circuit breaker probe failed, reopening");
                }
                CircuitState::Closed if core.failures >= self.failure_threshold => {
                    core.state = CircuitState::Open;
                    core.opened_at_millis = Some(self.clock.now_millis());
                    tracing::error!(
                        failures = core.failures,
                        threshold = self.failure_threshold,
                        "circuit breaker opened"
                    );
                }
                _ => {}
            }
        } else {
            match core.state {
                CircuitState::HalfOpen => {
                    *core = BreakerCore::initial();
                    tracing::info!("circuit breaker probe succeeded, closing");
                }
                CircuitState::Closed => core.failures = 0,
                CircuitState::Open => {}
            }
        }
    }
}

impl fmt::Debug for CircuitBreaker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let core = self.lock();
        f.debug_struct("CircuitBreaker")
            .field("state", &core.state)
            .field("failures", &core.failures)
            .field("failure_threshold", &self.failure_threshold)
            .field("recovery_timeout", &self.recovery_timeout)
            .finish()
    }
}

/// Admission token for exactly one transport invocation.
#[derive(Debug)]
pub struct BreakerPermit {
    breaker: CircuitBreaker,
    probe: bool,
    recorded: bool,
}

impl BreakerPermit {
    /// Feed the attempt's outcome back into the breaker.
    pub fn record(mut self, outcome: &AttemptOutcome) {
        self.recorded = true;
        let failed = (self.breaker.classifier)(outcome);
        self.breaker.apply(failed, self.probe);
    }
}

impl Drop for BreakerPermit {
    fn drop(&mut self) {
        // A permit abandoned mid-flight (cancellation) must not wedge the
        // half-open probe slot, and must not record an outcome either.
        if !self.recorded && self.probe {
            let mut core = self.breaker.lock();
            if core.state == CircuitState::HalfOpen {
                core.probe_in_flight = false;
            }
        }
    }
}
