//! The attempt loop: one synchronous engine, two thin drivers.
//!
//! Everything that decides, records, and observes lives in [`CallEngine`],
//! which never suspends. The async and blocking entry points differ only at
//! the two suspension points the design allows: the transport invocation and
//! the delay. That keeps the two execution models behaviorally identical by
//! construction.

use crate::circuit_breaker::BreakerPermit;
use crate::config::RetryConfig;
use crate::decider::{decide, Decision, FailureCause};
use crate::error::{ErrorKind, RequestError};
use crate::hooks::{FailureInfo, RequestInfo, ResponseInfo, RetryInfo};
use crate::outcome::{AttemptOutcome, Response, TimedOut};
use crate::retry_after::parse_retry_after;
use crate::sleeper::{BlockingSleeper, Sleeper};
use crate::transport::{BlockingTransport, RequestSpec, Transport};
use http::StatusCode;
use std::time::{Duration, Instant};

/// What the driver must do after the engine digests an outcome.
enum Next {
    Done(Response),
    Sleep(Duration),
}

struct CallEngine<'a> {
    spec: &'a RequestSpec,
    config: &'a RetryConfig,
    start: Instant,
    attempt: u32,
}

impl<'a> CallEngine<'a> {
    fn new(spec: &'a RequestSpec, config: &'a RetryConfig) -> Self {
        Self { spec, config, start: Instant::now(), attempt: 1 }
    }

    /// Breaker admission for the current attempt. Rejection is terminal.
    fn admit(&self) -> Result<Option<BreakerPermit>, RequestError> {
        let Some(breaker) = self.config.breaker() else {
            return Ok(None);
        };
        match breaker.try_acquire() {
            Ok(permit) => Ok(Some(permit)),
            Err(rejection) => {
                let error = self.error(ErrorKind::BreakerOpen).with_source(rejection);
                Err(self.fail(error, None))
            }
        }
    }

    fn fire_request(&self) {
        self.config.hooks().request(&RequestInfo {
            url: &self.spec.url,
            method: &self.spec.method,
            attempt: self.attempt,
            max_retries: self.config.max_retries(),
        });
    }

    /// Record, decide, then either finish the call or schedule a delay.
    fn on_outcome(
        &mut self,
        permit: Option<BreakerPermit>,
        outcome: AttemptOutcome,
    ) -> Result<Next, RequestError> {
        if let Some(permit) = permit {
            permit.record(&outcome);
        }
        // The hint and status must be pulled out before the decider consumes
        // the outcome.
        let hint = match &outcome {
            AttemptOutcome::Response(response) => parse_retry_after(&response.headers),
            _ => None,
        };
        let status = outcome.status();

        match decide(outcome, self.attempt, self.config) {
            Decision::Return(response) => {
                let info = ResponseInfo {
                    url: &self.spec.url,
                    method: &self.spec.method,
                    attempt: self.attempt,
                    max_retries: self.config.max_retries(),
                    response: &response,
                    total_time: self.start.elapsed(),
                };
                self.config.hooks().success(&info);
                Ok(Next::Done(response))
            }
            Decision::Fail(cause) => Err(self.fail_with_cause(cause)),
            Decision::Retry(reason) => {
                let delay = self.next_delay(hint);
                if self.budget_exceeded(delay) {
                    let error = self.error(ErrorKind::BudgetExhausted).with_status(status);
                    return Err(self.fail(error, status));
                }
                tracing::debug!(
                    url = %self.spec.url,
                    attempt = self.attempt,
                    delay_ms = delay.as_millis() as u64,
                    reason = ?reason,
                    "scheduling retry"
                );
                self.config.hooks().retry(&RetryInfo {
                    url: &self.spec.url,
                    method: &self.spec.method,
                    attempt: self.attempt,
                    max_retries: self.config.max_retries(),
                    wait_time: delay,
                    reason,
                });
                self.attempt += 1;
                Ok(Next::Sleep(delay))
            }
        }
    }

    /// Delay pipeline: strategy or server hint, then cap, then jitter.
    fn next_delay(&self, hint: Option<Duration>) -> Duration {
        let base = hint.unwrap_or_else(|| self.config.backoff().delay(self.attempt));
        let capped = match self.config.max_wait_time() {
            Some(cap) => base.min(cap),
            None => base,
        };
        self.config.jitter().apply(capped)
    }

    /// Would sleeping `delay` overrun the wall-clock budget?
    fn budget_exceeded(&self, delay: Duration) -> bool {
        match self.config.max_total_time() {
            Some(budget) => self
                .start
                .elapsed()
                .checked_add(delay)
                .map_or(true, |projected| projected > budget),
            None => false,
        }
    }

    fn error(&self, kind: ErrorKind) -> RequestError {
        RequestError::new(
            kind,
            self.spec.method.clone(),
            self.spec.url.clone(),
            self.attempt,
            self.start.elapsed(),
        )
    }

    fn fail_with_cause(&self, cause: FailureCause) -> RequestError {
        let error = match cause {
            FailureCause::NonRetryableStatus(response) => {
                self.error(ErrorKind::NonRetryableStatus).with_response(response)
            }
            FailureCause::RetriesExhausted(outcome) => {
                let error = self.error(ErrorKind::RetriesExhausted);
                match outcome {
                    AttemptOutcome::Response(response) => error.with_response(response),
                    AttemptOutcome::TransportTimeout => error.with_source(TimedOut),
                    AttemptOutcome::TransportError(cause) => error.with_source(cause),
                }
            }
            FailureCause::TransportFatal(cause) => {
                let error = self.error(ErrorKind::TransportFatal);
                match cause {
                    Some(transport_error) => error.with_source(transport_error),
                    None => error.with_source(TimedOut),
                }
            }
            FailureCause::Predicate(cause) => {
                self.error(ErrorKind::PredicateError).with_source(cause)
            }
        };
        let status = error.last_status();
        self.fail(error, status)
    }

    /// Fire the terminal failure hook, then hand the error back.
    fn fail(&self, error: RequestError, status: Option<StatusCode>) -> RequestError {
        self.config.hooks().failure(&FailureInfo {
            url: &self.spec.url,
            method: &self.spec.method,
            attempt: self.attempt,
            max_retries: self.config.max_retries(),
            error: &error,
            status,
            total_time: error.elapsed(),
        });
        error
    }
}

/// Run one logical call against an async transport.
pub async fn execute(
    spec: &RequestSpec,
    config: &RetryConfig,
    transport: &dyn Transport,
    sleeper: &dyn Sleeper,
) -> Result<Response, RequestError> {
    let mut engine = CallEngine::new(spec, config);
    loop {
        let permit = engine.admit()?;
        engine.fire_request();
        let outcome = transport.send(spec).await;
        match engine.on_outcome(permit, outcome)? {
            Next::Done(response) => return Ok(response),
            Next::Sleep(delay) => sleeper.sleep(delay).await,
        }
    }
}

/// Blocking twin of [`execute`]; drives the same engine.
pub fn execute_blocking(
    spec: &RequestSpec,
    config: &RetryConfig,
    transport: &dyn BlockingTransport,
    sleeper: &dyn BlockingSleeper,
) -> Result<Response, RequestError> {
    let mut engine = CallEngine::new(spec, config);
    loop {
        let permit = engine.admit()?;
        engine.fire_request();
        let outcome = transport.send(spec);
        match engine.on_outcome(permit, outcome)? {
            Next::Done(response) => return Ok(response),
            Next::Sleep(delay) => sleeper.sleep(delay),
        }
    }
}
