//! The synchronous retry decision shared by both execution models.

use crate::config::RetryConfig;
use crate::error::BoxError;
use crate::outcome::{AttemptOutcome, Response, TransportError, TransportErrorKind};
use http::StatusCode;

/// Why a retry was scheduled, for observability.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryReason {
    /// A response arrived with a status the policy retries.
    Status(StatusCode),
    /// The attempt timed out at the transport.
    Timeout,
    /// The attempt failed below the HTTP layer.
    Transport(TransportErrorKind),
}

/// Terminal failure cause as determined by the decider.
#[derive(Debug)]
pub enum FailureCause {
    /// Final response with a status nobody wants retried.
    NonRetryableStatus(Response),
    /// The attempt cap was hit; carries the last outcome.
    RetriesExhausted(AttemptOutcome),
    /// Transport failure the policy marks non-retryable. `None` means the
    /// attempt timed out.
    TransportFatal(Option<TransportError>),
    /// The user predicate itself failed.
    Predicate(BoxError),
}

/// Outcome of one decision round.
#[derive(Debug)]
pub enum Decision {
    /// Hand the response to the caller.
    Return(Response),
    /// Schedule another attempt.
    Retry(RetryReason),
    /// Terminate the call with an error.
    Fail(FailureCause),
}

/// Decide what to do with `outcome` after 1-indexed `attempt`.
///
/// Pure: the same inputs always yield the same decision. The time budget is
/// the executor's business, not the decider's.
pub fn decide(outcome: AttemptOutcome, attempt: u32, config: &RetryConfig) -> Decision {
    let wants_retry = match config.predicate() {
        Some(predicate) => match predicate(&outcome) {
            Ok(verdict) => Some(verdict),
            Err(cause) => return Decision::Fail(FailureCause::Predicate(cause)),
        },
        None => None,
    };

    match outcome {
        AttemptOutcome::Response(response) => {
            let status = response.status;
            let retry = wants_retry.unwrap_or_else(|| {
                status.as_u16() >= 400 && config.retryable_statuses().contains(&status)
            });
            if !retry {
                if status.as_u16() < 400 {
                    return Decision::Return(response);
                }
                return Decision::Fail(FailureCause::NonRetryableStatus(response));
            }
            if attempt > config.max_retries() {
                return Decision::Fail(FailureCause::RetriesExhausted(AttemptOutcome::Response(
                    response,
                )));
            }
            Decision::Retry(RetryReason::Status(status))
        }
        AttemptOutcome::TransportTimeout => {
            if !wants_retry.unwrap_or(true) {
                return Decision::Fail(FailureCause::TransportFatal(None));
            }
            if attempt > config.max_retries() {
                return Decision::Fail(FailureCause::RetriesExhausted(
                    AttemptOutcome::TransportTimeout,
                ));
            }
            Decision::Retry(RetryReason::Timeout)
        }
        AttemptOutcome::TransportError(error) => {
            if !wants_retry.unwrap_or(true) {
                return Decision::Fail(FailureCause::TransportFatal(Some(error)));
            }
            if attempt > config.max_retries() {
                return Decision::Fail(FailureCause::RetriesExhausted(
                    AttemptOutcome::TransportError(error),
                ));
            }
            Decision::Retry(RetryReason::Transport(error.kind))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(status: u16) -> AttemptOutcome {
        AttemptOutcome::Response(Response::new(StatusCode::from_u16(status).unwrap()))
    }

    fn transport_error() -> AttemptOutcome {
        AttemptOutcome::TransportError(TransportError::new(
            TransportErrorKind::Connect,
            "connection refused",
        ))
    }

    fn config() -> RetryConfig {
        RetryConfig::default()
    }

    fn config_with_predicate(
        predicate: impl Fn(&AttemptOutcome) -> Result<bool, BoxError> + Send + Sync + 'static,
    ) -> RetryConfig {
        RetryConfig::builder().predicate(predicate).build().unwrap()
    }

    #[test]
    fn success_returns() {
        match decide(response(200), 1, &config()) {
            Decision::Return(r) => assert_eq!(r.status, StatusCode::OK),
            other => panic!("expected Return, got {other:?}"),
        }
    }

    #[test]
    fn listed_status_retries() {
        for status in [429, 500, 502, 503, 504] {
            match decide(response(status), 1, &config()) {
                Decision::Retry(RetryReason::Status(s)) => assert_eq!(s.as_u16(), status),
                other => panic!("expected Retry for {status}, got {other:?}"),
            }
        }
    }

    #[test]
    fn unlisted_client_error_fails() {
        match decide(response(404), 1, &config()) {
            Decision::Fail(FailureCause::NonRetryableStatus(r)) => {
                assert_eq!(r.status, StatusCode::NOT_FOUND)
            }
            other => panic!("expected NonRetryableStatus, got {other:?}"),
        }
    }

    #[test]
    fn unlisted_server_error_fails() {
        let narrow = RetryConfig::builder()
            .retryable_statuses([StatusCode::SERVICE_UNAVAILABLE])
            .build()
            .unwrap();
        assert!(matches!(
            decide(response(500), 1, &narrow),
            Decision::Fail(FailureCause::NonRetryableStatus(_))
        ));
    }

    #[test]
    fn transport_failures_retry_by_default() {
        assert!(matches!(
            decide(AttemptOutcome::TransportTimeout, 1, &config()),
            Decision::Retry(RetryReason::Timeout)
        ));
        assert!(matches!(
            decide(transport_error(), 1, &config()),
            Decision::Retry(RetryReason::Transport(TransportErrorKind::Connect))
        ));
    }

    #[test]
    fn exhaustion_carries_last_outcome() {
        let config = RetryConfig::builder().max_retries(2).build().unwrap();
        match decide(response(503), 3, &config) {
            Decision::Fail(FailureCause::RetriesExhausted(AttemptOutcome::Response(r))) => {
                assert_eq!(r.status, StatusCode::SERVICE_UNAVAILABLE)
            }
            other => panic!("expected RetriesExhausted, got {other:?}"),
        }
        assert!(matches!(
            decide(AttemptOutcome::TransportTimeout, 3, &config),
            Decision::Fail(FailureCause::RetriesExhausted(AttemptOutcome::TransportTimeout))
        ));
    }

    #[test]
    fn retry_allowed_up_to_the_cap() {
        let config = RetryConfig::builder().max_retries(2).build().unwrap();
        assert!(matches!(decide(response(503), 2, &config), Decision::Retry(_)));
        assert!(matches!(decide(response(503), 3, &config), Decision::Fail(_)));
    }

    #[test]
    fn predicate_overrides_status_rules() {
        let retry_everything = config_with_predicate(|_| Ok(true));
        assert!(matches!(decide(response(404), 1, &retry_everything), Decision::Retry(_)));

        let retry_nothing = config_with_predicate(|_| Ok(false));
        assert!(matches!(
            decide(response(503), 1, &retry_nothing),
            Decision::Fail(FailureCause::NonRetryableStatus(_))
        ));
    }

    #[test]
    fn predicate_false_on_success_still_returns() {
        let config = config_with_predicate(|_| Ok(false));
        assert!(matches!(decide(response(204), 1, &config), Decision::Return(_)));
    }

    #[test]
    fn predicate_true_on_success_triggers_retry() {
        let config = config_with_predicate(|outcome| {
            Ok(outcome.status().is_some_and(|s| s == StatusCode::OK))
        });
        match decide(response(200), 1, &config) {
            Decision::Retry(RetryReason::Status(s)) => assert_eq!(s, StatusCode::OK),
            other => panic!("expected Retry, got {other:?}"),
        }
    }

    #[test]
    fn predicate_false_on_transport_error_is_fatal() {
        let config = config_with_predicate(|_| Ok(false));
        assert!(matches!(
            decide(transport_error(), 1, &config),
            Decision::Fail(FailureCause::TransportFatal(Some(_)))
        ));
        assert!(matches!(
            decide(AttemptOutcome::TransportTimeout, 1, &config),
            Decision::Fail(FailureCause::TransportFatal(None))
        ));
    }

    #[test]
    fn predicate_error_terminates() {
        let config = config_with_predicate(|_| Err("boom".into()));
        match decide(response(200), 1, &config) {
            Decision::Fail(FailureCause::Predicate(cause)) => {
                assert_eq!(cause.to_string(), "boom")
            }
            other => panic!("expected Predicate failure, got {other:?}"),
        }
    }

    #[test]
    fn same_inputs_same_decision() {
        let config = config();
        let first = decide(response(502), 2, &config);
        let second = decide(response(502), 2, &config);
        assert!(matches!(
            (first, second),
            (
                Decision::Retry(RetryReason::Status(StatusCode::BAD_GATEWAY)),
                Decision::Retry(RetryReason::Status(StatusCode::BAD_GATEWAY))
            )
        ));
    }
}
