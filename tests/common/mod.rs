//! Shared doubles for the integration suites.
#![allow(dead_code)]

use async_trait::async_trait;
use http::header::RETRY_AFTER;
use http::{HeaderValue, StatusCode};
use resilient_http::{
    AttemptOutcome, BlockingTransport, Clock, Hooks, RequestSpec, Response, Transport,
};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

/// Transport that replays a fixed script of outcomes and counts sends.
///
/// Implements both transport traits so the same script can drive the async
/// and the blocking executor.
pub struct ScriptedTransport {
    outcomes: Mutex<VecDeque<AttemptOutcome>>,
    sends: AtomicU64,
}

impl ScriptedTransport {
    pub fn new(outcomes: impl IntoIterator<Item = AttemptOutcome>) -> Self {
        Self { outcomes: Mutex::new(outcomes.into_iter().collect()), sends: AtomicU64::new(0) }
    }

    pub fn statuses(codes: impl IntoIterator<Item = u16>) -> Self {
        Self::new(codes.into_iter().map(|code| AttemptOutcome::Response(response(code))))
    }

    pub fn send_count(&self) -> u64 {
        self.sends.load(Ordering::SeqCst)
    }

    fn pop(&self) -> AttemptOutcome {
        self.sends.fetch_add(1, Ordering::SeqCst);
        self.outcomes.lock().unwrap().pop_front().expect("transport script exhausted")
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, _spec: &RequestSpec) -> AttemptOutcome {
        self.pop()
    }
}

impl BlockingTransport for ScriptedTransport {
    fn send(&self, _spec: &RequestSpec) -> AttemptOutcome {
        self.pop()
    }
}

pub fn response(status: u16) -> Response {
    Response::new(StatusCode::from_u16(status).expect("valid status code"))
}

pub fn response_with_retry_after(status: u16, value: &str) -> AttemptOutcome {
    AttemptOutcome::Response(
        response(status)
            .with_header(RETRY_AFTER, HeaderValue::from_str(value).expect("valid header value")),
    )
}

/// Records every hook firing as one readable line, in order.
///
/// Lines look like `request#1`, `retry#1:1000ms`, `success#3`,
/// `failure#3:RetriesExhausted`, so whole lifecycles compare as string
/// vectors.
#[derive(Clone, Default)]
pub struct HookLog {
    events: Arc<Mutex<Vec<String>>>,
}

impl HookLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn hooks(&self) -> Hooks {
        let requests = self.events.clone();
        let retries = self.events.clone();
        let successes = self.events.clone();
        let failures = self.events.clone();
        Hooks::new()
            .on_request(move |info| {
                requests.lock().unwrap().push(format!("request#{}", info.attempt));
            })
            .on_retry(move |info| {
                retries
                    .lock()
                    .unwrap()
                    .push(format!("retry#{}:{}ms", info.attempt, info.wait_time.as_millis()));
            })
            .on_success(move |info| {
                successes.lock().unwrap().push(format!("success#{}", info.attempt));
            })
            .on_failure(move |info| {
                failures
                    .lock()
                    .unwrap()
                    .push(format!("failure#{}:{:?}", info.attempt, info.error.kind()));
            })
    }

    pub fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }
}

/// Manually advanced clock for breaker recovery tests.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Arc<AtomicU64>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, millis: u64) {
        self.now.fetch_add(millis, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_millis(&self) -> u64 {
        self.now.load(Ordering::SeqCst)
    }
}
