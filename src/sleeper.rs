//! Sleep seams for both execution models.
//!
//! Delays go through a trait so tests can run schedules instantly while
//! still observing every requested duration.

use async_trait::async_trait;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

/// Async sleep capability.
#[async_trait]
pub trait Sleeper: Send + Sync + std::fmt::Debug {
    async fn sleep(&self, duration: Duration);
}

/// Blocking mirror of [`Sleeper`].
pub trait BlockingSleeper: Send + Sync + std::fmt::Debug {
    fn sleep(&self, duration: Duration);
}

/// Production async sleeper backed by the tokio timer.
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Production blocking sleeper; parks the calling thread.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadSleeper;

impl BlockingSleeper for ThreadSleeper {
    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Test sleeper that returns immediately; serves both execution models.
#[derive(Debug, Default, Clone, Copy)]
pub struct InstantSleeper;

#[async_trait]
impl Sleeper for InstantSleeper {
    async fn sleep(&self, _duration: Duration) {}
}

impl BlockingSleeper for InstantSleeper {
    fn sleep(&self, _duration: Duration) {}
}

/// Test sleeper that records every requested delay without waiting.
#[derive(Debug, Default, Clone)]
pub struct TrackingSleeper {
    calls: Arc<Mutex<Vec<Duration>>>,
}

impl TrackingSleeper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every delay requested so far, in order.
    pub fn recorded(&self) -> Vec<Duration> {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn clear(&self) {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner).clear();
    }

    fn push(&self, duration: Duration) {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner).push(duration);
    }
}

#[async_trait]
impl Sleeper for TrackingSleeper {
    async fn sleep(&self, duration: Duration) {
        self.push(duration);
    }
}

impl BlockingSleeper for TrackingSleeper {
    fn sleep(&self, duration: Duration) {
        self.push(duration);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[tokio::test]
    async fn instant_sleeper_returns_immediately() {
        let start = Instant::now();
        Sleeper::sleep(&InstantSleeper, Duration::from_secs(5)).await;
        assert!(start.elapsed() < Duration::from_millis(100));
    }

    #[tokio::test]
    async fn tracking_sleeper_records_both_models() {
        let sleeper = TrackingSleeper::new();
        Sleeper::sleep(&sleeper, Duration::from_millis(100)).await;
        BlockingSleeper::sleep(&sleeper, Duration::from_millis(200));

        assert_eq!(
            sleeper.recorded(),
            vec![Duration::from_millis(100), Duration::from_millis(200)]
        );

        sleeper.clear();
        assert!(sleeper.recorded().is_empty());
    }

    #[tokio::test]
    async fn tokio_sleeper_waits() {
        let start = Instant::now();
        Sleeper::sleep(&TokioSleeper, Duration::from_millis(30)).await;
        assert!(start.elapsed() >= Duration::from_millis(25));
    }

    #[test]
    fn thread_sleeper_waits() {
        let start = Instant::now();
        BlockingSleeper::sleep(&ThreadSleeper, Duration::from_millis(30));
        assert!(start.elapsed() >= Duration::from_millis(25));
    }
}
