//! Backoff strategies for spacing retry attempts.

use std::time::Duration;

/// Ceiling on every computed delay so that downstream jitter arithmetic
/// cannot overflow, no matter how high the attempt index climbs.
pub const MAX_BACKOFF: Duration = Duration::from_secs(30 * 24 * 60 * 60);

/// Delay schedule between attempts.
///
/// Strategies are pure: `delay(n)` depends only on the variant and the
/// 1-indexed attempt number. Every variant accepts an optional cap via
/// [`Backoff::with_max`]; results are always clamped to [`MAX_BACKOFF`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Backoff {
    /// Same delay before every retry.
    Constant { base: Duration, max: Option<Duration> },
    /// Delay grows by `base` each attempt.
    Linear { base: Duration, max: Option<Duration> },
    /// Delay doubles each attempt.
    Exponential { base: Duration, max: Option<Duration> },
    /// Delay follows the Fibonacci sequence scaled by `base`.
    Fibonacci { base: Duration, max: Option<Duration> },
}

impl Backoff {
    pub fn constant(base: Duration) -> Self {
        Backoff::Constant { base, max: None }
    }

    pub fn linear(base: Duration) -> Self {
        Backoff::Linear { base, max: None }
    }

    pub fn exponential(base: Duration) -> Self {
        Backoff::Exponential { base, max: None }
    }

    pub fn fibonacci(base: Duration) -> Self {
        Backoff::Fibonacci { base, max: None }
    }

    /// Cap the delay produced by any attempt.
    pub fn with_max(mut self, cap: Duration) -> Self {
        let (Backoff::Constant { max, .. }
        | Backoff::Linear { max, .. }
        | Backoff::Exponential { max, .. }
        | Backoff::Fibonacci { max, .. }) = &mut self;
        *max = Some(cap);
        self
    }

    /// Delay before the retry that follows `attempt` (1-indexed).
    ///
    /// Arithmetic saturates; an attempt index of 0 is treated as 1.
    pub fn delay(&self, attempt: u32) -> Duration {
        let attempt = attempt.max(1);
        let (raw, max) = match self {
            Backoff::Constant { base, max } => (*base, max),
            Backoff::Linear { base, max } => {
                (base.checked_mul(attempt).unwrap_or(MAX_BACKOFF), max)
            }
            Backoff::Exponential { base, max } => {
                let multiplier = 2u32.saturating_pow(attempt - 1);
                (base.checked_mul(multiplier).unwrap_or(MAX_BACKOFF), max)
            }
            Backoff::Fibonacci { base, max } => {
                let multiplier = fibonacci(attempt).min(u64::from(u32::MAX)) as u32;
                (base.checked_mul(multiplier).unwrap_or(MAX_BACKOFF), max)
            }
        };
        let capped = match max {
            Some(cap) => raw.min(*cap),
            None => raw,
        };
        capped.min(MAX_BACKOFF)
    }
}

/// `Fib(1) = Fib(2) = 1`, saturating on overflow.
fn fibonacci(n: u32) -> u64 {
    let (mut previous, mut current) = (1u64, 1u64);
    for _ in 2..n {
        let next = previous.saturating_add(current);
        previous = current;
        current = next;
    }
    current
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constant_is_flat() {
        let backoff = Backoff::constant(Duration::from_millis(250));
        assert_eq!(backoff.delay(1), Duration::from_millis(250));
        assert_eq!(backoff.delay(7), Duration::from_millis(250));
    }

    #[test]
    fn linear_scales_with_attempt() {
        let backoff = Backoff::linear(Duration::from_millis(100));
        assert_eq!(backoff.delay(1), Duration::from_millis(100));
        assert_eq!(backoff.delay(2), Duration::from_millis(200));
        assert_eq!(backoff.delay(5), Duration::from_millis(500));
    }

    #[test]
    fn exponential_doubles() {
        let backoff = Backoff::exponential(Duration::from_millis(300));
        assert_eq!(backoff.delay(1), Duration::from_millis(300));
        assert_eq!(backoff.delay(2), Duration::from_millis(600));
        assert_eq!(backoff.delay(3), Duration::from_millis(1200));
        assert_eq!(backoff.delay(4), Duration::from_millis(2400));
    }

    #[test]
    fn fibonacci_follows_sequence() {
        let backoff = Backoff::fibonacci(Duration::from_secs(1));
        let expected = [1u64, 1, 2, 3, 5, 8, 13];
        for (i, &multiplier) in expected.iter().enumerate() {
            assert_eq!(backoff.delay(i as u32 + 1), Duration::from_secs(multiplier));
        }
    }

    #[test]
    fn cap_applies_to_every_variant() {
        let cap = Duration::from_secs(1);
        assert_eq!(Backoff::constant(Duration::from_secs(5)).with_max(cap).delay(1), cap);
        assert_eq!(Backoff::linear(Duration::from_secs(1)).with_max(cap).delay(3), cap);
        assert_eq!(Backoff::exponential(Duration::from_secs(1)).with_max(cap).delay(10), cap);
        assert_eq!(Backoff::fibonacci(Duration::from_secs(1)).with_max(cap).delay(10), cap);
    }

    #[test]
    fn high_attempt_indices_saturate() {
        let exponential = Backoff::exponential(Duration::from_secs(1));
        assert_eq!(exponential.delay(64), MAX_BACKOFF);

        let fib = Backoff::fibonacci(Duration::from_secs(1));
        assert_eq!(fib.delay(200), MAX_BACKOFF);

        let linear = Backoff::linear(Duration::from_secs(u64::MAX / 2));
        assert_eq!(linear.delay(10), MAX_BACKOFF);
    }

    #[test]
    fn attempt_zero_behaves_like_one() {
        let backoff = Backoff::exponential(Duration::from_millis(100));
        assert_eq!(backoff.delay(0), backoff.delay(1));
    }

    #[test]
    fn strategies_are_idempotent() {
        let backoff = Backoff::fibonacci(Duration::from_millis(70));
        assert_eq!(backoff.delay(6), backoff.delay(6));
    }
}
