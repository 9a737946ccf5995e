//! Randomized padding on computed delays to spread out synchronized retries.

use crate::backoff::MAX_BACKOFF;
use rand::Rng;
use std::time::Duration;
use thiserror::Error;

/// Raised when a jitter factor falls outside the accepted range.
#[derive(Debug, Error, Clone, Copy, PartialEq)]
#[error("jitter factor must be finite and within [0.0, 1.0], got {0}")]
pub struct JitterError(pub f64);

/// Additive proportional jitter.
///
/// A delay `d` becomes `d + u * d` with `u` drawn uniformly from
/// `[0, factor)`. A factor of zero leaves delays untouched, which keeps
/// schedules deterministic.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Jitter {
    factor: f64,
}

impl Jitter {
    /// No jitter at all.
    pub const NONE: Jitter = Jitter { factor: 0.0 };

    pub fn new(factor: f64) -> Result<Self, JitterError> {
        if !factor.is_finite() || !(0.0..=1.0).contains(&factor) {
            return Err(JitterError(factor));
        }
        Ok(Self { factor })
    }

    pub fn factor(&self) -> f64 {
        self.factor
    }

    /// Pad `delay` with a random increment proportional to itself.
    pub fn apply(&self, delay: Duration) -> Duration {
        self.apply_with_rng(delay, &mut rand::rng())
    }

    /// Same as [`Jitter::apply`] but with a caller-supplied RNG, so tests can
    /// seed the draw.
    pub fn apply_with_rng<R: Rng>(&self, delay: Duration, rng: &mut R) -> Duration {
        if self.factor == 0.0 || delay.is_zero() {
            return delay;
        }
        // Clamp first so the addition below cannot overflow.
        let delay = delay.min(MAX_BACKOFF);
        let scale = rng.random_range(0.0..self.factor);
        delay + delay.mul_f64(scale)
    }
}

impl Default for Jitter {
    fn default() -> Self {
        Jitter::NONE
    }
}
