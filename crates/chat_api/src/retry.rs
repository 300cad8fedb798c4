use std::time::Duration;

use rand::Rng;
use reqwest::StatusCode;

/// Maximum connection attempts, including the first one.
pub const MAX_ATTEMPTS: u32 = 10;
/// Base delay before the first retry.
pub const BASE_DELAY: Duration = Duration::from_secs(10);
/// Modulus applied to every computed delay.
pub const DELAY_CAP: Duration = Duration::from_secs(60);
/// Upper bound of the random jitter, as a fraction of the exponential delay.
pub const MAX_JITTER_FRACTION: f64 = 0.1;

/// Exponential backoff schedule for rate-limited connection attempts.
///
/// The delay for attempt `i` (0-based) is `base * 2^i` plus up to 10% jitter,
/// reduced modulo `cap`. The modulo is a wrap, not a clamp: once the
/// exponential term passes `cap` the wait drops back down and rises again.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Backoff {
    pub base: Duration,
    pub cap: Duration,
    pub max_attempts: u32,
}

impl Default for Backoff {
    fn default() -> Self {
        Self {
            base: BASE_DELAY,
            cap: DELAY_CAP,
            max_attempts: MAX_ATTEMPTS,
        }
    }
}

impl Backoff {
    pub fn new(base: Duration, cap: Duration, max_attempts: u32) -> Self {
        Self {
            base,
            cap,
            max_attempts: max_attempts.max(1),
        }
    }

    /// Delay to wait after failed attempt `attempt`, with fresh random jitter.
    pub fn delay(&self, attempt: u32) -> Duration {
        let jitter = rand::thread_rng().gen_range(0.0..MAX_JITTER_FRACTION);
        self.delay_with_jitter(attempt, jitter)
    }

    /// Deterministic form of [`Backoff::delay`]; `jitter` is the fraction of
    /// the exponential delay to add and is clamped to `[0, 0.1]`.
    pub fn delay_with_jitter(&self, attempt: u32, jitter: f64) -> Duration {
        let jitter = if jitter.is_finite() {
            jitter.clamp(0.0, MAX_JITTER_FRACTION)
        } else {
            0.0
        };
        let exponent = i32::try_from(attempt.min(62)).unwrap_or(62);
        let delay = self.base.as_secs_f64() * 2f64.powi(exponent);
        let total = delay + delay * jitter;

        let cap = self.cap.as_secs_f64();
        let effective = if cap > 0.0 { total % cap } else { total };

        Duration::try_from_secs_f64(effective).unwrap_or(self.cap)
    }

    /// Whether another attempt is allowed after `attempt` failed.
    pub fn allows_retry_after(&self, attempt: u32) -> bool {
        attempt + 1 < self.max_attempts
    }
}

/// Only an explicit `429 Too Many Requests` drives the retry path.
pub fn is_rate_limited(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS
}
