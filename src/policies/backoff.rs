//! # Backoff policy for restarting a failed cursor.
//!
//! [`BackoffPolicy`] controls how long the restart supervisor waits after a
//! store failure. It is parameterized by:
//! - [`BackoffPolicy::min`] the delay after the first failure;
//! - [`BackoffPolicy::max`] the hard upper bound;
//! - [`BackoffPolicy::factor`] the multiplicative growth per consecutive failure;
//! - [`BackoffPolicy::jitter`] how much randomness is added on top.
//!
//! The delay after `n` consecutive failures (0-indexed) is `min × factor^n`,
//! clamped to `max`, then jittered by up to `jitter × base` and clamped to
//! `max` again. Because the base delay is derived purely from `n`, jitter
//! never feeds back into later calculations. There is no retry ceiling.
//!
//! # Example
//! ```rust
//! use std::time::Duration;
//! use queuedrain::BackoffPolicy;
//!
//! let backoff = BackoffPolicy {
//!     min: Duration::from_millis(100),
//!     max: Duration::from_secs(10),
//!     factor: 2.0,
//!     jitter: 0.0,
//! };
//!
//! assert_eq!(backoff.next(0), Duration::from_millis(100));
//! assert_eq!(backoff.next(1), Duration::from_millis(200));
//! // 100ms × 2^10 = 102_400ms → capped at max=10s
//! assert_eq!(backoff.next(10), Duration::from_secs(10));
//! ```

use std::time::Duration;

use crate::policies::jitter;

/// Restart backoff policy.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BackoffPolicy {
    /// Delay after the first failure.
    pub min: Duration,
    /// Maximum delay, jitter included.
    pub max: Duration,
    /// Multiplicative growth factor (`>= 1.0`).
    pub factor: f64,
    /// Random extra delay as a fraction of the base delay (`1.0` = up to 100%).
    pub jitter: f64,
}

impl Default for BackoffPolicy {
    /// Returns a policy with:
    /// - `min = 1s`;
    /// - `max = 1s`;
    /// - `factor = 2.0`;
    /// - `jitter = 1.0`.
    ///
    /// With `min == max` every restart waits exactly one second.
    fn default() -> Self {
        Self {
            min: Duration::from_secs(1),
            max: Duration::from_secs(1),
            factor: 2.0,
            jitter: 1.0,
        }
    }
}

impl BackoffPolicy {
    /// A fixed delay without jitter.
    pub const fn fixed(delay: Duration) -> Self {
        Self {
            min: delay,
            max: delay,
            factor: 1.0,
            jitter: 0.0,
        }
    }

    /// Computes the delay after `failures` consecutive failures (0-indexed).
    ///
    /// # Notes
    /// - If `min > max`, every delay is `max`.
    /// - If `factor` equals 1.0, the base stays at `min`.
    /// - The result always lies in `[min(min, max), max]`.
    pub fn next(&self, failures: u32) -> Duration {
        let max_secs = self.max.as_secs_f64();
        let clamped_exp = failures.min(i32::MAX as u32) as i32;
        let unclamped_secs = self.min.as_secs_f64() * self.factor.powi(clamped_exp);

        let base =
            if !unclamped_secs.is_finite() || unclamped_secs < 0.0 || unclamped_secs > max_secs {
                self.max
            } else {
                Duration::from_secs_f64(unclamped_secs)
            };

        jitter::spread(base, self.jitter, self.max)
    }
}
