//! # Multiplicative jitter for restart delays.
//!
//! `spread(base, factor, cap)` returns `base × (1 + r)` with `r` drawn
//! uniformly from `[0, factor]`, capped at `cap`:
//!
//! - `factor = 0.0` → exactly `base`
//! - `factor = 1.0` → anywhere in `[base, 2 × base]`, never above `cap`
//!
//! Non-finite or negative factors are treated as `0.0`.

use rand::Rng;
use std::time::Duration;

/// Adds up to `factor × base` of random delay on top of `base`, capped at `cap`.
pub(crate) fn spread(base: Duration, factor: f64, cap: Duration) -> Duration {
    if base >= cap {
        return cap;
    }
    if !factor.is_finite() || factor <= 0.0 || base.is_zero() {
        return base;
    }

    let r = rand::rng().random_range(0.0..=factor);
    let secs = base.as_secs_f64() * (1.0 + r);
    if !secs.is_finite() || secs >= cap.as_secs_f64() {
        return cap;
    }
    Duration::from_secs_f64(secs).max(base)
}
