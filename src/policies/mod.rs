//! Pacing and restart policies.
//!
//! This module groups the knobs that control **how fast** the cursor hits the
//! shared queue and **how long** to wait before a failed cursor is restarted.
//!
//! ## Contents
//! - [`PacingPolicy`]  per-item delay and the extra delay after an empty poll
//! - [`BackoffPolicy`] restart delays after store failures (min / factor / max + jitter)
//!
//! ## Quick wiring
//! ```text
//! Config { pacing: PacingPolicy, backoff: BackoffPolicy, .. }
//!      ├─► core::cursor::PacedCursor uses pacing before/after each take
//!      └─► core::supervisor::RestartSupervisor uses backoff.next(failures)
//! ```
//!
//! ## Defaults
//! - `PacingPolicy::default()` → per_item=1s, per_empty_poll=60s.
//! - `BackoffPolicy::default()` → min=1s, max=1s, factor=2.0, jitter=1.0
//!   (a fixed 1s restart delay).

mod backoff;
mod jitter;
mod pacing;

pub use backoff::BackoffPolicy;
pub use pacing::PacingPolicy;
