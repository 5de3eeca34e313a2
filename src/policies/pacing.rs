//! # Dual-rate pacing for the drain cursor.
//!
//! Every cycle waits [`PacingPolicy::per_item`] before its take-operation.
//! A cycle that found the queue empty additionally waits
//! [`PacingPolicy::per_empty_poll`] before the next cycle starts:
//!
//! ```text
//! take → Item      ─► forward ─► per_item ─► take
//! take → Malformed ─────────────► per_item ─► take
//! take → Empty     ─► per_empty_poll ─► per_item ─► take
//! ```
//!
//! Malformed records were present (and are now deleted), so they count as a
//! hit, not as idleness.

use std::time::Duration;

use crate::model::DecodeResult;

/// Delays applied by the cursor around each take-operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PacingPolicy {
    /// Wait before every take-operation, measured from the end of the
    /// previous cycle.
    pub per_item: Duration,
    /// Extra wait after a take-operation found the queue empty.
    pub per_empty_poll: Duration,
}

impl Default for PacingPolicy {
    /// Returns `per_item = 1s`, `per_empty_poll = 60s`.
    fn default() -> Self {
        Self {
            per_item: Duration::from_secs(1),
            per_empty_poll: Duration::from_secs(60),
        }
    }
}

impl PacingPolicy {
    /// Both delays zero. Useful in tests.
    pub const fn immediate() -> Self {
        Self {
            per_item: Duration::ZERO,
            per_empty_poll: Duration::ZERO,
        }
    }

    /// Extra delay owed after a cycle with the given outcome, on top of the
    /// next cycle's `per_item`.
    pub fn extra_delay(&self, outcome: &DecodeResult) -> Duration {
        match outcome {
            DecodeResult::Empty => self.per_empty_poll,
            DecodeResult::Item(_) | DecodeResult::Malformed => Duration::ZERO,
        }
    }

    /// Minimum gap between a take-operation with the given outcome and the
    /// next one (excluding delivery time).
    pub fn cycle_gap(&self, outcome: &DecodeResult) -> Duration {
        self.per_item.saturating_add(self.extra_delay(outcome))
    }
}
