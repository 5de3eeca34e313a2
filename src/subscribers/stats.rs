//! # Stats: traffic counters
//!
//! Counts forwarded items, target panics, malformed records, empty polls, cursor
//! failures and activations. Counters only grow; take a [`StatsSnapshot`] to read them.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Point-in-time copy of the counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub forwarded: u64,
    pub delivery_panics: u64,
    pub malformed: u64,
    pub empty_polls: u64,
    pub cursor_failures: u64,
    pub activations: u64,
}

/// Counting subscriber.
#[derive(Default)]
pub struct Stats {
    forwarded: AtomicU64,
    delivery_panics: AtomicU64,
    malformed: AtomicU64,
    empty_polls: AtomicU64,
    cursor_failures: AtomicU64,
    activations: AtomicU64,
}

impl Stats {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            forwarded: self.forwarded.load(Ordering::Relaxed),
            delivery_panics: self.delivery_panics.load(Ordering::Relaxed),
            malformed: self.malformed.load(Ordering::Relaxed),
            empty_polls: self.empty_polls.load(Ordering::Relaxed),
            cursor_failures: self.cursor_failures.load(Ordering::Relaxed),
            activations: self.activations.load(Ordering::Relaxed),
        }
    }
}

#[async_trait]
impl Subscribe for Stats {
    async fn on_event(&self, e: &Event) {
        let counter = match e.kind {
            EventKind::ItemForwarded => &self.forwarded,
            EventKind::DeliveryPanicked => &self.delivery_panics,
            EventKind::RecordMalformed => &self.malformed,
            EventKind::QueueEmpty => &self.empty_polls,
            EventKind::CursorFailed => &self.cursor_failures,
            EventKind::PipelineActivated => &self.activations,
            _ => return,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    fn name(&self) -> &'static str {
        "stats"
    }
}
