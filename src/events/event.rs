//! # Events emitted by the drain pipeline.
//!
//! The [`EventKind`] enum classifies event types across four categories:
//! - **Lifecycle events**: activation, deactivation, rejected activation, grace overrun
//! - **Supervision events**: cursor start, cursor failure, scheduled restart
//! - **Traffic events**: forwarded item, panicked delivery, malformed record, empty poll
//! - **Subscriber events**: subscriber overflow or panic
//!
//! ## Ordering guarantees
//! Each event has a process-wide sequence number (`seq`) that increases
//! monotonically. Use `seq` to restore the exact order when events are
//! delivered out of order.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use queuedrain::{Event, EventKind, WorkItem};
//!
//! let ev = Event::new(EventKind::ItemForwarded)
//!     .with_pipeline("manual-updater")
//!     .with_item(WorkItem::new("a", 1));
//!
//! assert_eq!(ev.kind, EventKind::ItemForwarded);
//! assert_eq!(ev.pipeline.as_deref(), Some("manual-updater"));
//! assert_eq!(ev.item.as_ref().map(|i| i.revision()), Some(1));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::{Duration, SystemTime};

use crate::model::WorkItem;

/// Next event sequence number.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of pipeline events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Lifecycle events ===
    /// Ownership was granted and a fresh drain chain started.
    ///
    /// Sets: `pipeline`
    PipelineActivated,

    /// The drain chain stopped after a deactivation.
    ///
    /// Sets: `pipeline`
    PipelineDeactivated,

    /// An activation arrived while a chain was still running and was refused.
    ///
    /// Sets: `pipeline`, `reason`
    ActivationRejected,

    /// Deactivation waited the whole grace period; the chain was aborted.
    ///
    /// Sets: `pipeline`, `delay_ms` (the grace period)
    GraceExceeded,

    // === Supervision events ===
    /// A fresh cursor instance is starting.
    ///
    /// Sets: `pipeline`, `attempt` (1-based, per activation)
    CursorStarting,

    /// A cursor instance failed because the store take-operation failed.
    ///
    /// Sets: `pipeline`, `attempt`, `reason`
    CursorFailed,

    /// A restart was scheduled after a cursor failure.
    ///
    /// Sets: `pipeline`, `attempt` (the failed attempt), `delay_ms`, `reason`
    BackoffScheduled,

    // === Traffic events ===
    /// An item was handed to the downstream target.
    ///
    /// Sets: `pipeline`, `item`
    ItemForwarded,

    /// The downstream target panicked while handling an item. The item is
    /// lost and the drain continues with the next record.
    ///
    /// Sets: `pipeline`, `item`, `reason` (panic message)
    DeliveryPanicked,

    /// A record was removed from the queue but could not be decoded.
    ///
    /// Sets: `pipeline`
    RecordMalformed,

    /// A take-operation found the queue empty.
    ///
    /// Sets: `pipeline`, `delay_ms` (extra idle delay before the next cycle)
    QueueEmpty,

    // === Subscriber events ===
    /// A subscriber's `on_event` panicked.
    ///
    /// Sets: `subscriber`, `reason`
    SubscriberPanicked,

    /// A subscriber's queue rejected an event (full or closed).
    ///
    /// Sets: `subscriber`, `reason`
    SubscriberOverflow,
}

/// Pipeline event with optional metadata.
///
/// - `seq`: process-wide publish order
/// - `at`: wall-clock time of publication
/// - the remaining fields are filled per [`EventKind`] (see each variant)
#[derive(Clone, Debug)]
pub struct Event {
    /// Publish order, unique within the process.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,
    /// Pipeline identity.
    pub pipeline: Option<Arc<str>>,
    /// Subscriber name, for subscriber events only.
    pub subscriber: Option<&'static str>,
    /// Forwarded work item.
    pub item: Option<WorkItem>,
    /// Cursor attempt count (starting from 1).
    pub attempt: Option<u32>,
    /// Delay in milliseconds (compact).
    pub delay_ms: Option<u32>,
    /// Error text or drop reason.
    pub reason: Option<Arc<str>>,
}

impl Event {
    /// New event stamped with the current time and the next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            pipeline: None,
            subscriber: None,
            item: None,
            attempt: None,
            delay_ms: None,
            reason: None,
        }
    }

    /// Attaches the pipeline name.
    #[inline]
    pub fn with_pipeline(mut self, pipeline: impl Into<Arc<str>>) -> Self {
        self.pipeline = Some(pipeline.into());
        self
    }

    /// Sets `subscriber`.
    #[inline]
    pub fn with_subscriber(mut self, subscriber: &'static str) -> Self {
        self.subscriber = Some(subscriber);
        self
    }

    /// Attaches a work item.
    #[inline]
    pub fn with_item(mut self, item: WorkItem) -> Self {
        self.item = Some(item);
        self
    }

    /// Sets `attempt`.
    #[inline]
    pub fn with_attempt(mut self, n: u32) -> Self {
        self.attempt = Some(n);
        self
    }

    /// Attaches a delay (stored as milliseconds, saturating at `u32::MAX`).
    #[inline]
    pub fn with_delay(mut self, d: Duration) -> Self {
        let ms = d.as_millis().min(u128::from(u32::MAX)) as u32;
        self.delay_ms = Some(ms);
        self
    }

    /// Sets `reason`.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Returns the delay as a [`Duration`], if set.
    pub fn delay(&self) -> Option<Duration> {
        self.delay_ms.map(|ms| Duration::from_millis(u64::from(ms)))
    }

    /// Event for a subscriber that could not accept an event.
    #[inline]
    pub fn subscriber_overflow(subscriber: &'static str, reason: &'static str) -> Self {
        Event::new(EventKind::SubscriberOverflow)
            .with_subscriber(subscriber)
            .with_reason(reason)
    }

    /// Event for a subscriber whose handler panicked.
    #[inline]
    pub fn subscriber_panicked(subscriber: &'static str, info: String) -> Self {
        Event::new(EventKind::SubscriberPanicked)
            .with_subscriber(subscriber)
            .with_reason(info)
    }

    /// True for events produced by the subscriber machinery itself.
    #[inline]
    pub fn is_internal(&self) -> bool {
        matches!(
            self.kind,
            EventKind::SubscriberOverflow | EventKind::SubscriberPanicked
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequence_is_monotonic() {
        let a = Event::new(EventKind::QueueEmpty);
        let b = Event::new(EventKind::QueueEmpty);
        assert!(b.seq > a.seq);
    }

    #[test]
    fn test_delay_saturates() {
        let ev = Event::new(EventKind::BackoffScheduled).with_delay(Duration::from_secs(u64::MAX));
        assert_eq!(ev.delay_ms, Some(u32::MAX));
    }

    #[test]
    fn test_delay_round_trip() {
        let ev = Event::new(EventKind::QueueEmpty).with_delay(Duration::from_millis(1500));
        assert_eq!(ev.delay(), Some(Duration::from_millis(1500)));
    }

    #[test]
    fn test_internal_events() {
        assert!(Event::subscriber_overflow("stats", "full").is_internal());
        assert!(!Event::new(EventKind::ItemForwarded).is_internal());
    }

    #[test]
    fn test_subscriber_events_leave_pipeline_unset() {
        let ev = Event::subscriber_overflow("stats", "full");
        assert_eq!(ev.subscriber, Some("stats"));
        assert_eq!(ev.pipeline, None);
        assert_eq!(ev.reason.as_deref(), Some("full"));

        let ev = Event::subscriber_panicked("alerts", "boom".to_owned());
        assert_eq!(ev.subscriber, Some("alerts"));
        assert_eq!(ev.pipeline, None);
    }
}
