//! # Event bus for broadcasting pipeline events.
//!
//! [`Bus`] wraps a [`tokio::sync::broadcast`] sender and gives every stage of
//! the drain chain a publish call that never blocks.
//!
//! ## Architecture
//! ```text
//! Publishers:                          Subscribers:
//!   Lifecycle  ──┐
//!   Supervisor ──┼──────► Bus ───────► lifecycle listener ────► SubscriberSet
//!   Cursor     ──┤  (broadcast chan) ─► PipelineLifecycle::subscribe() receivers
//!   Consumer   ──┘
//! ```
//!
//! ## Rules
//! - **Non-blocking publish**: `publish()` never blocks and never slows the cursor.
//! - **Bounded**: one ring buffer of `capacity` events is shared by all receivers.
//! - **Lagging**: a receiver that falls behind sees `RecvError::Lagged(n)` and
//!   loses the `n` oldest events.
//! - **No persistence**: events are lost if there are no active receivers at send time.

use tokio::sync::broadcast;

use super::event::Event;

/// Broadcast channel for pipeline events.
///
/// ### Properties
/// - **Non-blocking**: `publish()` returns immediately.
/// - **Lossy**: nothing is stored for receivers that do not exist yet.
/// - **Clone**: clones share one channel.
#[derive(Clone, Debug)]
pub struct Bus {
    tx: broadcast::Sender<Event>,
}

impl Bus {
    /// Creates a new bus with the given channel capacity (clamped to at least 1).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (tx, _rx) = broadcast::channel::<Event>(capacity);
        Self { tx }
    }

    /// Publishes an event to all active receivers.
    ///
    /// If there are no receivers, the event is dropped.
    pub fn publish(&self, ev: Event) {
        let _ = self.tx.send(ev);
    }

    /// Creates a new receiver that observes events sent after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventKind;

    #[tokio::test]
    async fn test_publish_reaches_receiver() {
        let bus = Bus::new(8);
        let mut rx = bus.subscribe();
        bus.publish(Event::new(EventKind::QueueEmpty));
        let ev = rx.recv().await.unwrap();
        assert_eq!(ev.kind, EventKind::QueueEmpty);
    }

    #[test]
    fn test_publish_without_receivers_is_noop() {
        let bus = Bus::new(0);
        bus.publish(Event::new(EventKind::QueueEmpty));
    }
}
