//! # Subscriber trait
//!
//! Implement [`Subscribe`] to observe the pipeline: alerting, counters, audit
//! trails. The [`SubscriberSet`](crate::SubscriberSet) gives every subscriber
//! its own worker and bounded queue, so a slow handler only ever delays itself.
//! When that queue is full the event is dropped for this subscriber and a
//! `SubscriberOverflow` event is published instead.

use async_trait::async_trait;

use crate::events::Event;

/// Pipeline event handler.
#[async_trait]
pub trait Subscribe: Send + Sync + 'static {
    /// Called once per event, in publish order.
    async fn on_event(&self, event: &Event);

    /// Name used in logs and overflow/panic events.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Queue depth for this subscriber's worker.
    fn queue_capacity(&self) -> usize {
        256
    }
}
