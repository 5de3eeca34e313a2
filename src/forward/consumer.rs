use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tracing::{debug, warn};

use crate::error::panic_message;
use crate::events::{Bus, Event, EventKind};
use crate::forward::ForwardRef;
use crate::model::WorkItem;

/// Delivers each drained [`WorkItem`] to the configured target, at most once.
///
/// Delivery is never raced against cancellation: once `deliver` starts it runs
/// until the target returns, because the item's record is already gone from
/// the queue. A target that panics loses that one item; the panic is reported
/// as `DeliveryPanicked` and the drain goes on.
#[derive(Clone)]
pub struct ForwardingConsumer {
    target: ForwardRef,
    bus: Bus,
    pipeline: Arc<str>,
}

impl ForwardingConsumer {
    pub fn new(target: ForwardRef, bus: Bus, pipeline: Arc<str>) -> Self {
        Self {
            target,
            bus,
            pipeline,
        }
    }

    /// Hands `item` to the target and reports it on the bus.
    pub async fn deliver(&self, item: WorkItem) {
        debug!(pipeline = %self.pipeline, target = self.target.name(), %item, "forwarding item");
        let handed = AssertUnwindSafe(self.target.forward(item.clone()))
            .catch_unwind()
            .await;

        let event = match handed {
            Ok(()) => Event::new(EventKind::ItemForwarded),
            Err(payload) => {
                let info = panic_message(payload.as_ref());
                warn!(
                    pipeline = %self.pipeline,
                    target = self.target.name(),
                    %item,
                    panic = %info,
                    "target panicked; item lost"
                );
                Event::new(EventKind::DeliveryPanicked).with_reason(info)
            }
        };
        self.bus.publish(
            event
                .with_pipeline(Arc::clone(&self.pipeline))
                .with_item(item),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    use crate::forward::ForwardFn;

    #[tokio::test]
    async fn test_deliver_reports_forwarded_item() {
        let bus = Bus::new(8);
        let mut events = bus.subscribe();
        let (tx, mut rx) = mpsc::unbounded_channel::<WorkItem>();
        let consumer = ForwardingConsumer::new(Arc::new(tx), bus, Arc::from("p"));

        consumer.deliver(WorkItem::new("a", 1)).await;

        assert_eq!(rx.recv().await, Some(WorkItem::new("a", 1)));
        let ev = events.recv().await.unwrap();
        assert_eq!(ev.kind, EventKind::ItemForwarded);
        assert_eq!(ev.item, Some(WorkItem::new("a", 1)));
    }

    #[tokio::test]
    async fn test_target_panic_is_contained() {
        let bus = Bus::new(8);
        let mut events = bus.subscribe();
        let target = ForwardFn::arc("broken", |item: WorkItem| async move {
            panic!("cannot route {item}");
        });
        let consumer = ForwardingConsumer::new(target, bus, Arc::from("p"));

        consumer.deliver(WorkItem::new("a", 1)).await;

        let ev = events.recv().await.unwrap();
        assert_eq!(ev.kind, EventKind::DeliveryPanicked);
        assert_eq!(ev.pipeline.as_deref(), Some("p"));
        assert_eq!(ev.item, Some(WorkItem::new("a", 1)));
        assert_eq!(ev.reason.as_deref(), Some("cannot route a@1"));
    }
}
