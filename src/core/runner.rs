//! # Drive one cursor instance to cancellation or failure.
//!
//! Pulls items from a [`PacedCursor`] stream and hands each one to the
//! [`ForwardingConsumer`], strictly one at a time:
//!
//! ```text
//! cursor.into_stream(token)
//!   ├─► Ok(item)  → consumer.deliver(item).await   (never cancelled mid-flight)
//!   │               └─► next poll of the stream → next per_item delay → next take
//!   ├─► Err(e)    → return Err(e)                  (supervisor restarts)
//!   └─► end       → return Ok(())                  (token cancelled)
//! ```
//!
//! ## Rules
//! - At most one item is in flight: the stream is not polled again until the
//!   previous delivery has returned, so a slow target throttles the drain.
//! - Items are delivered in take order.

use futures::TryStreamExt;
use tokio_util::sync::CancellationToken;

use crate::core::cursor::PacedCursor;
use crate::error::StoreError;
use crate::forward::ForwardingConsumer;

/// Runs `cursor` until `token` is cancelled (`Ok`) or the store fails (`Err`).
pub(crate) async fn drain_once(
    cursor: PacedCursor,
    consumer: &ForwardingConsumer,
    token: &CancellationToken,
) -> Result<(), StoreError> {
    let items = cursor.into_stream(token.clone());
    tokio::pin!(items);

    while let Some(item) = items.try_next().await? {
        consumer.deliver(item).await;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    use tokio::sync::mpsc;

    use crate::events::Bus;
    use crate::forward::ForwardFn;
    use crate::model::{RawRecord, WorkItem};
    use crate::policies::PacingPolicy;
    use crate::store::{MemoryQueue, StoreFn, StoreRef};

    #[tokio::test]
    async fn test_store_failure_ends_the_run() {
        let store: StoreRef = StoreFn::arc("down", || async {
            Err::<Option<RawRecord>, _>(StoreError::unavailable("refused"))
        });
        let bus = Bus::new(8);
        let cursor = PacedCursor::new(
            store,
            PacingPolicy::immediate(),
            None,
            bus.clone(),
            Arc::from("p"),
        );
        let (tx, _rx) = mpsc::unbounded_channel::<WorkItem>();
        let consumer = ForwardingConsumer::new(Arc::new(tx), bus, Arc::from("p"));

        let res = drain_once(cursor, &consumer, &CancellationToken::new()).await;
        assert_eq!(res, Err(StoreError::unavailable("refused")));
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_target_throttles_takes() {
        let store = Arc::new(MemoryQueue::new("q"));
        for n in 0..3 {
            store.push_item(&WorkItem::new(format!("t{n}"), n)).await;
        }
        let bus = Bus::new(64);
        let token = CancellationToken::new();

        let (seen_tx, mut seen_rx) = mpsc::unbounded_channel::<(WorkItem, usize)>();
        let target = {
            let store = store.clone();
            ForwardFn::arc("slow", move |item: WorkItem| {
                let store = store.clone();
                let seen_tx = seen_tx.clone();
                async move {
                    tokio::time::sleep(Duration::from_secs(5)).await;
                    // nothing else may have been taken while this delivery was in flight
                    let left = store.len().await;
                    let _ = seen_tx.send((item, left));
                }
            })
        };
        let cursor = PacedCursor::new(
            store.clone(),
            PacingPolicy::immediate(),
            None,
            bus.clone(),
            Arc::from("p"),
        );
        let consumer = ForwardingConsumer::new(target, bus, Arc::from("p"));

        let run = tokio::spawn({
            let token = token.clone();
            async move { drain_once(cursor, &consumer, &token).await }
        });

        for expected_left in [2, 1, 0] {
            let (_, left) = seen_rx.recv().await.unwrap();
            assert_eq!(left, expected_left);
        }
        token.cancel();
        assert_eq!(run.await.unwrap(), Ok(()));
    }
}
