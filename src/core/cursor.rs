//! # PacedCursor: self-paced puller over the shared queue.
//!
//! Produces a lazy, effectively infinite sequence of [`WorkItem`]s, one per
//! successfully decoded record, pacing itself by [`PacingPolicy`].
//!
//! ## Cycle
//! ```text
//! loop {
//!   ├─► wait per_item (cancellable)          ← measured from the end of the previous cycle
//!   ├─► take_one() (NOT cancellable)         ← destructive; must finish once issued
//!   ├─► classify:
//!   │     ├─ Item(item)  → yield item
//!   │     ├─ Malformed   → publish RecordMalformed, continue
//!   │     └─ Empty       → publish QueueEmpty, wait per_empty_poll (cancellable), continue
//!   └─► Err(store)       → yield error, sequence ends
//! }
//! ```
//!
//! ## Rules
//! - The cursor holds no position: every instance starts cold.
//! - It never ends on its own; only cancellation or a store error stops it.
//! - A take that has been issued always completes, so a removed record is
//!   never abandoned by cancellation.

use std::sync::Arc;
use std::time::Duration;

use futures::{Stream, stream};
use tokio::{select, time};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use crate::error::StoreError;
use crate::events::{Bus, Event, EventKind};
use crate::model::{DecodeResult, RawRecord, WorkItem};
use crate::policies::PacingPolicy;
use crate::store::StoreRef;

/// Cursor over a [`WorkQueueStore`](crate::WorkQueueStore).
pub struct PacedCursor {
    store: StoreRef,
    pacing: PacingPolicy,
    take_timeout: Option<Duration>,
    bus: Bus,
    pipeline: Arc<str>,
}

impl PacedCursor {
    /// Creates a cold cursor.
    pub fn new(
        store: StoreRef,
        pacing: PacingPolicy,
        take_timeout: Option<Duration>,
        bus: Bus,
        pipeline: Arc<str>,
    ) -> Self {
        Self {
            store,
            pacing,
            take_timeout,
            bus,
            pipeline,
        }
    }

    /// Pulls the next decodable item.
    ///
    /// Returns `Ok(None)` once `token` is cancelled during a delay, and the
    /// store error if a take-operation fails.
    pub async fn next_item(
        &self,
        token: &CancellationToken,
    ) -> Result<Option<WorkItem>, StoreError> {
        loop {
            if !pause(self.pacing.per_item, token).await {
                return Ok(None);
            }

            let outcome = DecodeResult::classify(self.take().await?);
            let extra = self.pacing.extra_delay(&outcome);
            match outcome {
                DecodeResult::Item(item) => return Ok(Some(item)),
                DecodeResult::Malformed => {
                    debug!(pipeline = %self.pipeline, "dropping malformed record");
                    self.bus.publish(
                        Event::new(EventKind::RecordMalformed)
                            .with_pipeline(Arc::clone(&self.pipeline)),
                    );
                }
                DecodeResult::Empty => {
                    trace!(pipeline = %self.pipeline, idle = ?extra, "queue empty");
                    self.bus.publish(
                        Event::new(EventKind::QueueEmpty)
                            .with_pipeline(Arc::clone(&self.pipeline))
                            .with_delay(extra),
                    );
                    if !pause(extra, token).await {
                        return Ok(None);
                    }
                }
            }
        }
    }

    /// Turns the cursor into a stream of items.
    ///
    /// The stream is pull-based: the next take happens only when the stream is
    /// polled again. It ends after cancellation, or right after yielding the
    /// first store error.
    pub fn into_stream(
        self,
        token: CancellationToken,
    ) -> impl Stream<Item = Result<WorkItem, StoreError>> + Send {
        stream::try_unfold((self, token), |(cursor, token)| async move {
            let next = cursor.next_item(&token).await?;
            Ok(next.map(|item| (item, (cursor, token))))
        })
    }

    async fn take(&self) -> Result<Option<RawRecord>, StoreError> {
        match self.take_timeout {
            Some(timeout) => time::timeout(timeout, self.store.take_one())
                .await
                .map_err(|_elapsed| StoreError::Timeout { timeout })?,
            None => self.store.take_one().await,
        }
    }
}

/// Waits `delay` unless `token` is cancelled first. Returns `false` on cancellation.
///
/// A zero delay still yields to the scheduler so that an idle, unpaced loop
/// cannot starve other tasks on the same runtime.
async fn pause(delay: Duration, token: &CancellationToken) -> bool {
    if token.is_cancelled() {
        return false;
    }
    if delay.is_zero() {
        tokio::task::yield_now().await;
        return !token.is_cancelled();
    }

    let sleep = time::sleep(delay);
    tokio::pin!(sleep);
    select! {
        biased;
        _ = token.cancelled() => false,
        _ = &mut sleep => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryQueue, StoreFn};
    use futures::StreamExt;
    use serde_json::json;
    use tokio::time::Instant;

    fn assert_elapsed(start: Instant, expected: Duration) {
        let elapsed = start.elapsed();
        assert!(
            elapsed >= expected && elapsed < expected + Duration::from_millis(50),
            "elapsed {elapsed:?}, expected {expected:?}"
        );
    }

    fn cursor(store: StoreRef, pacing: PacingPolicy) -> PacedCursor {
        PacedCursor::new(store, pacing, None, Bus::new(64), Arc::from("test"))
    }

    fn queue(values: Vec<serde_json::Value>) -> Arc<MemoryQueue> {
        Arc::new(MemoryQueue::with_records(
            "q",
            values.into_iter().filter_map(RawRecord::from_value),
        ))
    }

    #[tokio::test]
    async fn test_skips_malformed_records() {
        let store = queue(vec![
            json!({ "id": "a" }),
            json!({ "id": "b", "revision": 2 }),
        ]);
        let c = cursor(store.clone(), PacingPolicy::immediate());
        let token = CancellationToken::new();

        assert_eq!(c.next_item(&token).await.unwrap(), Some(WorkItem::new("b", 2)));
        assert!(store.is_empty().await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_malformed_costs_only_per_item_delay() {
        let store = queue(vec![
            json!({ "revision": 1 }),
            json!({ "id": "b", "revision": 2 }),
        ]);
        let pacing = PacingPolicy {
            per_item: Duration::from_secs(1),
            per_empty_poll: Duration::from_secs(60),
        };
        let c = cursor(store, pacing);
        let token = CancellationToken::new();

        let start = Instant::now();
        assert_eq!(c.next_item(&token).await.unwrap(), Some(WorkItem::new("b", 2)));
        assert_elapsed(start, Duration::from_secs(2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_poll_waits_extra() {
        let store = Arc::new(MemoryQueue::new("q"));
        let pacing = PacingPolicy {
            per_item: Duration::from_secs(1),
            per_empty_poll: Duration::from_secs(60),
        };
        let c = cursor(store.clone(), pacing);
        let token = CancellationToken::new();

        let producer = {
            let store = store.clone();
            tokio::spawn(async move {
                time::sleep(Duration::from_millis(1500)).await;
                store.push_item(&WorkItem::new("late", 1)).await;
            })
        };

        let start = Instant::now();
        let item = c.next_item(&token).await.unwrap();
        assert_eq!(item, Some(WorkItem::new("late", 1)));
        // take at 1s (empty), idle 60s, per-item 1s, take at 62s
        assert_elapsed(start, Duration::from_secs(62));
        producer.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_during_delay_returns_none() {
        let c = cursor(Arc::new(MemoryQueue::new("q")), PacingPolicy::default());
        let token = CancellationToken::new();
        let canceller = token.clone();
        tokio::spawn(async move {
            time::sleep(Duration::from_secs(10)).await;
            canceller.cancel();
        });

        let start = Instant::now();
        assert_eq!(c.next_item(&token).await.unwrap(), None);
        assert_elapsed(start, Duration::from_secs(10));
    }

    #[tokio::test]
    async fn test_store_error_is_propagated_not_emptied() {
        let store: StoreRef = StoreFn::arc("down", || async {
            Err::<Option<RawRecord>, _>(StoreError::unavailable("refused"))
        });
        let c = cursor(store, PacingPolicy::immediate());
        let err = c.next_item(&CancellationToken::new()).await.unwrap_err();
        assert_eq!(err, StoreError::unavailable("refused"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_take_timeout_fails_the_cursor() {
        let store: StoreRef = StoreFn::arc("slow", || async {
            time::sleep(Duration::from_secs(30)).await;
            Ok::<Option<RawRecord>, StoreError>(None)
        });
        let timeout = Duration::from_secs(5);
        let c = PacedCursor::new(
            store,
            PacingPolicy::immediate(),
            Some(timeout),
            Bus::new(8),
            Arc::from("test"),
        );
        let err = c.next_item(&CancellationToken::new()).await.unwrap_err();
        assert_eq!(err, StoreError::Timeout { timeout });
    }

    #[tokio::test]
    async fn test_stream_ends_after_error() {
        let calls = Arc::new(std::sync::atomic::AtomicU32::new(0));
        let store: StoreRef = {
            let calls = calls.clone();
            StoreFn::arc("flaky", move || {
                let n = calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
                async move {
                    match n {
                        0 => Ok(RawRecord::from_value(json!({ "id": "a", "revision": 1 }))),
                        _ => Err(StoreError::protocol("bad reply")),
                    }
                }
            })
        };
        let items: Vec<_> = cursor(store, PacingPolicy::immediate())
            .into_stream(CancellationToken::new())
            .collect()
            .await;

        assert_eq!(items.len(), 2);
        assert_eq!(items[0], Ok(WorkItem::new("a", 1)));
        assert_eq!(items[1], Err(StoreError::protocol("bad reply")));
        assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_publishes_traffic_events() {
        let bus = Bus::new(1024);
        let mut rx = bus.subscribe();
        let store = queue(vec![json!({ "id": 1 })]);
        let c = PacedCursor::new(store, PacingPolicy::immediate(), None, bus, Arc::from("p"));
        let token = CancellationToken::new();

        let run = tokio::spawn({
            let token = token.clone();
            async move { c.next_item(&token).await }
        });

        assert_eq!(rx.recv().await.unwrap().kind, EventKind::RecordMalformed);
        let empty = rx.recv().await.unwrap();
        assert_eq!(empty.kind, EventKind::QueueEmpty);
        assert_eq!(empty.pipeline.as_deref(), Some("p"));

        token.cancel();
        assert_eq!(run.await.unwrap().unwrap(), None);
    }
}
