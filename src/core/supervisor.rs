//! # RestartSupervisor: keeps the drain alive across store failures.
//!
//! Runs a fresh [`PacedCursor`] per attempt and restarts it with
//! [`BackoffPolicy`] delays whenever the store take-operation fails.
//!
//! ## Event flow
//! For each attempt, the supervisor publishes:
//! ```text
//! CursorStarting → [drain] → (token cancelled) → exit
//!                          → CursorFailed → BackoffScheduled → [sleep] → next attempt
//! ```
//!
//! ## Architecture
//! ```text
//! loop {
//!   ├─► attempt += 1
//!   ├─► publish CursorStarting
//!   ├─► drain_once(fresh cursor) ───► Ok  → exit (cancelled)
//!   │                           └───► Err → publish CursorFailed
//!   ├─► healthy run (lasted >= backoff.min)? → failures = 0
//!   ├─► delay = backoff.next(failures); failures += 1
//!   ├─► publish BackoffScheduled
//!   └─► sleep(delay) (cancellable)
//! }
//! ```
//!
//! ## Rules
//! - Restarts are **unbounded**: a permanently unreachable store means
//!   restarts forever at the backoff cadence.
//! - Every attempt starts a **cold** cursor; there is no position to resume.
//! - Attempts run **sequentially** (never two cursors at once).

use std::sync::Arc;

use tokio::{select, time};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::core::{cursor::PacedCursor, runner::drain_once};
use crate::events::{Bus, Event, EventKind};
use crate::forward::ForwardingConsumer;
use crate::policies::{BackoffPolicy, PacingPolicy};
use crate::store::StoreRef;

/// Parameters for a restart supervisor, extracted from [`Config`](crate::Config).
#[derive(Clone, Debug)]
pub struct SupervisorParams {
    /// Cursor pacing.
    pub pacing: PacingPolicy,
    /// Restart delays.
    pub backoff: BackoffPolicy,
    /// Optional per-take timeout (`None` = no timeout).
    pub take_timeout: Option<std::time::Duration>,
}

/// Supervises the cursor of one pipeline.
pub struct RestartSupervisor {
    store: StoreRef,
    consumer: ForwardingConsumer,
    params: SupervisorParams,
    bus: Bus,
    pipeline: Arc<str>,
}

impl RestartSupervisor {
    pub fn new(
        store: StoreRef,
        consumer: ForwardingConsumer,
        params: SupervisorParams,
        bus: Bus,
        pipeline: Arc<str>,
    ) -> Self {
        Self {
            store,
            consumer,
            params,
            bus,
            pipeline,
        }
    }

    /// Runs until `token` is cancelled. Never gives up on its own.
    ///
    /// ### Cancellation semantics
    /// - Checked before each attempt and during the restart sleep.
    /// - Inside an attempt, only the cursor's delays are cancellable; an issued
    ///   take and the delivery of its item always complete.
    pub async fn run(self, token: CancellationToken) {
        let mut attempt: u32 = 0;
        let mut failures: u32 = 0;

        loop {
            if token.is_cancelled() {
                break;
            }

            attempt = attempt.saturating_add(1);
            self.bus.publish(
                Event::new(EventKind::CursorStarting)
                    .with_pipeline(Arc::clone(&self.pipeline))
                    .with_attempt(attempt),
            );
            info!(pipeline = %self.pipeline, attempt, "starting cursor");

            let cursor = PacedCursor::new(
                Arc::clone(&self.store),
                self.params.pacing,
                self.params.take_timeout,
                self.bus.clone(),
                Arc::clone(&self.pipeline),
            );
            let started = time::Instant::now();

            let err = match drain_once(cursor, &self.consumer, &token).await {
                Ok(()) => break,
                Err(e) => e,
            };

            if started.elapsed() >= self.params.backoff.min {
                failures = 0;
            }
            let delay = self.params.backoff.next(failures);
            failures = failures.saturating_add(1);

            warn!(
                pipeline = %self.pipeline,
                attempt,
                error = %err,
                label = err.as_label(),
                ?delay,
                "cursor failed; restarting"
            );
            self.bus.publish(
                Event::new(EventKind::CursorFailed)
                    .with_pipeline(Arc::clone(&self.pipeline))
                    .with_attempt(attempt)
                    .with_reason(err.to_string()),
            );
            self.bus.publish(
                Event::new(EventKind::BackoffScheduled)
                    .with_pipeline(Arc::clone(&self.pipeline))
                    .with_attempt(attempt)
                    .with_delay(delay)
                    .with_reason(err.to_string()),
            );

            let sleep = time::sleep(delay);
            tokio::pin!(sleep);
            select! {
                _ = &mut sleep => {}
                _ = token.cancelled() => { break; }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    use serde_json::json;
    use tokio::sync::mpsc;

    use crate::error::StoreError;
    use crate::model::{RawRecord, WorkItem};
    use crate::store::StoreFn;

    fn supervisor(
        store: StoreRef,
        backoff: BackoffPolicy,
        bus: Bus,
    ) -> (RestartSupervisor, mpsc::UnboundedReceiver<WorkItem>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let consumer = ForwardingConsumer::new(Arc::new(tx), bus.clone(), Arc::from("p"));
        let params = SupervisorParams {
            pacing: PacingPolicy::immediate(),
            backoff,
            take_timeout: None,
        };
        (RestartSupervisor::new(store, consumer, params, bus, Arc::from("p")), rx)
    }

    /// Yields one item, then fails every other take.
    fn one_then_failing(calls: Arc<AtomicU32>) -> StoreRef {
        StoreFn::arc("flaky", move || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n == 0 {
                    Ok(RawRecord::from_value(json!({ "id": "a", "revision": 1 })))
                } else {
                    Err(StoreError::unavailable("refused"))
                }
            }
        })
    }

    #[tokio::test(start_paused = true)]
    async fn test_restarts_forever_at_backoff_cadence() {
        let calls = Arc::new(AtomicU32::new(0));
        let bus = Bus::new(1024);
        let mut events = bus.subscribe();
        let (sup, mut items) = supervisor(
            one_then_failing(calls.clone()),
            BackoffPolicy::fixed(Duration::from_secs(1)),
            bus,
        );
        let token = CancellationToken::new();
        let run = tokio::spawn(sup.run(token.clone()));

        assert_eq!(items.recv().await, Some(WorkItem::new("a", 1)));

        let mut restarts = 0;
        let mut last_failure: Option<time::Instant> = None;
        while restarts < 20 {
            let ev = events.recv().await.unwrap();
            match ev.kind {
                EventKind::BackoffScheduled => {
                    assert_eq!(ev.delay(), Some(Duration::from_secs(1)));
                    restarts += 1;
                    last_failure = Some(time::Instant::now());
                }
                EventKind::CursorStarting => {
                    if let Some(at) = last_failure {
                        assert!(at.elapsed() >= Duration::from_secs(1));
                    }
                }
                _ => {}
            }
        }

        token.cancel();
        run.await.unwrap();
        assert!(calls.load(Ordering::SeqCst) >= 21);
    }

    #[tokio::test(start_paused = true)]
    async fn test_backoff_grows_while_unhealthy() {
        let bus = Bus::new(1024);
        let mut events = bus.subscribe();
        let store: StoreRef = StoreFn::arc("down", || async {
            Err::<Option<RawRecord>, _>(StoreError::unavailable("refused"))
        });
        let backoff = BackoffPolicy {
            min: Duration::from_millis(100),
            max: Duration::from_millis(400),
            factor: 2.0,
            jitter: 0.0,
        };
        let (sup, _items) = supervisor(store, backoff, bus);
        let token = CancellationToken::new();
        let run = tokio::spawn(sup.run(token.clone()));

        let mut delays = Vec::new();
        while delays.len() < 4 {
            let ev = events.recv().await.unwrap();
            if ev.kind == EventKind::BackoffScheduled {
                delays.push(ev.delay_ms.unwrap());
            }
        }
        assert_eq!(delays, vec![100, 200, 400, 400]);

        token.cancel();
        run.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_during_backoff_exits() {
        let store: StoreRef = StoreFn::arc("down", || async {
            Err::<Option<RawRecord>, _>(StoreError::unavailable("refused"))
        });
        let backoff = BackoffPolicy::fixed(Duration::from_secs(3600));
        let (sup, _items) = supervisor(store, backoff, Bus::new(8));
        let token = CancellationToken::new();
        let run = tokio::spawn(sup.run(token.clone()));

        time::sleep(Duration::from_secs(1)).await;
        token.cancel();
        run.await.unwrap();
    }
}
