//! # queuedrain
//!
//! **queuedrain** drains a shared work queue of pending reindex requests and
//! forwards each one to a downstream processor, at a bounded and self-paced
//! rate, surviving store failures by restarting with backoff.
//!
//! The queue lives in an external shared store that many processes may write
//! to; a singleton/leader-election mechanism decides which process owns the
//! drain. This crate is the owner's side: a [`PipelineLifecycle`] that starts
//! a drain chain on [`OwnershipSignal::Activated`] and stops it on
//! [`OwnershipSignal::Deactivated`].
//!
//! ## Architecture
//! ### Overview
//! ```text
//!   OwnershipSignal ──► PipelineLifecycle (one chain at a time)
//!                              │ activate()
//!                              ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  RestartSupervisor (restarts forever, BackoffPolicy delays)       │
//! │                                                                   │
//! │   ┌──────────────┐  WorkItem   ┌────────────────────┐             │
//! │   │ PacedCursor  │ ──────────► │ ForwardingConsumer │ ──► target  │
//! │   │ (pull, paced)│  one at a   │ (fire-and-forget)  │  (Forward)  │
//! │   └──────┬───────┘    time     └────────────────────┘             │
//! │          │ take_one()                                             │
//! └──────────┼────────────────────────────────────────────────────────┘
//!            ▼
//!     WorkQueueStore (shared, destructive take)
//!
//!  Publishers ──► Bus (broadcast) ──► listener ──► SubscriberSet
//!                                                  ├─► LogWriter
//!                                                  ├─► Stats
//!                                                  └─► custom
//! ```
//!
//! ### Cursor cycle
//! ```text
//! loop {
//!   ├─► wait per_item                      (cancellable)
//!   ├─► take_one()                         (never cancelled once issued)
//!   │     ├─ record{id, revision} ─► forward, ItemForwarded
//!   │     │                          (target panic ─► DeliveryPanicked, item lost)
//!   │     ├─ malformed record     ─► drop, RecordMalformed
//!   │     ├─ none                 ─► QueueEmpty, wait per_empty_poll (cancellable)
//!   │     └─ store error          ─► CursorFailed, BackoffScheduled,
//!   │                                 sleep backoff, fresh cursor
//!   └─ exit: deactivate() / drop
//! }
//! ```
//!
//! ## Guarantees
//! - Each taken record is forwarded at most once (the take is destructive,
//!   delivery is fire-and-forget).
//! - Items are forwarded in take order, one at a time.
//! - A target that panics loses that one item; the drain keeps going.
//! - No take-operation is issued after deactivation begins.
//! - A permanently unreachable store means restarts forever at the backoff
//!   cadence; the pipeline never gives up on its own.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use std::time::Duration;
//! use queuedrain::{Config, LogWriter, MemoryQueue, PipelineLifecycle, WorkItem};
//! use tokio::sync::mpsc;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut cfg = Config::default();
//!     cfg.pacing.per_item = Duration::from_millis(10);
//!
//!     let queue = Arc::new(MemoryQueue::new("things"));
//!     queue.push_item(&WorkItem::new("thing-1", 7)).await;
//!
//!     let (tx, mut rx) = mpsc::channel::<WorkItem>(16);
//!     let pipeline = PipelineLifecycle::builder(cfg, queue, Arc::new(tx))
//!         .with_subscriber(Arc::new(LogWriter::new()))
//!         .build();
//!
//!     pipeline.activate().await?;
//!     let item = rx.recv().await.ok_or("target closed")?;
//!     assert_eq!(item.id(), "thing-1");
//!     pipeline.deactivate().await?;
//!     Ok(())
//! }
//! ```
mod config;
mod core;
mod error;
mod events;
mod forward;
mod model;
mod policies;
mod store;
mod subscribers;

// ---- Public re-exports ----

pub use config::{Config, DEFAULT_NAME};
pub use core::{
    OwnershipSignal, PacedCursor, PipelineBuilder, PipelineLifecycle, RestartSupervisor,
    SupervisorParams, wait_for_shutdown_signal,
};
pub use error::{ConfigError, PipelineError, StoreError};
pub use events::{Bus, Event, EventKind};
pub use forward::{Forward, ForwardFn, ForwardRef, ForwardingConsumer};
pub use model::{DecodeResult, ID_FIELD, REVISION_FIELD, RawRecord, WorkItem};
pub use policies::{BackoffPolicy, PacingPolicy};
pub use store::{MemoryQueue, StoreFn, StoreRef, WorkQueueStore};
pub use subscribers::{LogWriter, Stats, StatsSnapshot, Subscribe, SubscriberSet};
