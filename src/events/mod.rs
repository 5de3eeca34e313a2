//! Pipeline events: types and broadcast bus.
//!
//! This module groups the event **data model** and the **bus** used to
//! publish/subscribe to events emitted by the lifecycle, the restart
//! supervisor, the cursor and the forwarding consumer.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] event classification and payload metadata
//! - [`Bus`] thin wrapper over `tokio::sync::broadcast`
//!
//! ## Quick reference
//! - **Publishers**: `PipelineLifecycle`, `RestartSupervisor`, `PacedCursor`,
//!   `ForwardingConsumer`, `SubscriberSet` workers (overflow/panic).
//! - **Consumers**: the lifecycle's listener (fans out to `SubscriberSet`) and
//!   any receiver obtained from
//!   [`PipelineLifecycle::subscribe`](crate::PipelineLifecycle::subscribe).

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind};
