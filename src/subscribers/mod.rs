//! # Event subscribers for the drain pipeline.
//!
//! This module provides the [`Subscribe`] trait, the [`SubscriberSet`] fan-out
//! and built-in subscribers for events broadcast through the
//! [`Bus`](crate::events::Bus).
//!
//! ## Architecture
//! ```text
//! Event flow:
//!   Cursor/Supervisor ── publish(Event) ──► Bus ──► lifecycle listener
//!                                                        │
//!                                                 SubscriberSet::emit(&Event)
//!                                                        │
//!                                              ┌─────────┼─────────┐
//!                                              ▼         ▼         ▼
//!                                          LogWriter   Stats    Custom
//! ```
//!
//! ## Built-in subscribers
//! - [`LogWriter`] renders events with `tracing`
//! - [`Stats`] keeps atomic traffic counters
//!
//! ## Implementing custom subscribers
//! ```no_run
//! use queuedrain::{Event, EventKind, Subscribe};
//! use async_trait::async_trait;
//!
//! struct Alerts;
//!
//! #[async_trait]
//! impl Subscribe for Alerts {
//!     async fn on_event(&self, event: &Event) {
//!         if event.kind == EventKind::CursorFailed {
//!             // page someone
//!         }
//!     }
//!
//!     fn name(&self) -> &'static str { "alerts" }
//! }
//! ```

mod log;
mod set;
mod stats;
mod subscribe;

pub use log::LogWriter;
pub use set::SubscriberSet;
pub use stats::{Stats, StatsSnapshot};
pub use subscribe::Subscribe;
