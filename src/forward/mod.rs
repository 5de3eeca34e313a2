//! # Downstream delivery.
//!
//! - [`Forward`] - trait for a fire-and-forget downstream target
//! - [`ForwardRef`] - shared reference to a target (`Arc<dyn Forward>`)
//! - [`ForwardFn`] - closure-backed target
//! - [`ForwardingConsumer`] - hands each drained item to the target

mod consumer;
mod target;

pub use consumer::ForwardingConsumer;
pub use target::{Forward, ForwardFn, ForwardRef};
