//! # Shared work queue access.
//!
//! This module provides the store-related types:
//! - [`WorkQueueStore`] - trait for an atomic "take one or none" queue
//! - [`StoreRef`] - shared reference to a store (`Arc<dyn WorkQueueStore>`)
//! - [`StoreFn`] - closure-backed store
//! - [`MemoryQueue`] - in-process FIFO store

mod memory;
mod store;
mod store_fn;

pub use memory::MemoryQueue;
pub use store::{StoreRef, WorkQueueStore};
pub use store_fn::StoreFn;
