//! # Work queue store abstraction.
//!
//! The pipeline touches the shared queue through exactly one operation,
//! [`WorkQueueStore::take_one`], which must:
//! - be atomic (no two callers ever observe the same record),
//! - remove the record as part of returning it (not merely mark it read),
//! - surface connectivity/timeout/protocol problems as [`StoreError`], never
//!   as an empty result.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::StoreError;
use crate::model::RawRecord;

/// # Destructive, atomic access to a shared work queue.
///
/// # Example
/// ```
/// use async_trait::async_trait;
/// use queuedrain::{RawRecord, StoreError, WorkQueueStore};
///
/// struct AlwaysEmpty;
///
/// #[async_trait]
/// impl WorkQueueStore for AlwaysEmpty {
///     fn name(&self) -> &str { "always-empty" }
///
///     async fn take_one(&self) -> Result<Option<RawRecord>, StoreError> {
///         Ok(None)
///     }
/// }
/// ```
#[async_trait]
pub trait WorkQueueStore: Send + Sync + 'static {
    /// Returns a stable, human-readable store name.
    fn name(&self) -> &str;

    /// Removes and returns at most one record; `Ok(None)` when the queue is empty.
    async fn take_one(&self) -> Result<Option<RawRecord>, StoreError>;
}

/// Shared handle to a store.
pub type StoreRef = Arc<dyn WorkQueueStore>;
