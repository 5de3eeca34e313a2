//! # In-process FIFO work queue.
//!
//! [`MemoryQueue`] is a [`WorkQueueStore`] over a `VecDeque` guarded by a tokio
//! mutex. `take_one` pops the front record under the lock, so it is atomic and
//! destructive like a real find-one-and-delete.

use std::borrow::Cow;
use std::collections::VecDeque;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::error::StoreError;
use crate::model::{RawRecord, WorkItem};
use crate::store::WorkQueueStore;

/// FIFO queue kept in memory.
#[derive(Debug)]
pub struct MemoryQueue {
    name: Cow<'static, str>,
    records: Mutex<VecDeque<RawRecord>>,
}

impl MemoryQueue {
    /// Creates an empty queue.
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self::with_records(name, [])
    }

    /// Creates a queue pre-filled with `records` in iteration order.
    pub fn with_records(
        name: impl Into<Cow<'static, str>>,
        records: impl IntoIterator<Item = RawRecord>,
    ) -> Self {
        Self {
            name: name.into(),
            records: Mutex::new(records.into_iter().collect()),
        }
    }

    /// Appends a record.
    pub async fn push(&self, record: RawRecord) {
        self.records.lock().await.push_back(record);
    }

    /// Appends the record form of `item`.
    pub async fn push_item(&self, item: &WorkItem) {
        self.push(RawRecord::from(item)).await;
    }

    /// Number of records still queued.
    pub async fn len(&self) -> usize {
        self.records.lock().await.len()
    }

    /// True when nothing is queued.
    pub async fn is_empty(&self) -> bool {
        self.records.lock().await.is_empty()
    }
}

#[async_trait]
impl WorkQueueStore for MemoryQueue {
    fn name(&self) -> &str {
        &self.name
    }

    async fn take_one(&self) -> Result<Option<RawRecord>, StoreError> {
        Ok(self.records.lock().await.pop_front())
    }
}
