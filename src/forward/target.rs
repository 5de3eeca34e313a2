//! # Fire-and-forget downstream targets.
//!
//! [`Forward::forward`] returns `()`: there is no acknowledgment to wait for
//! and nothing to retry. Once an item has been taken from the queue and handed
//! to a target, it is the target's problem. Consumers downstream are expected
//! to be idempotent and to tolerate loss.
//!
//! A target may still await (I/O, a bounded channel). The cursor does not take
//! the next record until `forward` returns, so a slow target throttles the drain.
//!
//! ## Built-in targets
//! - `tokio::sync::mpsc::Sender<WorkItem>`: waits for channel capacity; a closed
//!   channel silently drops the item.
//! - `tokio::sync::mpsc::UnboundedSender<WorkItem>`: never waits.
//! - [`ForwardFn`]: any async closure.

use std::borrow::Cow;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::model::WorkItem;

/// # Downstream target for drained work items.
#[async_trait]
pub trait Forward: Send + Sync + 'static {
    /// Human-readable target name (for logs).
    fn name(&self) -> &str {
        "forward"
    }

    /// Hands `item` to the target. No acknowledgment, no error.
    async fn forward(&self, item: WorkItem);
}

/// Shared handle to a downstream target.
pub type ForwardRef = Arc<dyn Forward>;

#[async_trait]
impl Forward for mpsc::Sender<WorkItem> {
    fn name(&self) -> &str {
        "mpsc"
    }

    async fn forward(&self, item: WorkItem) {
        let _ = self.send(item).await;
    }
}

#[async_trait]
impl Forward for mpsc::UnboundedSender<WorkItem> {
    fn name(&self) -> &str {
        "mpsc_unbounded"
    }

    async fn forward(&self, item: WorkItem) {
        let _ = self.send(item);
    }
}

/// Function-backed target.
///
/// ## Example
/// ```rust
/// use queuedrain::{Forward, ForwardFn, ForwardRef, WorkItem};
///
/// let target: ForwardRef = ForwardFn::arc("print", |item: WorkItem| async move {
///     println!("reindex {item}");
/// });
/// assert_eq!(target.name(), "print");
/// ```
#[derive(Debug)]
pub struct ForwardFn<F> {
    name: Cow<'static, str>,
    f: F,
}

impl<F> ForwardFn<F> {
    /// Creates a new function-backed target.
    pub fn new(name: impl Into<Cow<'static, str>>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }

    /// Creates the target and returns it as a shared handle.
    pub fn arc(name: impl Into<Cow<'static, str>>, f: F) -> Arc<Self> {
        Arc::new(Self::new(name, f))
    }
}

#[async_trait]
impl<F, Fut> Forward for ForwardFn<F>
where
    F: Fn(WorkItem) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn forward(&self, item: WorkItem) {
        (self.f)(item).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_closed_channel_drops_silently() {
        let (tx, rx) = mpsc::channel::<WorkItem>(1);
        drop(rx);
        tx.forward(WorkItem::new("a", 1)).await;
    }

    #[tokio::test]
    async fn test_unbounded_sender_delivers() {
        let (tx, mut rx) = mpsc::unbounded_channel::<WorkItem>();
        tx.forward(WorkItem::new("a", 1)).await;
        assert_eq!(rx.recv().await, Some(WorkItem::new("a", 1)));
    }
}
