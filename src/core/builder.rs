use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::{
    config::Config,
    events::Bus,
    forward::ForwardRef,
    store::StoreRef,
    subscribers::{Subscribe, SubscriberSet},
};

use super::lifecycle::{PipelineLifecycle, spawn_listener};

/// Builder for a [`PipelineLifecycle`] with optional subscribers.
pub struct PipelineBuilder {
    cfg: Config,
    store: StoreRef,
    target: ForwardRef,
    subscribers: Vec<Arc<dyn Subscribe>>,
}

impl PipelineBuilder {
    /// Creates a builder for the pipeline draining `store` into `target`.
    pub fn new(cfg: Config, store: StoreRef, target: ForwardRef) -> Self {
        Self {
            cfg,
            store,
            target,
            subscribers: Vec::new(),
        }
    }

    /// Sets event subscribers for observability.
    ///
    /// Subscribers receive pipeline events (activation, cursor failures,
    /// forwarded items, etc.) through dedicated workers with bounded queues.
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    /// Adds one subscriber.
    pub fn with_subscriber(mut self, subscriber: Arc<dyn Subscribe>) -> Self {
        self.subscribers.push(subscriber);
        self
    }

    /// Builds the lifecycle. The pipeline starts inactive.
    ///
    /// Must be called inside a tokio runtime when subscribers are set.
    pub fn build(self) -> PipelineLifecycle {
        let bus = Bus::new(self.cfg.bus_capacity_clamped());
        let listener = CancellationToken::new();

        if !self.subscribers.is_empty() {
            let subs = SubscriberSet::new(self.subscribers, bus.clone());
            spawn_listener(&bus, subs, listener.clone());
        }

        PipelineLifecycle::new_internal(self.cfg, self.store, self.target, bus, listener)
    }
}

impl PipelineLifecycle {
    /// Shorthand for [`PipelineBuilder::new`].
    pub fn builder(cfg: Config, store: StoreRef, target: ForwardRef) -> PipelineBuilder {
        PipelineBuilder::new(cfg, store, target)
    }
}
