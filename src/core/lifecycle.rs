//! # PipelineLifecycle: binds the drain chain to ownership signals.
//!
//! The lifecycle owns everything needed to start a drain chain (store, target,
//! config, event bus) but no queue state. Each activation starts a cold
//! [`RestartSupervisor`]; each deactivation tears it down.
//!
//! ## High-level architecture
//! ```text
//! OwnershipSignal::Activated
//!   └─► activate()
//!         ├─ already running? → publish ActivationRejected, Err(AlreadyActive)
//!         ├─ publish PipelineActivated
//!         └─ spawn RestartSupervisor::run(token)
//!               └─► drain_once(PacedCursor) ─► ForwardingConsumer ─► target
//!
//! OwnershipSignal::Deactivated
//!   └─► deactivate()
//!         ├─ token.cancel()             → no new takes are issued
//!         ├─ wait up to grace           → in-flight delivery finishes
//!         ├─ Ok   → publish PipelineDeactivated
//!         └─ Err  → abort, publish GraceExceeded, Err(GraceExceeded)
//! ```
//!
//! ## Rules
//! - At most one chain exists per lifecycle; activation and deactivation are
//!   serialized by one mutex, so a new chain never overlaps a stopping one.
//! - Dropping the lifecycle cancels a running chain and stops subscriber delivery.

use std::sync::Arc;

use tokio::sync::{Mutex, broadcast, mpsc};
use tokio::task::JoinHandle;
use tokio::time;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::config::Config;
use crate::core::shutdown;
use crate::core::supervisor::{RestartSupervisor, SupervisorParams};
use crate::error::PipelineError;
use crate::events::{Bus, Event, EventKind};
use crate::forward::{ForwardRef, ForwardingConsumer};
use crate::store::StoreRef;
use crate::subscribers::SubscriberSet;

/// External ownership event delivered by the hosting runtime's singleton or
/// leader-election mechanism.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OwnershipSignal {
    /// This process now owns the pipeline.
    Activated,
    /// This process no longer owns the pipeline.
    Deactivated,
}

/// A running drain chain.
struct Running {
    token: CancellationToken,
    join: JoinHandle<()>,
}

/// Start/stop entry points for one logical pipeline.
pub struct PipelineLifecycle {
    cfg: Config,
    name: Arc<str>,
    store: StoreRef,
    target: ForwardRef,
    bus: Bus,
    running: Mutex<Option<Running>>,
    listener: CancellationToken,
}

impl PipelineLifecycle {
    pub(crate) fn new_internal(
        cfg: Config,
        store: StoreRef,
        target: ForwardRef,
        bus: Bus,
        listener: CancellationToken,
    ) -> Self {
        let name: Arc<str> = Arc::from(cfg.name.as_str());
        Self {
            cfg,
            name,
            store,
            target,
            bus,
            running: Mutex::new(None),
            listener,
        }
    }

    /// Pipeline identity.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Effective configuration.
    pub fn config(&self) -> &Config {
        &self.cfg
    }

    /// Receiver for all events published after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.bus.subscribe()
    }

    /// True while a drain chain is running.
    pub async fn is_active(&self) -> bool {
        self.running
            .lock()
            .await
            .as_ref()
            .is_some_and(|r| !r.join.is_finished())
    }

    /// Starts a fresh drain chain.
    ///
    /// Returns [`PipelineError::AlreadyActive`] if one is still running.
    pub async fn activate(&self) -> Result<(), PipelineError> {
        let mut running = self.running.lock().await;
        if running.as_ref().is_some_and(|r| !r.join.is_finished()) {
            warn!(pipeline = %self.name, "activation rejected: already active");
            self.bus.publish(
                Event::new(EventKind::ActivationRejected)
                    .with_pipeline(Arc::clone(&self.name))
                    .with_reason("already active"),
            );
            return Err(PipelineError::AlreadyActive {
                name: self.name.to_string(),
            });
        }

        let token = CancellationToken::new();
        let consumer = ForwardingConsumer::new(
            Arc::clone(&self.target),
            self.bus.clone(),
            Arc::clone(&self.name),
        );
        let supervisor = RestartSupervisor::new(
            Arc::clone(&self.store),
            consumer,
            SupervisorParams {
                pacing: self.cfg.pacing,
                backoff: self.cfg.backoff,
                take_timeout: self.cfg.take_timeout(),
            },
            self.bus.clone(),
            Arc::clone(&self.name),
        );

        info!(
            pipeline = %self.name,
            store = self.store.name(),
            target = self.target.name(),
            "activating pipeline"
        );
        self.bus.publish(
            Event::new(EventKind::PipelineActivated).with_pipeline(Arc::clone(&self.name)),
        );
        let join = tokio::spawn(supervisor.run(token.clone()));
        *running = Some(Running { token, join });
        Ok(())
    }

    /// Stops the running drain chain, if any.
    ///
    /// No take-operation is issued after this call begins. An item already
    /// taken is delivered before the chain stops, bounded by
    /// [`Config::grace`].
    pub async fn deactivate(&self) -> Result<(), PipelineError> {
        let mut running = self.running.lock().await;
        let Some(Running { token, mut join }) = running.take() else {
            return Ok(());
        };

        token.cancel();
        match time::timeout(self.cfg.grace, &mut join).await {
            Ok(res) => {
                if let Err(e) = res {
                    warn!(pipeline = %self.name, error = %e, "drain task ended abnormally");
                }
                info!(pipeline = %self.name, "pipeline deactivated");
                self.bus.publish(
                    Event::new(EventKind::PipelineDeactivated)
                        .with_pipeline(Arc::clone(&self.name)),
                );
                Ok(())
            }
            Err(_elapsed) => {
                join.abort();
                warn!(
                    pipeline = %self.name,
                    grace = ?self.cfg.grace,
                    "grace exceeded; drain aborted"
                );
                self.bus.publish(
                    Event::new(EventKind::GraceExceeded)
                        .with_pipeline(Arc::clone(&self.name))
                        .with_delay(self.cfg.grace),
                );
                Err(PipelineError::GraceExceeded {
                    name: self.name.to_string(),
                    grace: self.cfg.grace,
                })
            }
        }
    }

    /// Dispatches an ownership signal.
    pub async fn on_signal(&self, signal: OwnershipSignal) -> Result<(), PipelineError> {
        match signal {
            OwnershipSignal::Activated => self.activate().await,
            OwnershipSignal::Deactivated => self.deactivate().await,
        }
    }

    /// Follows an ownership channel until it closes, then deactivates.
    ///
    /// Misuse (a duplicate activation) and grace overruns are logged and do
    /// not stop the loop.
    pub async fn follow(
        &self,
        mut signals: mpsc::Receiver<OwnershipSignal>,
    ) -> Result<(), PipelineError> {
        while let Some(signal) = signals.recv().await {
            if let Err(e) = self.on_signal(signal).await {
                warn!(
                    pipeline = %self.name,
                    ?signal,
                    error = %e,
                    label = e.as_label(),
                    "ownership signal not applied"
                );
            }
        }
        self.deactivate().await
    }

    /// Standalone hosting: activates, waits for a termination signal, deactivates.
    pub async fn run_until_shutdown(&self) -> Result<(), PipelineError> {
        self.activate().await?;
        let signal = shutdown::wait_for_shutdown_signal().await;
        info!(pipeline = %self.name, "shutdown requested");
        let stopped = self.deactivate().await;
        signal?;
        stopped
    }
}

impl Drop for PipelineLifecycle {
    fn drop(&mut self) {
        if let Some(running) = self.running.get_mut().take() {
            running.token.cancel();
        }
        self.listener.cancel();
    }
}

/// Forwards bus events to the subscriber set until `stop` is cancelled.
pub(crate) fn spawn_listener(bus: &Bus, subs: SubscriberSet, stop: CancellationToken) {
    let mut rx = bus.subscribe();
    tokio::spawn(async move {
        loop {
            let received = tokio::select! {
                _ = stop.cancelled() => break,
                received = rx.recv() => received,
            };
            match received {
                Ok(ev) => subs.emit(&ev),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "subscriber listener lagged; events skipped");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
        subs.shutdown().await;
    });
}
