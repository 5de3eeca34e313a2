//! # LogWriter: tracing-backed event renderer
//!
//! A subscriber that renders incoming [`Event`]s through `tracing`:
//! - `info` for lifecycle transitions,
//! - `warn` for failures, restarts and dropped events,
//! - `debug` for per-item traffic (forwarded, malformed, empty polls).
//!
//! ## Example output
//! ```text
//! INFO  pipeline activated pipeline="manual-updater"
//! DEBUG item forwarded pipeline="manual-updater" item=a@1
//! WARN  cursor failed pipeline="manual-updater" attempt=1 error="store unavailable: refused"
//! WARN  restart scheduled pipeline="manual-updater" attempt=1 delay_ms=1000
//! INFO  pipeline deactivated pipeline="manual-updater"
//! ```

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Subscriber that logs every event through `tracing`.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    /// Creates the writer.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        let pipeline = e.pipeline.as_deref().unwrap_or("unknown");
        let reason = e.reason.as_deref().unwrap_or("");
        match e.kind {
            EventKind::PipelineActivated => info!(pipeline, "pipeline activated"),
            EventKind::PipelineDeactivated => info!(pipeline, "pipeline deactivated"),
            EventKind::ActivationRejected => {
                warn!(pipeline, reason, "activation rejected")
            }
            EventKind::GraceExceeded => {
                warn!(pipeline, grace_ms = e.delay_ms, "grace exceeded; drain aborted")
            }
            EventKind::CursorStarting => {
                info!(pipeline, attempt = e.attempt, "cursor starting")
            }
            EventKind::CursorFailed => {
                warn!(pipeline, attempt = e.attempt, error = reason, "cursor failed")
            }
            EventKind::BackoffScheduled => {
                warn!(
                    pipeline,
                    attempt = e.attempt,
                    delay_ms = e.delay_ms,
                    "restart scheduled"
                )
            }
            EventKind::ItemForwarded => match &e.item {
                Some(item) => debug!(pipeline, %item, "item forwarded"),
                None => debug!(pipeline, "item forwarded"),
            },
            EventKind::DeliveryPanicked => {
                warn!(pipeline, item = ?e.item, panic = reason, "target panicked; item lost")
            }
            EventKind::RecordMalformed => debug!(pipeline, "malformed record dropped"),
            EventKind::QueueEmpty => {
                debug!(pipeline, idle_ms = e.delay_ms, "queue empty")
            }
            EventKind::SubscriberOverflow => {
                warn!(subscriber = e.subscriber, reason, "subscriber overflow")
            }
            EventKind::SubscriberPanicked => {
                warn!(subscriber = e.subscriber, reason, "subscriber panicked")
            }
        }
    }

    fn name(&self) -> &'static str {
        "log_writer"
    }
}
