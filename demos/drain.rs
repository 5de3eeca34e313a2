//! # Example: drain
//!
//! Drains an in-memory queue into an mpsc channel while following an
//! ownership channel.
//!
//! Shows how to:
//! - Fill a [`MemoryQueue`] with well-formed and malformed records.
//! - Build a [`PipelineLifecycle`] with [`LogWriter`] and [`Stats`] attached.
//! - Drive it with [`PipelineLifecycle::follow`] and [`OwnershipSignal`]s.
//!
//! ## Flow
//! ```text
//! signals ──► follow()
//!               ├─ Activated   ─► PacedCursor ─► mpsc target ─► printer task
//!               └─ Deactivated ─► stop, no further takes
//! (channel closed) ─► follow() returns
//! ```
//!
//! ## Run
//! ```bash
//! RUST_LOG=debug cargo run --example drain
//! ```

use std::sync::Arc;
use std::time::Duration;

use queuedrain::{
    Config, LogWriter, MemoryQueue, OwnershipSignal, PacingPolicy, PipelineLifecycle, RawRecord,
    Stats, WorkItem,
};
use serde_json::json;
use tokio::sync::mpsc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let queue = Arc::new(MemoryQueue::new("things-to-reindex"));
    for n in 1..=5 {
        queue.push_item(&WorkItem::new(format!("org.example:thing-{n}"), n)).await;
    }
    if let Some(record) = RawRecord::from_value(json!({ "id": "org.example:broken" })) {
        queue.push(record).await;
    }

    let cfg = Config {
        pacing: PacingPolicy {
            per_item: Duration::from_millis(200),
            per_empty_poll: Duration::from_secs(2),
        },
        ..Config::default()
    };

    let (tx, mut rx) = mpsc::channel::<WorkItem>(8);
    let printer = tokio::spawn(async move {
        while let Some(item) = rx.recv().await {
            println!("reindex {item}");
        }
    });

    let stats = Arc::new(Stats::new());
    let pipeline = PipelineLifecycle::builder(cfg, queue.clone(), Arc::new(tx))
        .with_subscriber(Arc::new(LogWriter::new()))
        .with_subscriber(stats.clone())
        .build();

    let (signals, signals_rx) = mpsc::channel(4);
    signals.send(OwnershipSignal::Activated).await?;
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(3)).await;
        let _ = signals.send(OwnershipSignal::Deactivated).await;
    });

    pipeline.follow(signals_rx).await?;
    drop(pipeline);
    printer.await?;

    println!("left in queue: {}", queue.len().await);
    println!("{:?}", stats.snapshot());
    Ok(())
}
