//! Drain pipeline core: cursor, restart supervision and lifecycle.
//!
//! Internal modules:
//! - [`cursor`]: paced, cancellable puller over the work queue;
//! - [`runner`]: drives one cursor instance into the forwarding consumer;
//! - [`supervisor`]: restarts a failed cursor with backoff, forever;
//! - [`lifecycle`]: starts and stops the chain on ownership signals;
//! - [`builder`]: wires config, bus and subscribers into a lifecycle;
//! - [`shutdown`]: termination signal handling for standalone hosting.

mod builder;
mod cursor;
mod lifecycle;
mod runner;
mod shutdown;
mod supervisor;

pub use builder::PipelineBuilder;
pub use cursor::PacedCursor;
pub use lifecycle::{OwnershipSignal, PipelineLifecycle};
pub use shutdown::wait_for_shutdown_signal;
pub use supervisor::{RestartSupervisor, SupervisorParams};
