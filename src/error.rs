//! Error types used by the drain pipeline.
//!
//! This module defines three error enums:
//!
//! - [`StoreError`]: failures of the shared queue's take-operation.
//! - [`PipelineError`]: lifecycle misuse and shutdown problems.
//! - [`ConfigError`]: configuration that cannot be read or is inconsistent.
//!
//! Each type provides `as_label` (a stable snake_case label for logs/metrics).
//! Malformed records are not errors: they are a regular
//! [`DecodeResult`](crate::DecodeResult) outcome.

use std::any::Any;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// # Errors produced by a [`WorkQueueStore`](crate::WorkQueueStore).
///
/// Every variant is fatal to the current cursor instance and recovered by the
/// restart supervisor. None of them is ever converted into an empty take.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The store could not be reached (connection refused, reset, closed).
    #[error("store unavailable: {error}")]
    Unavailable {
        /// The underlying error message.
        error: String,
    },

    /// The take-operation did not complete in time.
    #[error("take timed out after {timeout:?}")]
    Timeout {
        /// The timeout that was exceeded.
        timeout: Duration,
    },

    /// The store answered with something the client could not understand.
    #[error("protocol error: {error}")]
    Protocol {
        /// The underlying error message.
        error: String,
    },
}

impl StoreError {
    /// Shorthand for [`StoreError::Unavailable`].
    pub fn unavailable(error: impl Into<String>) -> Self {
        StoreError::Unavailable {
            error: error.into(),
        }
    }

    /// Shorthand for [`StoreError::Protocol`].
    pub fn protocol(error: impl Into<String>) -> Self {
        StoreError::Protocol {
            error: error.into(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use queuedrain::StoreError;
    ///
    /// assert_eq!(StoreError::unavailable("refused").as_label(), "store_unavailable");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            StoreError::Unavailable { .. } => "store_unavailable",
            StoreError::Timeout { .. } => "store_timeout",
            StoreError::Protocol { .. } => "store_protocol",
        }
    }
}

/// # Errors produced by [`PipelineLifecycle`](crate::PipelineLifecycle).
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum PipelineError {
    /// An activation arrived while a drain chain is still running.
    #[error("pipeline '{name}' is already active")]
    AlreadyActive {
        /// Pipeline identity.
        name: String,
    },

    /// The in-flight delivery did not finish within the grace period; the
    /// drain task was aborted.
    #[error("pipeline '{name}' did not stop within {grace:?}; aborted")]
    GraceExceeded {
        /// Pipeline identity.
        name: String,
        /// The configured grace duration.
        grace: Duration,
    },

    /// Listening for process termination signals failed.
    #[error("shutdown signal listener failed: {0}")]
    Signal(#[from] std::io::Error),
}

impl PipelineError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            PipelineError::AlreadyActive { .. } => "pipeline_already_active",
            PipelineError::GraceExceeded { .. } => "pipeline_grace_exceeded",
            PipelineError::Signal(_) => "pipeline_signal",
        }
    }
}

/// # Errors produced while loading or validating a [`Config`](crate::Config).
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("cannot read config {path:?}: {source}")]
    Io {
        /// Path that was read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The configuration is not valid TOML or has unknown/mistyped keys.
    #[error("cannot parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// The values parsed but are inconsistent.
    #[error("invalid config: {reason}")]
    Invalid {
        /// What is wrong.
        reason: String,
    },
}

impl ConfigError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            ConfigError::Io { .. } => "config_io",
            ConfigError::Parse(_) => "config_parse",
            ConfigError::Invalid { .. } => "config_invalid",
        }
    }
}

/// Text of a caught panic payload.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&'static str>()
        .map(|s| (*s).to_owned())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_owned())
}
