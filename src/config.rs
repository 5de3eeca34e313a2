//! # Pipeline configuration.
//!
//! Provides [`Config`], the centralized settings for one drain pipeline.
//!
//! Config can be built in code (`Config::default()` and field updates) or read
//! from TOML with [`Config::from_toml_str`] / [`Config::load`]. In TOML all
//! durations are integer milliseconds and every key is optional:
//!
//! ```toml
//! name = "manual-updater"
//! per_item_delay_ms = 1000
//! per_empty_poll_delay_ms = 60000
//! min_backoff_ms = 1000
//! max_backoff_ms = 1000
//! backoff_factor = 2.0
//! jitter_factor = 1.0
//! take_timeout_ms = 0
//! grace_ms = 60000
//! bus_capacity = 1024
//! ```
//!
//! ## Sentinel values
//! - `take_timeout = 0s` → no timeout on the store take-operation
//! - `bus_capacity = 0` → clamped to 1

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::error::ConfigError;
use crate::policies::{BackoffPolicy, PacingPolicy};

/// Default pipeline identity.
pub const DEFAULT_NAME: &str = "manual-updater";

/// Configuration for one drain pipeline.
///
/// ## Field semantics
/// - `name`: pipeline identity used in events and logs
/// - `pacing`: per-item and per-empty-poll delays of the cursor
/// - `backoff`: restart delays after store failures
/// - `take_timeout`: upper bound for a single take-operation (`0s` = none)
/// - `grace`: how long deactivation waits for an in-flight delivery
/// - `bus_capacity`: event bus ring buffer size (min 1)
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    /// Pipeline identity.
    pub name: String,

    /// Cursor pacing.
    pub pacing: PacingPolicy,

    /// Restart backoff.
    pub backoff: BackoffPolicy,

    /// Upper bound for one take-operation.
    ///
    /// - `Duration::ZERO` = no timeout
    /// - `> 0` = an elapsed take fails the cursor with `StoreError::Timeout`
    pub take_timeout: Duration,

    /// Maximum time deactivation waits for the chain to stop before aborting it.
    pub grace: Duration,

    /// Capacity of the event bus broadcast channel ring buffer.
    pub bus_capacity: usize,
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - `name = "manual-updater"`
    /// - `pacing = 1s per item, 60s per empty poll`
    /// - `backoff = 1s min, 1s max, factor 2.0, jitter 1.0`
    /// - `take_timeout = 0s` (none)
    /// - `grace = 60s`
    /// - `bus_capacity = 1024`
    fn default() -> Self {
        Self {
            name: DEFAULT_NAME.to_owned(),
            pacing: PacingPolicy::default(),
            backoff: BackoffPolicy::default(),
            take_timeout: Duration::ZERO,
            grace: Duration::from_secs(60),
            bus_capacity: 1024,
        }
    }
}

/// On-disk shape; every key optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ConfigFile {
    name: Option<String>,
    per_item_delay_ms: Option<u64>,
    per_empty_poll_delay_ms: Option<u64>,
    min_backoff_ms: Option<u64>,
    max_backoff_ms: Option<u64>,
    backoff_factor: Option<f64>,
    jitter_factor: Option<f64>,
    take_timeout_ms: Option<u64>,
    grace_ms: Option<u64>,
    bus_capacity: Option<usize>,
}

impl Config {
    /// Parses TOML on top of [`Config::default`] and validates the result.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let file: ConfigFile = toml::from_str(s)?;
        let mut cfg = Config::default();

        if let Some(name) = file.name {
            cfg.name = name;
        }
        if let Some(ms) = file.per_item_delay_ms {
            cfg.pacing.per_item = Duration::from_millis(ms);
        }
        if let Some(ms) = file.per_empty_poll_delay_ms {
            cfg.pacing.per_empty_poll = Duration::from_millis(ms);
        }
        if let Some(ms) = file.min_backoff_ms {
            cfg.backoff.min = Duration::from_millis(ms);
        }
        if let Some(ms) = file.max_backoff_ms {
            cfg.backoff.max = Duration::from_millis(ms);
        }
        if let Some(factor) = file.backoff_factor {
            cfg.backoff.factor = factor;
        }
        if let Some(jitter) = file.jitter_factor {
            cfg.backoff.jitter = jitter;
        }
        if let Some(ms) = file.take_timeout_ms {
            cfg.take_timeout = Duration::from_millis(ms);
        }
        if let Some(ms) = file.grace_ms {
            cfg.grace = Duration::from_millis(ms);
        }
        if let Some(cap) = file.bus_capacity {
            cfg.bus_capacity = cap;
        }

        cfg.validate()?;
        Ok(cfg)
    }

    /// Reads and parses a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Checks cross-field consistency.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.name.trim().is_empty() {
            return Err(invalid("name must not be empty"));
        }
        if self.backoff.min > self.backoff.max {
            return Err(invalid(format!(
                "min backoff {:?} exceeds max backoff {:?}",
                self.backoff.min, self.backoff.max
            )));
        }
        if !self.backoff.factor.is_finite() || self.backoff.factor < 1.0 {
            return Err(invalid(format!(
                "backoff factor {} must be a finite number >= 1.0",
                self.backoff.factor
            )));
        }
        if !self.backoff.jitter.is_finite() || self.backoff.jitter < 0.0 {
            return Err(invalid(format!(
                "jitter factor {} must be a finite number >= 0.0",
                self.backoff.jitter
            )));
        }
        Ok(())
    }

    /// Returns the take timeout as an `Option` (`None` when zero).
    #[inline]
    pub fn take_timeout(&self) -> Option<Duration> {
        if self.take_timeout == Duration::ZERO {
            None
        } else {
            Some(self.take_timeout)
        }
    }

    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }
}

fn invalid(reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        reason: reason.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_match_reference_deployment() {
        let cfg = Config::default();
        assert_eq!(cfg.pacing.per_item, Duration::from_secs(1));
        assert_eq!(cfg.pacing.per_empty_poll, Duration::from_secs(60));
        assert_eq!(cfg.backoff.min, Duration::from_secs(1));
        assert_eq!(cfg.backoff.max, Duration::from_secs(1));
        assert_eq!(cfg.take_timeout(), None);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_empty_toml_is_default() {
        assert_eq!(Config::from_toml_str("").unwrap(), Config::default());
    }

    #[test]
    fn test_partial_toml_overrides() {
        let cfg = Config::from_toml_str(
            r#"
            name = "things-reindex"
            per_item_delay_ms = 250
            per_empty_poll_delay_ms = 5000
            max_backoff_ms = 30000
            take_timeout_ms = 2000
            "#,
        )
        .unwrap();
        assert_eq!(cfg.name, "things-reindex");
        assert_eq!(cfg.pacing.per_item, Duration::from_millis(250));
        assert_eq!(cfg.pacing.per_empty_poll, Duration::from_secs(5));
        assert_eq!(cfg.backoff.min, Duration::from_secs(1));
        assert_eq!(cfg.backoff.max, Duration::from_secs(30));
        assert_eq!(cfg.take_timeout(), Some(Duration::from_secs(2)));
    }

    #[test]
    fn test_unknown_key_rejected() {
        let err = Config::from_toml_str("per_item_delay = 1").unwrap_err();
        assert_eq!(err.as_label(), "config_parse");
    }

    #[test]
    fn test_min_above_max_rejected() {
        let err =
            Config::from_toml_str("min_backoff_ms = 5000\nmax_backoff_ms = 1000").unwrap_err();
        assert_eq!(err.as_label(), "config_invalid");
    }

    #[test]
    fn test_negative_jitter_rejected() {
        let err = Config::from_toml_str("jitter_factor = -0.5").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));
    }

    #[test]
    fn test_bus_capacity_clamped() {
        let cfg = Config {
            bus_capacity: 0,
            ..Config::default()
        };
        assert_eq!(cfg.bus_capacity_clamped(), 1);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "per_item_delay_ms = 10").unwrap();
        let cfg = Config::load(file.path()).unwrap();
        assert_eq!(cfg.pacing.per_item, Duration::from_millis(10));
    }

    #[test]
    fn test_load_missing_file() {
        let err = Config::load("/definitely/not/here.toml").unwrap_err();
        assert_eq!(err.as_label(), "config_io");
    }
}
