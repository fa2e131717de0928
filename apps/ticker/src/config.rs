//! Session configuration.
//!
//! Loads configuration from environment variables with sensible defaults.

use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

/// Default storage key of the tracked value
pub const DEFAULT_STORAGE_KEY: &str = "counter";

/// Default number of ticks per session
pub const DEFAULT_TICK_COUNT: u64 = 3;

/// Session configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Storage key of the tracked value
    pub storage_key: String,
    /// Number of ticks before the tick source completes
    pub tick_count: u64,
    /// Time between ticks
    pub tick_interval: Duration,
    /// Snapshots buffered per subscriber before it starts lagging
    pub snapshot_capacity: usize,
    /// How long to wait for in-flight writes when the session ends
    pub shutdown_timeout: Duration,
}

impl SessionConfig {
    /// Load configuration from environment variables.
    ///
    /// | Variable                     | Default   |
    /// |------------------------------|-----------|
    /// | `TICKER_STORAGE_KEY`         | `counter` |
    /// | `TICKER_TICK_COUNT`          | `3`       |
    /// | `TICKER_TICK_INTERVAL_MS`    | `1000`    |
    /// | `TICKER_SNAPSHOT_CAPACITY`   | `64`      |
    /// | `TICKER_SHUTDOWN_TIMEOUT_MS` | `5000`    |
    ///
    /// Unparseable values fall back to the default.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    #[must_use]
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let parsed = |name: &str| lookup(name).and_then(|s| s.trim().parse::<u64>().ok());

        Self {
            storage_key: lookup("TICKER_STORAGE_KEY")
                .filter(|key| !key.is_empty())
                .unwrap_or(defaults.storage_key),
            tick_count: parsed("TICKER_TICK_COUNT").unwrap_or(defaults.tick_count),
            tick_interval: parsed("TICKER_TICK_INTERVAL_MS")
                .filter(|ms| *ms > 0)
                .map_or(defaults.tick_interval, Duration::from_millis),
            snapshot_capacity: parsed("TICKER_SNAPSHOT_CAPACITY")
                .and_then(|n| usize::try_from(n).ok())
                .filter(|n| *n > 0)
                .unwrap_or(defaults.snapshot_capacity),
            shutdown_timeout: parsed("TICKER_SHUTDOWN_TIMEOUT_MS")
                .map_or(defaults.shutdown_timeout, Duration::from_millis),
        }
    }

    /// Set the storage key
    #[must_use]
    pub fn with_storage_key(mut self, key: impl Into<String>) -> Self {
        self.storage_key = key.into();
        self
    }

    /// Set the number of ticks
    #[must_use]
    pub const fn with_tick_count(mut self, count: u64) -> Self {
        self.tick_count = count;
        self
    }

    /// Set the tick interval
    #[must_use]
    pub const fn with_tick_interval(mut self, interval: Duration) -> Self {
        self.tick_interval = interval;
        self
    }

    /// Set the per-subscriber snapshot buffer
    #[must_use]
    pub const fn with_snapshot_capacity(mut self, capacity: usize) -> Self {
        self.snapshot_capacity = capacity;
        self
    }

    /// Set the shutdown timeout
    #[must_use]
    pub const fn with_shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.shutdown_timeout = timeout;
        self
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            tick_count: DEFAULT_TICK_COUNT,
            tick_interval: Duration::from_secs(1),
            snapshot_capacity: 64,
            shutdown_timeout: Duration::from_secs(5),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = SessionConfig::from_lookup(lookup(&[]));
        assert_eq!(config, SessionConfig::default());
        assert_eq!(config.storage_key, "counter");
        assert_eq!(config.tick_count, 3);
        assert_eq!(config.tick_interval, Duration::from_secs(1));
    }

    #[test]
    fn test_overrides() {
        let config = SessionConfig::from_lookup(lookup(&[
            ("TICKER_STORAGE_KEY", "ticks"),
            ("TICKER_TICK_COUNT", "10"),
            ("TICKER_TICK_INTERVAL_MS", "250"),
            ("TICKER_SNAPSHOT_CAPACITY", "8"),
            ("TICKER_SHUTDOWN_TIMEOUT_MS", "100"),
        ]));

        assert_eq!(config.storage_key, "ticks");
        assert_eq!(config.tick_count, 10);
        assert_eq!(config.tick_interval, Duration::from_millis(250));
        assert_eq!(config.snapshot_capacity, 8);
        assert_eq!(config.shutdown_timeout, Duration::from_millis(100));
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let config = SessionConfig::from_lookup(lookup(&[
            ("TICKER_STORAGE_KEY", ""),
            ("TICKER_TICK_COUNT", "three"),
            ("TICKER_TICK_INTERVAL_MS", "0"),
            ("TICKER_SNAPSHOT_CAPACITY", "0"),
        ]));

        assert_eq!(config, SessionConfig::default());
    }

    #[test]
    fn test_builder() {
        let config = SessionConfig::default()
            .with_storage_key("k")
            .with_tick_count(1)
            .with_tick_interval(Duration::from_millis(5))
            .with_snapshot_capacity(2)
            .with_shutdown_timeout(Duration::from_millis(7));

        assert_eq!(config.storage_key, "k");
        assert_eq!(config.tick_count, 1);
        assert_eq!(config.tick_interval, Duration::from_millis(5));
        assert_eq!(config.snapshot_capacity, 2);
        assert_eq!(config.shutdown_timeout, Duration::from_millis(7));
    }
}
