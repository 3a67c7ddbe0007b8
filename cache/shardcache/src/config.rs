//! Cache configuration.

use serde::Deserialize;
use std::time::Duration;

/// Cache tunables, loadable from a TOML fragment.
///
/// Every field has a default, so an empty table deserializes to the stock
/// configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CacheConfig {
    /// Resident-memory ceiling in bytes the reclaimer steers toward.
    #[serde(default = "default_max_memory_size")]
    pub max_memory_size: u64,

    /// Microseconds the reclaimer sleeps between ticks.
    #[serde(default = "default_purge_loop_time_us")]
    pub purge_loop_time_us: u64,

    /// Upper bound in microseconds for one full reclaim cycle.
    /// Reserved; the current sweep does not consult it.
    #[serde(default = "default_purge_total_time_us")]
    pub purge_total_time_us: u64,

    /// Used-memory percentage below which a tick skips sweeping.
    #[serde(default = "default_purge_threshold_pct_min")]
    pub purge_threshold_pct_min: u8,

    /// Used-memory percentage above which an aggressive sweep would engage.
    /// Reserved; the current sweep does not consult it.
    #[serde(default = "default_purge_threshold_pct_max")]
    pub purge_threshold_pct_max: u8,
}

fn default_max_memory_size() -> u64 {
    4 * 1024 * 1024
}

fn default_purge_loop_time_us() -> u64 {
    500_000
}

fn default_purge_total_time_us() -> u64 {
    10_000_000
}

fn default_purge_threshold_pct_min() -> u8 {
    3
}

fn default_purge_threshold_pct_max() -> u8 {
    90
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_memory_size: default_max_memory_size(),
            purge_loop_time_us: default_purge_loop_time_us(),
            purge_total_time_us: default_purge_total_time_us(),
            purge_threshold_pct_min: default_purge_threshold_pct_min(),
            purge_threshold_pct_max: default_purge_threshold_pct_max(),
        }
    }
}

impl CacheConfig {
    /// Reclaimer sleep between ticks.
    pub fn purge_loop_time(&self) -> Duration {
        Duration::from_micros(self.purge_loop_time_us)
    }

    /// Reserved full-cycle bound.
    pub fn purge_total_time(&self) -> Duration {
        Duration::from_micros(self.purge_total_time_us)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CacheConfig::default();
        assert_eq!(config.max_memory_size, 4 * 1024 * 1024);
        assert_eq!(config.purge_loop_time(), Duration::from_millis(500));
        assert_eq!(config.purge_total_time(), Duration::from_secs(10));
        assert_eq!(config.purge_threshold_pct_min, 3);
        assert_eq!(config.purge_threshold_pct_max, 90);
    }

    #[test]
    fn test_empty_table_deserializes_to_defaults() {
        let config: CacheConfig = toml::from_str("").unwrap();
        assert_eq!(config.max_memory_size, 4 * 1024 * 1024);
        assert_eq!(config.purge_threshold_pct_min, 3);
    }

    #[test]
    fn test_partial_override() {
        let config: CacheConfig = toml::from_str(
            r#"
            max_memory_size = 1048576
            purge_loop_time_us = 250000
            "#,
        )
        .unwrap();
        assert_eq!(config.max_memory_size, 1_048_576);
        assert_eq!(config.purge_loop_time(), Duration::from_millis(250));
        assert_eq!(config.purge_threshold_pct_max, 90);
    }

    #[test]
    fn test_unknown_field_rejected() {
        let result: Result<CacheConfig, _> = toml::from_str("purge_threshold = 5");
        assert!(result.is_err());
    }
}
