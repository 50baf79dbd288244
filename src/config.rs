//! Configuration Module
//!
//! Validates cache options and freezes them into a [`CacheConfig`] before the
//! cache exists. Durations are taken as [`chrono::TimeDelta`] so that negative
//! values can be reported instead of silently clamped.

use std::hash::Hash;
use std::time::Duration;

use chrono::TimeDelta;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::cache::Cache;
use crate::error::{ConfigError, Result};

// == Cleanup Schedule ==
/// When and until when the background sweeper runs.
#[derive(Debug, Clone)]
pub struct CleanupSchedule {
    /// Time between two sweeps
    pub interval: Duration,
    /// Stops the sweeper for good once cancelled
    pub cancel: CancellationToken,
}

// == Cache Config ==
/// Validated, immutable cache parameters.
#[derive(Debug, Clone, Default)]
pub struct CacheConfig {
    ttl: Duration,
    capacity: Option<usize>,
    cleanup: Option<CleanupSchedule>,
}

impl CacheConfig {
    /// Default time-to-live. Zero means entries never expire.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Number of entries the store was pre-sized for, if any.
    pub fn capacity(&self) -> Option<usize> {
        self.capacity
    }

    /// Background cleanup schedule, if any.
    pub fn cleanup(&self) -> Option<&CleanupSchedule> {
        self.cleanup.as_ref()
    }

    /// True when entries never go stale.
    pub fn never_expires(&self) -> bool {
        self.ttl.is_zero()
    }
}

// == Cache Builder ==
/// Collects cache options; nothing is checked until [`CacheBuilder::validate`]
/// or [`CacheBuilder::build`].
///
/// # Example
/// ```ignore
/// let cancel = CancellationToken::new();
/// let cache: Cache<String, u64> = CacheBuilder::new()
///     .capacity(128)
///     .ttl(TimeDelta::seconds(30))
///     .cleanup(cancel.clone(), TimeDelta::seconds(10))
///     .build()?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct CacheBuilder {
    capacity: Option<i64>,
    ttl: Option<TimeDelta>,
    cleanup: Option<(CancellationToken, TimeDelta)>,
}

impl CacheBuilder {
    /// Creates a builder with no options set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-sizes the store for `capacity` entries. This is a hint, not a bound.
    pub fn capacity(mut self, capacity: i64) -> Self {
        self.capacity = Some(capacity);
        self
    }

    /// Sets the default time-to-live. Zero means entries never expire.
    pub fn ttl(mut self, ttl: TimeDelta) -> Self {
        self.ttl = Some(ttl);
        self
    }

    /// Sweeps stale entries every `interval` until `cancel` fires.
    ///
    /// Only valid together with a positive TTL.
    pub fn cleanup(mut self, cancel: CancellationToken, interval: TimeDelta) -> Self {
        self.cleanup = Some((cancel, interval));
        self
    }

    // == Validate ==
    /// Checks every option and freezes the result.
    ///
    /// Options are checked in a fixed order (capacity, cleanup interval,
    /// cleanup against TTL, TTL) and the first failure is returned.
    pub fn validate(&self) -> Result<CacheConfig> {
        let capacity = match self.capacity {
            Some(capacity) if capacity < 0 => return Err(ConfigError::NegativeCapacity(capacity)),
            Some(capacity) => Some(usize::try_from(capacity).unwrap_or(usize::MAX)),
            None => None,
        };

        let ttl = self.ttl.unwrap_or_else(TimeDelta::zero);

        let cleanup = match &self.cleanup {
            Some((cancel, interval)) => {
                let interval = interval
                    .to_std()
                    .map_err(|_| ConfigError::NegativeCleanupInterval(*interval))?;
                if ttl.is_zero() {
                    return Err(ConfigError::CleanupWithZeroTtl);
                }
                if ttl < TimeDelta::zero() {
                    return Err(ConfigError::CleanupWithNegativeTtl(ttl));
                }
                Some(CleanupSchedule {
                    interval,
                    cancel: cancel.clone(),
                })
            }
            None => None,
        };

        let ttl = ttl.to_std().map_err(|_| ConfigError::NegativeTtl(ttl))?;

        Ok(CacheConfig {
            ttl,
            capacity,
            cleanup,
        })
    }

    // == Build ==
    /// Validates the options and constructs the cache.
    ///
    /// A cleanup schedule with a non-zero interval spawns the sweeper, which
    /// requires a running tokio runtime.
    pub fn build<K, V>(self) -> Result<Cache<K, V>>
    where
        K: Eq + Hash + Send + Sync + 'static,
        V: Send + Sync + 'static,
    {
        let config = self.validate()?;
        Cache::from_config(config)
    }
}

// == Cache Settings ==
/// Plain-data form of the cache options, for loading from a host
/// application's configuration file.
///
/// Durations are in milliseconds. Missing fields are left unset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    pub capacity: Option<i64>,
    pub ttl_ms: Option<i64>,
    pub cleanup_interval_ms: Option<i64>,
}

impl CacheSettings {
    /// Turns the settings into a builder.
    ///
    /// When a cleanup interval is set but no token is given, the sweeper gets
    /// a private token and only stops once the cache is dropped.
    pub fn into_builder(self, cancel: Option<CancellationToken>) -> CacheBuilder {
        let mut builder = CacheBuilder::new();
        if let Some(capacity) = self.capacity {
            builder = builder.capacity(capacity);
        }
        if let Some(ms) = self.ttl_ms {
            builder = builder.ttl(millis(ms));
        }
        if let Some(ms) = self.cleanup_interval_ms {
            builder = builder.cleanup(cancel.unwrap_or_else(CancellationToken::new), millis(ms));
        }
        builder
    }
}

fn millis(ms: i64) -> TimeDelta {
    TimeDelta::try_milliseconds(ms).unwrap_or(TimeDelta::MIN)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_never_expire() {
        let config = CacheBuilder::new().validate().unwrap();
        assert!(config.never_expires());
        assert_eq!(config.capacity(), None);
        assert!(config.cleanup().is_none());
    }

    #[test]
    fn test_valid_options_are_frozen() {
        let config = CacheBuilder::new()
            .capacity(10)
            .ttl(TimeDelta::seconds(2))
            .cleanup(CancellationToken::new(), TimeDelta::milliseconds(500))
            .validate()
            .unwrap();

        assert_eq!(config.capacity(), Some(10));
        assert_eq!(config.ttl(), Duration::from_secs(2));
        assert_eq!(
            config.cleanup().map(|c| c.interval),
            Some(Duration::from_millis(500))
        );
    }

    #[test]
    fn test_negative_capacity_rejected() {
        let err = CacheBuilder::new().capacity(-1).validate().unwrap_err();
        assert_eq!(err, ConfigError::NegativeCapacity(-1));
    }

    #[test]
    fn test_zero_capacity_accepted() {
        let config = CacheBuilder::new().capacity(0).validate().unwrap();
        assert_eq!(config.capacity(), Some(0));
    }

    #[test]
    fn test_negative_ttl_rejected() {
        let ttl = TimeDelta::milliseconds(-1);
        let err = CacheBuilder::new().ttl(ttl).validate().unwrap_err();
        assert_eq!(err, ConfigError::NegativeTtl(ttl));
    }

    #[test]
    fn test_negative_cleanup_interval_rejected() {
        let interval = TimeDelta::seconds(-1);
        let err = CacheBuilder::new()
            .ttl(TimeDelta::seconds(1))
            .cleanup(CancellationToken::new(), interval)
            .validate()
            .unwrap_err();
        assert_eq!(err, ConfigError::NegativeCleanupInterval(interval));
    }

    #[test]
    fn test_cleanup_without_ttl_rejected() {
        let err = CacheBuilder::new()
            .cleanup(CancellationToken::new(), TimeDelta::seconds(1))
            .validate()
            .unwrap_err();
        assert_eq!(err, ConfigError::CleanupWithZeroTtl);
    }

    #[test]
    fn test_cleanup_with_negative_ttl_rejected() {
        let ttl = TimeDelta::seconds(-5);
        let err = CacheBuilder::new()
            .ttl(ttl)
            .cleanup(CancellationToken::new(), TimeDelta::seconds(1))
            .validate()
            .unwrap_err();
        assert_eq!(err, ConfigError::CleanupWithNegativeTtl(ttl));
    }

    #[test]
    fn test_first_failure_wins() {
        let err = CacheBuilder::new()
            .capacity(-7)
            .ttl(TimeDelta::seconds(-1))
            .validate()
            .unwrap_err();
        assert_eq!(err, ConfigError::NegativeCapacity(-7));
    }

    #[test]
    fn test_zero_cleanup_interval_accepted() {
        let config = CacheBuilder::new()
            .ttl(TimeDelta::seconds(1))
            .cleanup(CancellationToken::new(), TimeDelta::zero())
            .validate()
            .unwrap();
        assert_eq!(config.cleanup().map(|c| c.interval), Some(Duration::ZERO));
    }

    #[test]
    fn test_settings_into_builder() {
        let settings = CacheSettings {
            capacity: Some(4),
            ttl_ms: Some(250),
            cleanup_interval_ms: Some(100),
        };
        let config = settings.into_builder(None).validate().unwrap();

        assert_eq!(config.capacity(), Some(4));
        assert_eq!(config.ttl(), Duration::from_millis(250));
        assert_eq!(
            config.cleanup().map(|c| c.interval),
            Some(Duration::from_millis(100))
        );
    }

    #[test]
    fn test_settings_share_validation() {
        let settings = CacheSettings {
            ttl_ms: Some(0),
            cleanup_interval_ms: Some(100),
            ..Default::default()
        };
        let err = settings.into_builder(None).validate().unwrap_err();
        assert_eq!(err, ConfigError::CleanupWithZeroTtl);
    }
}
