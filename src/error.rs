//! Error types for cache construction
//!
//! Provides configuration errors using thiserror. Producer errors are never
//! wrapped: `Cache::get` hands them back to the caller unchanged.

use chrono::TimeDelta;
use thiserror::Error;

// == Config Error Enum ==
/// Reasons a cache could not be built.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Capacity hint below zero
    #[error("capacity must be non-negative, got {0}")]
    NegativeCapacity(i64),

    /// Default TTL below zero
    #[error("ttl must be non-negative, got {0}")]
    NegativeTtl(TimeDelta),

    /// Cleanup interval below zero
    #[error("cleanup interval must be non-negative, got {0}")]
    NegativeCleanupInterval(TimeDelta),

    /// Cleanup requested while entries never expire
    #[error("cleanup requires a positive ttl, but ttl is zero")]
    CleanupWithZeroTtl,

    /// Cleanup requested with a negative TTL
    #[error("cleanup requires a positive ttl, but ttl is negative ({0})")]
    CleanupWithNegativeTtl(TimeDelta),

    /// Cleanup requested outside of a tokio runtime
    #[error("cleanup requires a running tokio runtime")]
    NoRuntime,
}

// == Result Type Alias ==
/// Convenience Result type for cache construction.
pub type Result<T> = std::result::Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_offending_value() {
        let err = ConfigError::NegativeCapacity(-3);
        assert_eq!(err.to_string(), "capacity must be non-negative, got -3");

        let err = ConfigError::NegativeTtl(TimeDelta::seconds(-1));
        assert!(err.to_string().starts_with("ttl must be non-negative"));
    }

    #[test]
    fn test_cleanup_ttl_errors_are_distinct() {
        let zero = ConfigError::CleanupWithZeroTtl;
        let negative = ConfigError::CleanupWithNegativeTtl(TimeDelta::milliseconds(-5));

        assert_ne!(zero, negative);
        assert!(zero.to_string().contains("ttl is zero"));
        assert!(negative.to_string().contains("ttl is negative"));
    }
}
