//! Cache Entry Module
//!
//! Defines the stored unit: a value and the instant it was last written.

use std::time::Duration;

use tokio::time::Instant;

// == Entry ==
/// A cached value with the time of its last write.
///
/// Entries are replaced wholesale on every write, never mutated in place.
#[derive(Debug, Clone, PartialEq)]
pub struct Entry<V> {
    /// The stored value
    pub value: V,
    /// When the value was written
    pub updated_at: Instant,
}

impl<V> Entry<V> {
    // == Constructor ==
    /// Creates an entry stamped with the current time.
    pub fn new(value: V) -> Self {
        Self::written_at(value, Instant::now())
    }

    /// Creates an entry stamped with `updated_at`.
    pub fn written_at(value: V, updated_at: Instant) -> Self {
        Self { value, updated_at }
    }

    // == Age ==
    /// Time elapsed since the last write, as seen at `now`.
    pub fn age(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.updated_at)
    }

    // == Freshness ==
    /// Whether a read at `now` may return this entry without recomputing.
    ///
    /// A zero `ttl` never expires. Otherwise the entry is stale once its age
    /// reaches `ttl`.
    pub fn is_fresh(&self, ttl: Duration, now: Instant) -> bool {
        ttl.is_zero() || self.age(now) < ttl
    }

    /// Whether the sweeper should delete this entry: its age exceeds `ttl`.
    pub fn has_outlived(&self, ttl: Duration, now: Instant) -> bool {
        !ttl.is_zero() && self.age(now) > ttl
    }
}
