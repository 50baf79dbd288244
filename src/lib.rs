//! Lazycache - a concurrent get-or-compute cache
//!
//! Memoizes expensive computations per key, with optional time-to-live
//! expiry and an optional background sweeper that reclaims stale entries.
//!
//! ```ignore
//! let cache: Cache<String, Profile> = CacheBuilder::new()
//!     .ttl(TimeDelta::minutes(5))
//!     .build()?;
//!
//! let profile = cache
//!     .get(user_id.clone(), || async { fetch_profile(&user_id).await })
//!     .await?;
//! ```

pub mod cache;
pub mod config;
pub mod error;
mod tasks;

pub use cache::{Cache, CacheStats, Entry, Entries, FanOut, FanOutReport, GetOptions};
pub use config::{CacheBuilder, CacheConfig, CacheSettings, CleanupSchedule};
pub use error::ConfigError;
