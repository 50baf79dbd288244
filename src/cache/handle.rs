//! Cache Handle Module
//!
//! The public get-or-compute handle. Lookups take the store's shared lock,
//! writes take the exclusive lock, and the producer always runs with no lock
//! held.

use std::fmt;
use std::future::Future;
use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::trace;

use crate::cache::stats::StatsCounters;
use crate::cache::{CacheStats, Entry, Store};
use crate::config::CacheConfig;
use crate::error::{ConfigError, Result};
use crate::tasks::{spawn_sweeper, SweeperGuard};

// == Shared State ==
/// State shared by every clone of a [`Cache`]. The sweeper only ever holds a
/// weak reference to it.
pub(crate) struct Shared<K, V> {
    pub(crate) store: RwLock<Store<K, V>>,
    pub(crate) config: CacheConfig,
    pub(crate) stats: StatsCounters,
}

impl<K, V> Shared<K, V>
where
    K: Eq + Hash,
{
    fn new(config: CacheConfig) -> Self {
        Self {
            store: RwLock::new(Store::new(config.capacity())),
            config,
            stats: StatsCounters::default(),
        }
    }

    /// Deletes every entry older than the configured TTL in one critical
    /// section. Per-call overrides are not known here.
    pub(crate) async fn sweep(&self) -> usize {
        let removed = {
            let mut store = self.store.write().await;
            store.purge_outlived(self.config.ttl(), Instant::now())
        };
        self.stats.record_swept(removed);
        removed
    }
}

// == Get Options ==
/// Per-call options for [`Cache::get_with`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GetOptions {
    ttl: Option<Duration>,
}

impl GetOptions {
    /// Creates options that keep the configured TTL.
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides the configured TTL for this call only. Zero means the stored
    /// value is returned regardless of its age.
    pub fn ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }
}

enum Lookup<V> {
    Fresh(V),
    Stale,
    Missing,
}

// == Cache ==
/// A concurrent get-or-compute cache with optional TTL expiry.
///
/// Cloning is cheap and every clone shares the same store. When the last
/// clone is dropped the background sweeper, if any, is stopped.
///
/// Concurrent calls for the same missing or stale key may each run their
/// producer; the last write wins. Callers that need single-flight semantics
/// have to add it on top.
pub struct Cache<K, V> {
    pub(crate) shared: Arc<Shared<K, V>>,
    sweeper: Option<Arc<SweeperGuard>>,
}

impl<K, V> Clone for Cache<K, V> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
            sweeper: self.sweeper.clone(),
        }
    }
}

impl<K, V> fmt::Debug for Cache<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cache")
            .field("config", &self.shared.config)
            .field("sweeper_running", &self.sweeper_running())
            .finish_non_exhaustive()
    }
}

impl<K, V> Default for Cache<K, V>
where
    K: Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> Cache<K, V> {
    /// The validated configuration this cache was built with.
    pub fn config(&self) -> &CacheConfig {
        &self.shared.config
    }

    /// Whether a background sweeper was started and is still running.
    pub fn sweeper_running(&self) -> bool {
        self.sweeper
            .as_ref()
            .is_some_and(|sweeper| !sweeper.is_finished())
    }
}

impl<K, V> Cache<K, V>
where
    K: Eq + Hash,
{
    // == Constructor ==
    /// Creates a cache whose entries never expire and that has no sweeper.
    ///
    /// Use [`CacheBuilder`](crate::CacheBuilder) for anything else.
    pub fn new() -> Self {
        Self {
            shared: Arc::new(Shared::new(CacheConfig::default())),
            sweeper: None,
        }
    }

    /// Returns the number of stored entries, stale ones included.
    pub async fn len(&self) -> usize {
        self.shared.store.read().await.len()
    }

    /// Returns true if nothing is stored.
    pub async fn is_empty(&self) -> bool {
        self.shared.store.read().await.is_empty()
    }

    // == Purge ==
    /// Runs one sweep now, using the configured TTL.
    ///
    /// Returns the number of entries removed. Does nothing when entries never
    /// expire.
    pub async fn purge_expired(&self) -> usize {
        self.shared.sweep().await
    }

    // == Stats ==
    /// Returns a snapshot of the cache counters.
    pub async fn stats(&self) -> CacheStats {
        let total_entries = self.len().await;
        self.shared.stats.snapshot(total_entries)
    }
}

impl<K, V> Cache<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    // == Get ==
    /// Returns the value stored for `key`, computing it with `producer` when
    /// it is missing or older than the configured TTL.
    ///
    /// A producer error is returned as-is and leaves the store untouched; a
    /// stale entry stays in place.
    pub async fn get<F, Fut, E>(&self, key: K, producer: F) -> std::result::Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = std::result::Result<V, E>>,
    {
        self.get_with(key, GetOptions::default(), producer).await
    }

    /// Like [`Cache::get`], with per-call options.
    pub async fn get_with<F, Fut, E>(
        &self,
        key: K,
        options: GetOptions,
        producer: F,
    ) -> std::result::Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = std::result::Result<V, E>>,
    {
        let ttl = options.ttl.unwrap_or(self.shared.config.ttl());

        let lookup = {
            let store = self.shared.store.read().await;
            match store.get(&key) {
                Some(entry) if entry.is_fresh(ttl, Instant::now()) => {
                    Lookup::Fresh(entry.value.clone())
                }
                Some(_) => Lookup::Stale,
                None => Lookup::Missing,
            }
        };

        match lookup {
            Lookup::Fresh(value) => {
                trace!("cache hit");
                self.shared.stats.record_hit();
                return Ok(value);
            }
            Lookup::Stale => {
                trace!("stale entry, recomputing");
                self.shared.stats.record_refresh();
            }
            Lookup::Missing => {
                trace!("cache miss");
                self.shared.stats.record_miss();
            }
        }

        let value = producer()
            .await
            .inspect_err(|_| self.shared.stats.record_producer_failure())?;

        self.shared
            .store
            .write()
            .await
            .insert(key, Entry::new(value.clone()));

        Ok(value)
    }
}

impl<K, V> Cache<K, V>
where
    K: Eq + Hash + Send + Sync + 'static,
    V: Send + Sync + 'static,
{
    /// Builds the cache from a validated configuration and starts the
    /// sweeper when the schedule asks for one.
    pub(crate) fn from_config(config: CacheConfig) -> Result<Self> {
        let shared = Arc::new(Shared::new(config));

        let sweeper = match shared.config.cleanup() {
            Some(schedule) if !schedule.interval.is_zero() => {
                let runtime = Handle::try_current().map_err(|_| ConfigError::NoRuntime)?;
                let guard = spawn_sweeper(&runtime, Arc::downgrade(&shared), schedule.clone());
                Some(Arc::new(guard))
            }
            _ => None,
        };

        Ok(Self { shared, sweeper })
    }
}
