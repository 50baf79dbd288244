//! Cache Store Module
//!
//! The key/entry map behind the cache. It carries no lock of its own; the
//! handle keeps it behind a reader/writer lock and every access goes through
//! that guard.

use std::collections::hash_map::{self, HashMap};
use std::hash::Hash;
use std::time::Duration;

use tokio::time::Instant;

use crate::cache::Entry;

// == Store ==
/// Mapping from key to its most recent entry.
#[derive(Debug)]
pub struct Store<K, V> {
    entries: HashMap<K, Entry<V>>,
}

impl<K, V> Store<K, V>
where
    K: Eq + Hash,
{
    // == Constructor ==
    /// Creates a store, pre-sized when a capacity hint is given.
    ///
    /// A hint the allocator cannot honour is ignored.
    pub fn new(capacity: Option<usize>) -> Self {
        let mut entries = HashMap::new();
        if let Some(capacity) = capacity {
            let _ = entries.try_reserve(capacity);
        }
        Self { entries }
    }

    // == Lookup ==
    /// Returns the entry for `key`, fresh or not.
    pub fn get(&self, key: &K) -> Option<&Entry<V>> {
        self.entries.get(key)
    }

    // == Write ==
    /// Replaces whatever is stored under `key`.
    pub fn insert(&mut self, key: K, entry: Entry<V>) {
        self.entries.insert(key, entry);
    }

    // == Purge ==
    /// Removes every entry whose age exceeds `ttl` at `now`.
    ///
    /// Returns the number of entries removed. A zero `ttl` removes nothing.
    pub fn purge_outlived(&mut self, ttl: Duration, now: Instant) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.has_outlived(ttl, now));
        before - self.entries.len()
    }

    // == Iteration ==
    /// Iterates over the current contents in map order.
    pub fn iter(&self) -> hash_map::Iter<'_, K, Entry<V>> {
        self.entries.iter()
    }

    /// Returns the number of stored entries, stale ones included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
