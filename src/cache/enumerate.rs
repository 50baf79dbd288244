//! Enumeration Module
//!
//! Two ways to walk the cache contents: a sequential view that holds the
//! shared lock for as long as it lives, and a fan-out that visits every entry
//! in its own task.

use std::collections::hash_map;
use std::future::Future;
use std::hash::Hash;
use std::ops::ControlFlow;
use std::sync::Arc;

use tokio::sync::RwLockReadGuard;
use tokio::task::JoinHandle;
use tracing::warn;

use crate::cache::{Cache, Entry, Store};

// == Entries ==
/// Read-locked view of the cache contents.
///
/// The store's shared lock is held until this value is dropped, on every exit
/// path. Writers wait in the meantime, so do not call [`Cache::get`] on the
/// same cache while holding it: a miss would need the write lock and never
/// get it.
pub struct Entries<'a, K, V> {
    guard: RwLockReadGuard<'a, Store<K, V>>,
}

impl<K, V> Entries<'_, K, V>
where
    K: Eq + Hash,
{
    /// Iterates over the entries in the map's own order.
    pub fn iter(&self) -> hash_map::Iter<'_, K, Entry<V>> {
        self.guard.iter()
    }

    pub fn len(&self) -> usize {
        self.guard.len()
    }

    pub fn is_empty(&self) -> bool {
        self.guard.is_empty()
    }
}

impl<'b, K, V> IntoIterator for &'b Entries<'_, K, V>
where
    K: Eq + Hash,
{
    type Item = (&'b K, &'b Entry<V>);
    type IntoIter = hash_map::Iter<'b, K, Entry<V>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

// == Fan Out ==
/// Handles to the tasks started by [`Cache::for_each_concurrent`].
///
/// Dropping it (or calling [`FanOut::detach`]) leaves the visits running
/// unsupervised. [`FanOut::join`] waits for all of them.
#[must_use = "dropping a FanOut detaches its visits; call join() to wait for them"]
#[derive(Debug)]
pub struct FanOut {
    handles: Vec<JoinHandle<()>>,
}

/// Outcome of [`FanOut::join`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FanOutReport {
    /// Visits that ran to completion
    pub visited: usize,
    /// Visits that panicked
    pub panicked: usize,
    /// Visits cancelled before finishing, e.g. by runtime shutdown
    pub cancelled: usize,
}

impl FanOut {
    /// Number of visits that were started.
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Waits for every visit to finish.
    pub async fn join(self) -> FanOutReport {
        let mut report = FanOutReport::default();
        for handle in self.handles {
            match handle.await {
                Ok(()) => report.visited += 1,
                Err(err) if err.is_panic() => {
                    warn!("Fan-out visit panicked: {}", err);
                    report.panicked += 1;
                }
                Err(_) => report.cancelled += 1,
            }
        }
        report
    }

    /// Lets the visits run on without anyone waiting for them.
    pub fn detach(self) {}
}

impl<K, V> Cache<K, V>
where
    K: Eq + Hash,
{
    // == Sequential ==
    /// Takes the shared lock and returns a view over the current contents.
    pub async fn entries(&self) -> Entries<'_, K, V> {
        Entries {
            guard: self.shared.store.read().await,
        }
    }

    /// Visits entries one at a time until `visit` breaks.
    ///
    /// Returns `Some` with the break value if the walk stopped early, `None`
    /// if every entry was visited. The shared lock is released either way.
    pub async fn try_for_each<B, F>(&self, mut visit: F) -> Option<B>
    where
        F: FnMut(&K, &Entry<V>) -> ControlFlow<B>,
    {
        let entries = self.entries().await;
        match entries.iter().try_for_each(|(key, entry)| visit(key, entry)) {
            ControlFlow::Break(stopped) => Some(stopped),
            ControlFlow::Continue(()) => None,
        }
    }
}

impl<K, V> Cache<K, V>
where
    K: Eq + Hash + Clone + Send + 'static,
    V: Clone + Send + 'static,
{
    // == Fan Out ==
    /// Spawns one task per stored entry, each calling `visit` with a copy of
    /// that entry, and returns without waiting for any of them.
    ///
    /// The shared lock is held only while the snapshot is copied. There is no
    /// ordering between visits and no limit on how many run at once.
    pub async fn for_each_concurrent<F, Fut>(&self, visit: F) -> FanOut
    where
        F: Fn(K, Entry<V>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let snapshot: Vec<(K, Entry<V>)> = {
            let store = self.shared.store.read().await;
            store
                .iter()
                .map(|(key, entry)| (key.clone(), entry.clone()))
                .collect()
        };

        let visit = Arc::new(visit);
        let handles = snapshot
            .into_iter()
            .map(|(key, entry)| {
                let visit = Arc::clone(&visit);
                tokio::spawn(async move { visit(key, entry).await })
            })
            .collect();

        FanOut { handles }
    }
}
