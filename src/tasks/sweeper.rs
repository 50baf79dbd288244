//! TTL Sweeper Task
//!
//! Background task that periodically deletes entries older than the cache's
//! configured TTL, until its cancellation token fires or the cache is gone.

use std::hash::Hash;
use std::sync::Weak;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, info};

use crate::cache::Shared;
use crate::config::CleanupSchedule;

// == Sweeper Guard ==
/// Owns the sweeper task and aborts it when dropped.
#[derive(Debug)]
pub(crate) struct SweeperGuard {
    handle: JoinHandle<()>,
}

impl SweeperGuard {
    pub(crate) fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for SweeperGuard {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Spawns the sweeper on `runtime`.
///
/// The first sweep happens one interval after start. Cancellation is checked
/// before every tick and wins over a tick that is due at the same time; a
/// sweep that has started always runs to completion. The task only holds a
/// weak reference to the cache and exits once the cache has been dropped.
///
/// There is no restart: once the token fires, a new cache has to be built to
/// get cleanup back.
pub(crate) fn spawn_sweeper<K, V>(
    runtime: &Handle,
    cache: Weak<Shared<K, V>>,
    schedule: CleanupSchedule,
) -> SweeperGuard
where
    K: Eq + Hash + Send + Sync + 'static,
    V: Send + Sync + 'static,
{
    let CleanupSchedule { interval, cancel } = schedule;

    let handle = runtime.spawn(async move {
        info!("Starting TTL sweeper with interval of {:?}", interval);

        let mut ticker = time::interval_at(Instant::now() + interval, interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    debug!("TTL sweeper cancelled");
                    break;
                }
                _ = ticker.tick() => {}
            }

            let Some(shared) = cache.upgrade() else {
                debug!("Cache dropped, stopping TTL sweeper");
                break;
            };

            let removed = shared.sweep().await;

            if removed > 0 {
                info!("TTL sweep: removed {} expired entries", removed);
            } else {
                debug!("TTL sweep: no expired entries found");
            }
        }
    });

    SweeperGuard { handle }
}
