//! TTL Reaper Task
//!
//! Background task that periodically removes expired cache entries.

use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::SharedCache;

// == Reaper Handle ==
/// Owner side of a running reaper task.
///
/// Calling [`ReaperHandle::stop`] or dropping the handle signals the task to
/// exit at its next wake-up, so a dropped client never leaks its sweep loop.
#[derive(Debug)]
pub struct ReaperHandle {
    stop_tx: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl ReaperHandle {
    /// Signals the task to exit. Idempotent.
    pub fn stop(&self) {
        // Receiver is gone only if the task already exited
        let _ = self.stop_tx.send(true);
    }

    /// Signals the task to exit and waits for it to finish.
    pub async fn shutdown(self) {
        self.stop();
        let _ = self.task.await;
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

/// Spawns a background task that periodically reaps expired cache entries.
///
/// The task sleeps for `interval` between sweeps and takes the write lock
/// only for the duration of [`CacheStore::reap_expired`].
///
/// Must be called from within a tokio runtime.
///
/// [`CacheStore::reap_expired`]: crate::cache::CacheStore::reap_expired
///
/// # Example
/// ```ignore
/// let cache = CacheStore::new(Duration::from_secs(300))?.into_shared();
/// let reaper = spawn_reaper_task(cache.clone(), Duration::from_secs(300));
/// // Later, during shutdown:
/// reaper.shutdown().await;
/// ```
pub fn spawn_reaper_task<V>(cache: SharedCache<V>, interval: Duration) -> ReaperHandle
where
    V: Clone + Send + Sync + 'static,
{
    let (stop_tx, mut stop_rx) = watch::channel(false);

    let task = tokio::spawn(async move {
        info!("Starting TTL reaper with interval of {:?}", interval);

        loop {
            tokio::select! {
                // Err means the handle was dropped
                changed = stop_rx.changed() => {
                    if changed.is_err() || *stop_rx.borrow() {
                        break;
                    }
                }
                _ = tokio::time::sleep(interval) => {
                    let removed = {
                        let mut cache_guard = cache.write().await;
                        cache_guard.reap_expired()
                    };

                    if removed > 0 {
                        info!("TTL reaper: removed {} expired entries", removed);
                    } else {
                        debug!("TTL reaper: no expired entries found");
                    }
                }
            }
        }

        debug!("TTL reaper stopped");
    });

    ReaperHandle { stop_tx, task }
}
