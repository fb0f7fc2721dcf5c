//! TTL Cleanup Task
//!
//! Background sweep of expired keys in the in-memory store. Expired keys
//! are also dropped lazily on access; the sweep bounds how long untouched
//! ones keep occupying capacity.

use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::store::MemoryStore;

/// Spawns a task that removes expired keys from `store` every
/// `cleanup_interval_secs` seconds (at least one).
///
/// The returned handle is aborted during graceful shutdown.
pub fn spawn_cleanup_task(store: MemoryStore, cleanup_interval_secs: u64) -> JoinHandle<()> {
    let interval = Duration::from_secs(cleanup_interval_secs.max(1));

    tokio::spawn(async move {
        info!(
            "Starting TTL cleanup task with interval of {} seconds",
            interval.as_secs()
        );

        loop {
            tokio::time::sleep(interval).await;

            let removed = store.cleanup_expired().await;
            if removed > 0 {
                info!("TTL cleanup: removed {} expired keys", removed);
            } else {
                debug!("TTL cleanup: no expired keys found");
            }
        }
    })
}
