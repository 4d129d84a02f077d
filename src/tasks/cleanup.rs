//! Expired Bucket Sweeper
//!
//! Background task that drops expired buckets from the in-memory table.
//! Lookups already ignore expired buckets; the sweep reclaims their memory.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::BucketTable;

/// Spawns a task that sweeps `table` every `cleanup_interval_secs` seconds.
///
/// The returned handle is aborted on shutdown.
///
/// # Example
/// ```ignore
/// let store = MemoryStore::new(10_000);
/// let cleanup_handle = spawn_cleanup_task(store.table(), 60);
/// // Later, during shutdown:
/// cleanup_handle.abort();
/// ```
pub fn spawn_cleanup_task(
    table: Arc<RwLock<BucketTable>>,
    cleanup_interval_secs: u64,
) -> JoinHandle<()> {
    let interval = Duration::from_secs(cleanup_interval_secs.max(1));

    tokio::spawn(async move {
        info!(
            "Starting expired bucket sweep every {} seconds",
            interval.as_secs()
        );

        loop {
            tokio::time::sleep(interval).await;

            let removed = table.write().await.cleanup_expired();

            if removed > 0 {
                info!("Bucket sweep: removed {} expired buckets", removed);
            } else {
                debug!("Bucket sweep: no expired buckets");
            }
        }
    })
}
