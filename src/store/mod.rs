//! Store backends
//!
//! [`BucketStore`] is the storage seam under the cache facade. Entries are
//! addressed by `(bucket, key)`; each bucket carries one expiration deadline.
//! Backends report failures as [`CacheError`](crate::error::CacheError) and
//! leave the fail-open policy to the caller.

mod memory;
mod null;
mod redis_store;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::info;

use crate::config::{Backend, Config};
use crate::error::Result;

pub use memory::MemoryStore;
pub use null::NullStore;
pub use redis_store::RedisStore;

/// Storage seam shared by every backend.
#[async_trait]
pub trait BucketStore: Send + Sync {
    /// Inserts or overwrites an entry.
    ///
    /// When the bucket has no deadline yet it gets `timeout`; `None` means it
    /// never expires. A running deadline is never reset.
    async fn set_entry(
        &self,
        bucket: &str,
        key: &str,
        value: &[u8],
        timeout: Option<Duration>,
    ) -> Result<()>;

    /// Returns the stored value, `None` on a miss.
    async fn get_entry(&self, bucket: &str, key: &str) -> Result<Option<Vec<u8>>>;

    /// Removes one entry. `Ok(false)` when it was already absent.
    async fn delete_entry(&self, bucket: &str, key: &str) -> Result<bool>;

    /// Enumerates the bucket and deletes its entries one by one.
    ///
    /// Not atomic: an entry inserted while the loop runs may survive.
    async fn delete_bucket(&self, bucket: &str) -> Result<usize>;

    /// Empties the whole store, across all partitions.
    async fn flush_all(&self) -> Result<()>;

    /// Short backend name for logs.
    fn name(&self) -> &'static str;
}

/// Builds the store selected by `config`.
///
/// The Redis backend makes its single connection attempt here; when it fails
/// the returned store stays disconnected and every call reports
/// [`CacheError::Unavailable`](crate::error::CacheError::Unavailable).
pub async fn build_store(config: &Config) -> Arc<dyn BucketStore> {
    let store: Arc<dyn BucketStore> = match config.backend {
        Backend::Redis => Arc::new(RedisStore::connect(config).await),
        Backend::Memory => Arc::new(MemoryStore::new(config.max_entries_per_bucket)),
        Backend::Disabled => Arc::new(NullStore),
    };
    info!("Cache store initialized: {}", store.name());
    store
}
