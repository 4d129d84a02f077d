//! In-process store backed by the bucket table.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{debug, error};

use super::BucketStore;
use crate::cache::{BucketTable, CacheStats};
use crate::error::Result;

/// Bucket table shared behind an async lock.
///
/// Lookups take the write lock because they update LRU order and statistics.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    table: Arc<RwLock<BucketTable>>,
}

impl MemoryStore {
    /// Creates an empty store with the given per-bucket entry ceiling.
    pub fn new(max_entries_per_bucket: usize) -> Self {
        Self {
            table: Arc::new(RwLock::new(BucketTable::new(max_entries_per_bucket))),
        }
    }

    /// Shared handle on the table, for the expired bucket sweeper.
    pub fn table(&self) -> Arc<RwLock<BucketTable>> {
        self.table.clone()
    }

    pub async fn stats(&self) -> CacheStats {
        self.table.read().await.stats()
    }
}

#[async_trait]
impl BucketStore for MemoryStore {
    async fn set_entry(
        &self,
        bucket: &str,
        key: &str,
        value: &[u8],
        timeout: Option<Duration>,
    ) -> Result<()> {
        self.table
            .write()
            .await
            .set(bucket, key, value.to_vec(), timeout);
        Ok(())
    }

    async fn get_entry(&self, bucket: &str, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.table.write().await.get(bucket, key))
    }

    async fn delete_entry(&self, bucket: &str, key: &str) -> Result<bool> {
        let removed = self.table.write().await.delete(bucket, key);
        if !removed {
            error!("failed to delete cached key {}:{}", bucket, key);
        }
        Ok(removed)
    }

    async fn delete_bucket(&self, bucket: &str) -> Result<usize> {
        let removed = self.table.write().await.delete_bucket(bucket);
        debug!("deleted {} entries from {}", removed, bucket);
        Ok(removed)
    }

    async fn flush_all(&self) -> Result<()> {
        self.table.write().await.flush();
        Ok(())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_store_round_trip() {
        let store = MemoryStore::new(100);
        assert_eq!(store.get_entry("img_t", "0/1").await.unwrap(), None);

        store.set_entry("img_t", "0/1", b"png", None).await.unwrap();
        assert_eq!(
            store.get_entry("img_t", "0/1").await.unwrap(),
            Some(b"png".to_vec())
        );
    }

    #[tokio::test]
    async fn test_memory_store_deletes() {
        let store = MemoryStore::new(100);
        store.set_entry("b", "1", b"a", None).await.unwrap();
        store.set_entry("b", "2", b"b", None).await.unwrap();

        assert!(store.delete_entry("b", "1").await.unwrap());
        assert!(!store.delete_entry("b", "1").await.unwrap());
        assert_eq!(store.delete_bucket("b").await.unwrap(), 1);
        assert_eq!(store.get_entry("b", "2").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_delete_absent_entry_reports_false() {
        let store = MemoryStore::new(100);
        store.set_entry("b", "kept", b"v", None).await.unwrap();

        assert!(!store.delete_entry("b", "missing").await.unwrap());
        assert!(!store.delete_entry("nobucket", "k").await.unwrap());
        assert_eq!(
            store.get_entry("b", "kept").await.unwrap(),
            Some(b"v".to_vec())
        );
    }

    #[tokio::test]
    async fn test_memory_store_flush_and_stats() {
        let store = MemoryStore::new(100);
        store.set_entry("a", "1", b"a", None).await.unwrap();
        store.set_entry("b", "1", b"b", None).await.unwrap();
        store.get_entry("a", "1").await.unwrap();

        store.flush_all().await.unwrap();

        let stats = store.stats().await;
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.total_entries, 0);
        assert_eq!(stats.total_buckets, 0);
    }

    #[tokio::test]
    async fn test_clones_share_table() {
        let store = MemoryStore::new(100);
        let other = store.clone();
        store.set_entry("b", "k", b"v", None).await.unwrap();
        assert_eq!(other.get_entry("b", "k").await.unwrap(), Some(b"v".to_vec()));
    }
}
