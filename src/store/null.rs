//! No-op store for deployments without a cache.

use std::time::Duration;

use async_trait::async_trait;

use super::BucketStore;
use crate::error::Result;

/// Accepts every write and misses every read.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullStore;

#[async_trait]
impl BucketStore for NullStore {
    async fn set_entry(&self, _: &str, _: &str, _: &[u8], _: Option<Duration>) -> Result<()> {
        Ok(())
    }

    async fn get_entry(&self, _: &str, _: &str) -> Result<Option<Vec<u8>>> {
        Ok(None)
    }

    async fn delete_entry(&self, _: &str, _: &str) -> Result<bool> {
        Ok(false)
    }

    async fn delete_bucket(&self, _: &str) -> Result<usize> {
        Ok(0)
    }

    async fn flush_all(&self) -> Result<()> {
        Ok(())
    }

    fn name(&self) -> &'static str {
        "disabled"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_null_store_always_misses() {
        let store = NullStore;
        store.set_entry("b", "k", b"v", None).await.unwrap();
        assert_eq!(store.get_entry("b", "k").await.unwrap(), None);
        assert!(!store.delete_entry("b", "k").await.unwrap());
        assert_eq!(store.delete_bucket("b").await.unwrap(), 0);
        store.flush_all().await.unwrap();
    }
}
