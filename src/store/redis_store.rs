//! Redis store: one Redis hash per bucket.
//!
//! Bucket expiration maps onto the hash key's TTL, entries onto hash fields.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::{AsyncCommands, RedisResult};
use tracing::{debug, error, info, warn};

use super::BucketStore;
use crate::config::Config;
use crate::error::{CacheError, Result};

/// Upper bound for the initial connection attempt.
pub const CONNECT_TIMEOUT: Duration = Duration::from_millis(500);

/// Upper bound for a single command round trip.
pub const OPERATION_TIMEOUT: Duration = Duration::from_millis(250);

/// Redis-backed bucket store.
///
/// Holds at most one multiplexed connection, opened once in
/// [`RedisStore::connect`]. Without it every call fails with
/// [`CacheError::Unavailable`]; there is no reconnect.
pub struct RedisStore {
    conn: Option<MultiplexedConnection>,
    url: String,
}

impl RedisStore {
    /// Connects using the configured host, port and database.
    pub async fn connect(config: &Config) -> Self {
        Self::connect_url(&config.redis_url()).await
    }

    /// Makes one bounded connection attempt to `url`.
    pub async fn connect_url(url: &str) -> Self {
        match Self::open(url).await {
            Ok(conn) => {
                info!("Connected to Redis at {}", url);
                Self {
                    conn: Some(conn),
                    url: url.to_string(),
                }
            }
            Err(e) => {
                warn!("Redis unavailable at {}, caching disabled: {}", url, e);
                Self::disconnected(url)
            }
        }
    }

    /// A store that never held a connection.
    pub fn disconnected(url: &str) -> Self {
        Self {
            conn: None,
            url: url.to_string(),
        }
    }

    pub fn is_connected(&self) -> bool {
        self.conn.is_some()
    }

    async fn open(url: &str) -> Result<MultiplexedConnection> {
        let client = redis::Client::open(url)?;
        match tokio::time::timeout(CONNECT_TIMEOUT, client.get_multiplexed_async_connection()).await
        {
            Ok(conn) => Ok(conn?),
            Err(_) => Err(CacheError::Timeout("connect")),
        }
    }

    fn conn(&self) -> Result<MultiplexedConnection> {
        self.conn
            .clone()
            .ok_or_else(|| CacheError::Unavailable(format!("no connection to {}", self.url)))
    }
}

/// Runs one command under [`OPERATION_TIMEOUT`].
async fn bounded<T, F>(command: &'static str, fut: F) -> Result<T>
where
    F: Future<Output = RedisResult<T>>,
{
    match tokio::time::timeout(OPERATION_TIMEOUT, fut).await {
        Ok(result) => Ok(result?),
        Err(_) => Err(CacheError::Timeout(command)),
    }
}

/// `EXPIRE` argument for a bucket lifetime: whole seconds, at least 1.
///
/// Clamped to `i64::MAX` since a negative value deletes the key.
fn expire_seconds(timeout: Duration) -> i64 {
    i64::try_from(timeout.as_secs().max(1)).unwrap_or(i64::MAX)
}

#[async_trait]
impl BucketStore for RedisStore {
    async fn set_entry(
        &self,
        bucket: &str,
        key: &str,
        value: &[u8],
        timeout: Option<Duration>,
    ) -> Result<()> {
        let mut conn = self.conn()?;
        let _: () = bounded("HSET", conn.hset(bucket, key, value)).await?;

        if let Some(timeout) = timeout {
            // negative TTL: the hash has no expiration yet
            let ttl: i64 = bounded("TTL", conn.ttl(bucket)).await?;
            if ttl < 0 {
                let secs = expire_seconds(timeout);
                let _: () = bounded("EXPIRE", conn.expire(bucket, secs)).await?;
                debug!("bucket {} expires in {}s", bucket, secs);
            }
        }
        Ok(())
    }

    async fn get_entry(&self, bucket: &str, key: &str) -> Result<Option<Vec<u8>>> {
        let mut conn = self.conn()?;
        let value: Option<Vec<u8>> = bounded("HGET", conn.hget(bucket, key)).await?;
        Ok(value)
    }

    async fn delete_entry(&self, bucket: &str, key: &str) -> Result<bool> {
        let mut conn = self.conn()?;
        let removed: i64 = bounded("HDEL", conn.hdel(bucket, key)).await?;
        if removed < 1 {
            error!("failed to delete cached key {}:{}", bucket, key);
        }
        Ok(removed > 0)
    }

    async fn delete_bucket(&self, bucket: &str) -> Result<usize> {
        let mut conn = self.conn()?;
        let keys: Vec<String> = bounded("HKEYS", conn.hkeys(bucket)).await?;

        let mut removed = 0;
        for key in keys {
            let count: i64 = bounded("HDEL", conn.hdel(bucket, &key)).await?;
            if count < 1 {
                error!("failed to delete cached key {}:{}", bucket, key);
            } else {
                removed += 1;
            }
        }
        debug!("deleted {} entries from {}", removed, bucket);
        Ok(removed)
    }

    async fn flush_all(&self) -> Result<()> {
        let mut conn = self.conn()?;
        let cmd = redis::cmd("FLUSHDB");
        let _: () = bounded("FLUSHDB", cmd.query_async(&mut conn)).await?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "redis"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_disconnected_store_reports_unavailable() {
        let store = RedisStore::disconnected("redis://localhost:6379/0");
        assert!(!store.is_connected());

        let err = store.set_entry("b", "k", b"v", None).await.unwrap_err();
        assert!(matches!(err, CacheError::Unavailable(_)));
        assert!(matches!(
            store.get_entry("b", "k").await,
            Err(CacheError::Unavailable(_))
        ));
        assert!(store.delete_bucket("b").await.is_err());
        assert!(store.flush_all().await.is_err());
    }

    #[test]
    fn test_expire_seconds() {
        assert_eq!(expire_seconds(Duration::from_millis(200)), 1);
        assert_eq!(expire_seconds(Duration::from_secs(3600)), 3600);
        assert_eq!(expire_seconds(Duration::from_secs(u64::MAX)), i64::MAX);
    }

    #[tokio::test]
    async fn test_refused_connection_degrades() {
        // nothing listens on port 1
        let store = RedisStore::connect_url("redis://127.0.0.1:1/0").await;
        assert!(!store.is_connected());
        assert!(store.get_entry("b", "k").await.is_err());
    }

    #[tokio::test]
    async fn test_malformed_url_degrades() {
        let store = RedisStore::connect_url("not a url").await;
        assert!(!store.is_connected());
    }
}
