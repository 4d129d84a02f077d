//! Bucket Table Module
//!
//! In-memory bucket storage: a map of buckets, each with its own deadline and
//! entry ceiling.

use std::collections::HashMap;
use std::time::Duration;

use tracing::{debug, error};

use crate::cache::{Bucket, CacheStats};

// == Bucket Table ==
#[derive(Debug)]
pub struct BucketTable {
    buckets: HashMap<String, Bucket>,
    stats: CacheStats,
    /// Entry ceiling applied to every bucket
    max_entries_per_bucket: usize,
}

impl BucketTable {
    /// Creates an empty table. A ceiling of zero is raised to one.
    pub fn new(max_entries_per_bucket: usize) -> Self {
        Self {
            buckets: HashMap::new(),
            stats: CacheStats::new(),
            max_entries_per_bucket: max_entries_per_bucket.max(1),
        }
    }

    /// Live bucket by name; an expired bucket is dropped on sight.
    fn live_bucket(&mut self, bucket: &str) -> Option<&mut Bucket> {
        if self.buckets.get(bucket).is_some_and(Bucket::is_expired) {
            self.buckets.remove(bucket);
            self.stats.record_expired_buckets(1);
            debug!("bucket {} expired", bucket);
        }
        self.buckets.get_mut(bucket)
    }

    // == Set ==
    /// Stores an entry.
    ///
    /// A missing or expired bucket is created with `timeout` as its lifetime.
    /// A live bucket keeps its current deadline.
    pub fn set(&mut self, bucket: &str, key: &str, value: Vec<u8>, timeout: Option<Duration>) {
        let max_entries = self.max_entries_per_bucket;
        if self.live_bucket(bucket).is_none() {
            self.buckets.insert(bucket.to_string(), Bucket::new(timeout));
        }

        let evicted = self
            .buckets
            .get_mut(bucket)
            .and_then(|b| b.insert(key.to_string(), value, max_entries));
        if let Some(evicted) = evicted {
            debug!("evicted {}:{}", bucket, evicted);
            self.stats.record_eviction();
        }
    }

    // == Get ==
    pub fn get(&mut self, bucket: &str, key: &str) -> Option<Vec<u8>> {
        let value = self.live_bucket(bucket).and_then(|b| b.get(key));
        match value {
            Some(_) => self.stats.record_hit(),
            None => self.stats.record_miss(),
        }
        value
    }

    // == Delete ==
    /// Removes one entry. Returns false if it was not present.
    pub fn delete(&mut self, bucket: &str, key: &str) -> bool {
        let removed = self.live_bucket(bucket).is_some_and(|b| b.remove(key));
        self.drop_if_empty(bucket);
        removed
    }

    // == Delete Bucket ==
    /// Deletes every entry of `bucket` one by one. Returns how many were removed.
    pub fn delete_bucket(&mut self, bucket: &str) -> usize {
        let keys = match self.live_bucket(bucket) {
            Some(b) => b.keys(),
            None => return 0,
        };

        let mut removed = 0;
        for key in keys {
            if self.buckets.get_mut(bucket).is_some_and(|b| b.remove(&key)) {
                removed += 1;
            } else {
                error!("failed to delete cached key {}:{}", bucket, key);
            }
        }
        self.drop_if_empty(bucket);
        removed
    }

    /// Empties the whole table. Statistics counters are kept.
    pub fn flush(&mut self) {
        self.buckets.clear();
    }

    // == Cleanup Expired ==
    /// Drops every expired bucket. Returns the number of buckets removed.
    pub fn cleanup_expired(&mut self) -> usize {
        let before = self.buckets.len();
        self.buckets.retain(|_, b| !b.is_expired());
        let removed = before - self.buckets.len();
        self.stats.record_expired_buckets(removed);
        removed
    }

    /// Remaining lifetime of a bucket in milliseconds.
    pub fn bucket_ttl_ms(&self, bucket: &str) -> Option<u64> {
        self.buckets.get(bucket).and_then(Bucket::ttl_remaining_ms)
    }

    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_sizes(self.len(), self.bucket_count());
        stats
    }

    /// Number of entries across all buckets.
    pub fn len(&self) -> usize {
        self.buckets.values().map(Bucket::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.values().all(Bucket::is_empty)
    }

    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    pub fn bucket_len(&self, bucket: &str) -> usize {
        self.buckets.get(bucket).map_or(0, Bucket::len)
    }

    fn drop_if_empty(&mut self, bucket: &str) {
        if self.buckets.get(bucket).is_some_and(Bucket::is_empty) {
            self.buckets.remove(bucket);
        }
    }
}
