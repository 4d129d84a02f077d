//! Cache Statistics Module
//!
//! Hit, miss and eviction counters for the in-memory bucket table.

use serde::Serialize;

// == Cache Stats ==
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CacheStats {
    /// Lookups that returned a value
    pub hits: u64,
    /// Lookups on a missing entry or an expired bucket
    pub misses: u64,
    /// Entries dropped to respect the per-bucket ceiling
    pub evictions: u64,
    /// Buckets dropped because their deadline passed
    pub expired_buckets: u64,
    pub total_entries: usize,
    pub total_buckets: usize,
}

impl CacheStats {
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// hits / (hits + misses), or 0.0 before any lookup.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    pub fn record_eviction(&mut self) {
        self.evictions += 1;
    }

    pub fn record_expired_buckets(&mut self, count: usize) {
        self.expired_buckets += count as u64;
    }

    pub fn set_sizes(&mut self, entries: usize, buckets: usize) {
        self.total_entries = entries;
        self.total_buckets = buckets;
    }
}
