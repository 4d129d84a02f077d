//! Bucket Module
//!
//! A named group of entries sharing one expiration deadline.

use std::collections::HashMap;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::cache::LruTracker;

// == Bucket ==
/// Entries of one bucket plus its expiration deadline.
#[derive(Debug)]
pub struct Bucket {
    entries: HashMap<String, Vec<u8>>,
    lru: LruTracker,
    /// Expiration timestamp (Unix milliseconds), None = no expiration
    pub expires_at: Option<u64>,
}

impl Bucket {
    /// Creates an empty bucket whose timer starts now.
    ///
    /// A deadline beyond the millisecond clock's range means no expiration.
    pub fn new(timeout: Option<Duration>) -> Self {
        let now = current_timestamp_ms();
        Self {
            entries: HashMap::new(),
            lru: LruTracker::new(),
            expires_at: timeout.and_then(|t| {
                u64::try_from(t.as_millis())
                    .ok()
                    .and_then(|ms| now.checked_add(ms))
            }),
        }
    }

    /// Expired once the current time reaches the deadline.
    pub fn is_expired(&self) -> bool {
        match self.expires_at {
            Some(expires) => current_timestamp_ms() >= expires,
            None => false,
        }
    }

    /// Remaining lifetime in milliseconds, `None` when the bucket never expires.
    pub fn ttl_remaining_ms(&self) -> Option<u64> {
        self.expires_at
            .map(|expires| expires.saturating_sub(current_timestamp_ms()))
    }

    // == Insert ==
    /// Stores `value` under `key`, evicting the least recently used entry
    /// when a new key would exceed `max_entries`.
    ///
    /// Returns the evicted key, if any. The deadline is left untouched.
    pub fn insert(&mut self, key: String, value: Vec<u8>, max_entries: usize) -> Option<String> {
        let mut evicted = None;
        if !self.entries.contains_key(&key) && self.entries.len() >= max_entries {
            if let Some(oldest) = self.lru.evict_oldest() {
                self.entries.remove(&oldest);
                evicted = Some(oldest);
            }
        }
        self.lru.touch(&key);
        self.entries.insert(key, value);
        evicted
    }

    /// Returns a copy of the value and marks the key as recently used.
    pub fn get(&mut self, key: &str) -> Option<Vec<u8>> {
        let value = self.entries.get(key)?.clone();
        self.lru.touch(key);
        Some(value)
    }

    /// Removes one entry. Returns false if it was not present.
    pub fn remove(&mut self, key: &str) -> bool {
        self.lru.remove(key);
        self.entries.remove(key).is_some()
    }

    /// Snapshot of the entry keys.
    pub fn keys(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Returns current Unix timestamp in milliseconds.
pub fn current_timestamp_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
