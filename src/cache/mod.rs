//! Cache Module
//!
//! In-memory bucket table with per-bucket expiration and LRU eviction.

mod bucket;
mod lru;
mod stats;
mod table;

#[cfg(test)]
mod property_tests;

pub use bucket::Bucket;
pub use lru::LruTracker;
pub use stats::CacheStats;
pub use table::BucketTable;

// == Public Constants ==
/// Default entry ceiling of a single in-memory bucket
pub const DEFAULT_MAX_ENTRIES_PER_BUCKET: usize = 10_000;
