//! Web Gateway Cache - partitioned cache for an image web gateway
//!
//! Caches thumbnails, rendered image planes and JSON metadata in Redis or in
//! memory. Keys are derived from object identities and rendering parameters;
//! invalidation works per bucket; every operation fails open.

pub mod cache;
pub mod config;
pub mod error;
pub mod keys;
pub mod models;
pub mod partitioned;
pub mod store;
pub mod tasks;

pub use config::Config;
pub use error::{CacheError, Result};
pub use models::{ObjectIdentity, ObjectKind, RenderParams, ServerEvent};
pub use partitioned::PartitionedCache;
pub use store::{BucketStore, MemoryStore, NullStore, RedisStore};
pub use tasks::{spawn_cleanup_task, spawn_event_listener};
