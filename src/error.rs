//! Error types for the gateway cache
//!
//! Store backends report failures through [`CacheError`]. The
//! [`PartitionedCache`](crate::PartitionedCache) facade never hands these to its
//! callers; it logs them and falls back to a miss or a no-op.

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for the store backends.
#[derive(Error, Debug)]
pub enum CacheError {
    /// No backend connection is held
    #[error("Backend unavailable: {0}")]
    Unavailable(String),

    /// The backend rejected or failed a command
    #[error("Backend error: {0}")]
    Backend(#[from] redis::RedisError),

    /// The backend did not answer in time
    #[error("Backend timed out during {0}")]
    Timeout(&'static str),

    /// A configuration value could not be used
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

// == Result Type Alias ==
/// Convenience Result type for store operations.
pub type Result<T> = std::result::Result<T, CacheError>;
