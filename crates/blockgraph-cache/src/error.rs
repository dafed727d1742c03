//! Error types for blockgraph-cache.

use thiserror::Error;

/// Result type for cache construction.
pub type Result<T> = std::result::Result<T, CacheError>;

/// Errors raised when configuring a cache.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CacheError {
    /// Shard count must be a power of two greater than one.
    #[error("invalid shard amount {0}: must be a power of two greater than 1")]
    InvalidShardAmount(usize),
}
