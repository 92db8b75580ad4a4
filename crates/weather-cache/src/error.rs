//! Error types for cache stores

use std::fmt;
use std::time::Duration;

/// Errors reported by a [`CacheStore`](crate::CacheStore) backend.
///
/// These never reach request handlers: the cache-aside layer logs them and
/// falls back to the wrapped operation.
#[derive(Debug)]
pub enum CacheError {
    /// The store did not answer within the configured timeout
    Timeout(Duration),
    /// A cached value could not be encoded or decoded
    Serialization(serde_json::Error),
    /// The backend rejected the operation or is unreachable
    Backend(String),
    #[cfg(feature = "redis")]
    Redis(redis::RedisError),
}

impl fmt::Display for CacheError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Timeout(after) => write!(f, "Cache operation timed out after {:?}", after),
            Self::Serialization(e) => write!(f, "Cache serialization error: {}", e),
            Self::Backend(msg) => write!(f, "Cache backend error: {}", msg),
            #[cfg(feature = "redis")]
            Self::Redis(e) => write!(f, "Redis error: {}", e),
        }
    }
}

impl std::error::Error for CacheError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Serialization(e) => Some(e),
            #[cfg(feature = "redis")]
            Self::Redis(e) => Some(e),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for CacheError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization(e)
    }
}

#[cfg(feature = "redis")]
impl From<redis::RedisError> for CacheError {
    fn from(e: redis::RedisError) -> Self {
        Self::Redis(e)
    }
}

pub type Result<T> = std::result::Result<T, CacheError>;
