//! The key/value store contract shared by every cache backend

use crate::error::Result;
use async_trait::async_trait;
use std::time::Duration;

/// `ttl` value returned for a key that exists without an expiry
pub const TTL_PERSISTENT: i64 = -1;
/// `ttl` value returned for a key that does not exist (or has expired)
pub const TTL_MISSING: i64 = -2;

/// A key/value store with per-key expiry.
///
/// Values are opaque bytes; the cache-aside layer owns serialization.
/// Implementations must be safe to share between concurrent requests and
/// make every single-key write atomic from the caller's point of view.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Short backend name for health reporting ("memory", "redis")
    fn backend(&self) -> &'static str;

    /// Return the stored value, or `None` if the key was never set or has expired.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Store `value` under `key`, replacing any previous value and expiry.
    ///
    /// A zero `ttl` stores the value without expiry.
    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<()>;

    /// Remove a single key, returning how many keys were removed (0 or 1).
    async fn delete(&self, key: &str) -> Result<u64>;

    /// Remove every key matching a Redis-style glob, returning the count removed.
    async fn delete_pattern(&self, pattern: &str) -> Result<u64>;

    /// Whether a live value exists for `key`
    async fn exists(&self, key: &str) -> Result<bool> {
        Ok(self.get(key).await?.is_some())
    }

    /// Remaining lifetime in whole seconds, [`TTL_PERSISTENT`] or [`TTL_MISSING`].
    async fn ttl(&self, key: &str) -> Result<i64>;

    /// Remove every key owned by this store.
    async fn flush(&self) -> Result<()>;

    /// Liveness probe
    async fn ping(&self) -> bool;

    /// Release backend resources on shutdown.
    async fn close(&self) -> Result<()> {
        Ok(())
    }
}
