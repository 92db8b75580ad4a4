//! Key/value caching for the weather backend.
//!
//! - [`CacheStore`]: the backend contract, implemented by [`MemoryStore`]
//!   (moka, default) and `RedisStore` (behind the `redis` feature)
//! - [`CacheAside`], [`Cacheable`], [`CacheEvict`]: read-through and
//!   invalidate-on-write wrappers that keep working when the store is down
//! - [`keys`]: deterministic key builders for the `weather:` namespace

mod aside;
mod error;
mod glob;
pub mod keys;
mod memory;
#[cfg(feature = "redis")]
mod redis_store;
mod store;

pub use aside::{
    CacheAside, CacheEvict, CacheStats, Cacheable, DEFAULT_STORE_TIMEOUT, DEFAULT_TTL,
};
pub use error::{CacheError, Result};
pub use glob::glob_match;
pub use memory::MemoryStore;
#[cfg(feature = "redis")]
pub use redis_store::{RedisStore, DEFAULT_KEY_PREFIX};
pub use store::{CacheStore, TTL_MISSING, TTL_PERSISTENT};
