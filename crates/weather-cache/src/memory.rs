//! In-process cache store backed by moka

use crate::error::Result;
use crate::glob::glob_match;
use crate::store::{CacheStore, TTL_MISSING, TTL_PERSISTENT};
use async_trait::async_trait;
use moka::future::Cache;
use moka::Expiry;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

const DEFAULT_MAX_CAPACITY: u64 = 10_000;

#[derive(Clone)]
struct StoredValue {
    bytes: Arc<[u8]>,
    /// `None` stores the value without expiry
    ttl: Option<Duration>,
    expires_at: Option<Instant>,
}

impl StoredValue {
    fn new(bytes: Vec<u8>, ttl: Duration) -> Self {
        let ttl = (!ttl.is_zero()).then_some(ttl);
        Self {
            bytes: bytes.into(),
            ttl,
            expires_at: ttl.map(|t| Instant::now() + t),
        }
    }

    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.map_or(true, |at| at > now)
    }
}

/// Each entry carries its own TTL; overwrites restart the clock.
struct PerEntryExpiry;

impl Expiry<String, StoredValue> for PerEntryExpiry {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &StoredValue,
        _created_at: Instant,
    ) -> Option<Duration> {
        value.ttl
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &StoredValue,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        value.ttl
    }
}

/// Bounded in-memory store with per-key expiry
pub struct MemoryStore {
    cache: Cache<String, StoredValue>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_MAX_CAPACITY)
    }

    pub fn with_capacity(max_capacity: u64) -> Self {
        let cache = Cache::builder()
            .max_capacity(max_capacity)
            .expire_after(PerEntryExpiry)
            .build();
        Self { cache }
    }

    /// Approximate number of live entries
    pub fn entry_count(&self) -> u64 {
        self.cache.entry_count()
    }

    async fn live(&self, key: &str) -> Option<StoredValue> {
        self.cache
            .get(key)
            .await
            .filter(|v| v.is_live(Instant::now()))
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CacheStore for MemoryStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.live(key).await.map(|v| v.bytes.to_vec()))
    }

    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<()> {
        self.cache
            .insert(key.to_string(), StoredValue::new(value, ttl))
            .await;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<u64> {
        let now = Instant::now();
        let removed = self.cache.remove(key).await;
        Ok(u64::from(removed.is_some_and(|v| v.is_live(now))))
    }

    async fn delete_pattern(&self, pattern: &str) -> Result<u64> {
        let matching: Vec<String> = self
            .cache
            .iter()
            .filter(|(key, _)| glob_match(pattern, key))
            .map(|(key, _)| key.to_string())
            .collect();

        let mut removed = 0;
        for key in &matching {
            removed += self.delete(key).await?;
        }
        debug!(pattern, removed, "Deleted keys by pattern");
        Ok(removed)
    }

    async fn ttl(&self, key: &str) -> Result<i64> {
        let now = Instant::now();
        Ok(match self.live(key).await {
            None => TTL_MISSING,
            Some(StoredValue {
                expires_at: None, ..
            }) => TTL_PERSISTENT,
            Some(StoredValue {
                expires_at: Some(at),
                ..
            }) => at.saturating_duration_since(now).as_secs() as i64,
        })
    }

    async fn flush(&self) -> Result<()> {
        self.cache.invalidate_all();
        Ok(())
    }

    async fn ping(&self) -> bool {
        true
    }
}
