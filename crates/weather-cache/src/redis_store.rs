//! Shared cache store backed by Redis
//!
//! Every key is stored under a configurable prefix so several deployments can
//! share one Redis database. Pattern deletes walk the keyspace with `SCAN`
//! rather than `KEYS` so they never block the server.

use crate::error::Result;
use crate::store::CacheStore;
use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use std::time::Duration;
use tracing::{info, warn};

pub const DEFAULT_KEY_PREFIX: &str = "weather_app:";
const SCAN_BATCH: usize = 200;

fn prefixed_key(prefix: &str, key: &str) -> String {
    format!("{prefix}{key}")
}

pub struct RedisStore {
    conn: ConnectionManager,
    prefix: String,
}

impl RedisStore {
    /// Connect to Redis at `url`, prefixing every key with `prefix`
    pub async fn connect(url: &str, prefix: &str) -> Result<Self> {
        let client = redis::Client::open(url)?;
        let conn = ConnectionManager::new(client).await?;
        info!(prefix, "Connected to Redis cache");
        Ok(Self {
            conn,
            prefix: prefix.to_string(),
        })
    }

    fn prefixed(&self, key: &str) -> String {
        prefixed_key(&self.prefix, key)
    }

    /// Collect every full (prefixed) key matching `pattern`
    async fn scan(&self, pattern: &str) -> Result<Vec<String>> {
        let mut conn = self.conn.clone();
        let full_pattern = self.prefixed(pattern);
        let mut cursor: u64 = 0;
        let mut keys = Vec::new();
        loop {
            let (next, batch): (u64, Vec<String>) = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(&full_pattern)
                .arg("COUNT")
                .arg(SCAN_BATCH)
                .query_async(&mut conn)
                .await?;
            keys.extend(batch);
            if next == 0 {
                break;
            }
            cursor = next;
        }
        Ok(keys)
    }
}

#[async_trait]
impl CacheStore for RedisStore {
    fn backend(&self) -> &'static str {
        "redis"
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let mut conn = self.conn.clone();
        let value: Option<Vec<u8>> = conn.get(self.prefixed(key)).await?;
        Ok(value)
    }

    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<()> {
        let mut conn = self.conn.clone();
        let key = self.prefixed(key);
        if ttl.is_zero() {
            let _: () = conn.set(key, value).await?;
        } else {
            // Redis expiry has whole-second resolution
            let secs = ttl.as_secs().max(1);
            let _: () = conn.set_ex(key, value, secs).await?;
        }
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<u64> {
        let mut conn = self.conn.clone();
        let removed: u64 = conn.del(self.prefixed(key)).await?;
        Ok(removed)
    }

    async fn delete_pattern(&self, pattern: &str) -> Result<u64> {
        let keys = self.scan(pattern).await?;
        if keys.is_empty() {
            return Ok(0);
        }
        let mut conn = self.conn.clone();
        let removed: u64 = conn.del(keys).await?;
        Ok(removed)
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        let mut conn = self.conn.clone();
        let found: bool = conn.exists(self.prefixed(key)).await?;
        Ok(found)
    }

    async fn ttl(&self, key: &str) -> Result<i64> {
        let mut conn = self.conn.clone();
        let remaining: i64 = conn.ttl(self.prefixed(key)).await?;
        Ok(remaining)
    }

    async fn flush(&self) -> Result<()> {
        // Only this store's namespace, never FLUSHALL
        self.delete_pattern("*").await?;
        Ok(())
    }

    async fn ping(&self) -> bool {
        let mut conn = self.conn.clone();
        let reply: redis::RedisResult<String> = redis::cmd("PING").query_async(&mut conn).await;
        match reply {
            Ok(pong) => pong == "PONG",
            Err(e) => {
                warn!(error = %e, "Redis ping failed");
                false
            }
        }
    }

    /// The multiplexed connection is released when the last clone of the
    /// manager is dropped, so there is nothing to flush here.
    async fn close(&self) -> Result<()> {
        info!(prefix = %self.prefix, "Closing Redis cache connection");
        Ok(())
    }
}
