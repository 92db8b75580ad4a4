//! Cache-aside wrappers around fallible async operations.
//!
//! [`CacheAside`] is the shared handle: a store, a default TTL, a per-call
//! store timeout and hit/miss counters. [`Cacheable`] pairs it with a key
//! function and an operation to produce a read-through operation;
//! [`CacheEvict`] does the same for mutations that must invalidate keys once
//! they succeed.
//!
//! The store is never a correctness dependency. A failing or slow `get` means
//! the operation runs uncached, and failing writes or deletes are only logged.

use crate::error::CacheError;
use crate::store::CacheStore;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// TTL used when a wrapper does not override it
pub const DEFAULT_TTL: Duration = Duration::from_secs(300);
/// Upper bound on any single store call
pub const DEFAULT_STORE_TIMEOUT: Duration = Duration::from_millis(500);

/// Counters reported by the health endpoint
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    /// Lookups that skipped the cache because the store failed
    pub bypasses: u64,
    pub evictions: u64,
}

#[derive(Default)]
struct Counters {
    hits: AtomicU64,
    misses: AtomicU64,
    bypasses: AtomicU64,
    evictions: AtomicU64,
}

enum Lookup<T> {
    Hit(T),
    Miss,
    /// The store failed; call through and do not cache
    Unavailable,
}

/// Shared cache handle; cheap to clone
#[derive(Clone)]
pub struct CacheAside {
    store: Arc<dyn CacheStore>,
    default_ttl: Duration,
    timeout: Duration,
    counters: Arc<Counters>,
}

impl CacheAside {
    pub fn new(store: Arc<dyn CacheStore>) -> Self {
        Self {
            store,
            default_ttl: DEFAULT_TTL,
            timeout: DEFAULT_STORE_TIMEOUT,
            counters: Arc::new(Counters::default()),
        }
    }

    pub fn with_default_ttl(mut self, ttl: Duration) -> Self {
        self.default_ttl = ttl;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn store(&self) -> &Arc<dyn CacheStore> {
        &self.store
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.counters.hits.load(Ordering::Relaxed),
            misses: self.counters.misses.load(Ordering::Relaxed),
            bypasses: self.counters.bypasses.load(Ordering::Relaxed),
            evictions: self.counters.evictions.load(Ordering::Relaxed),
        }
    }

    /// Store liveness; a probe that outlives the store timeout counts as down
    pub async fn ping(&self) -> bool {
        tokio::time::timeout(self.timeout, self.store.ping())
            .await
            .unwrap_or(false)
    }

    /// Run a store call under the configured timeout
    async fn bounded<T, F>(&self, call: F) -> Result<T, CacheError>
    where
        F: Future<Output = Result<T, CacheError>>,
    {
        match tokio::time::timeout(self.timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(CacheError::Timeout(self.timeout)),
        }
    }

    async fn lookup<T: DeserializeOwned>(&self, key: &str) -> Lookup<T> {
        match self.bounded(self.store.get(key)).await {
            Ok(Some(bytes)) => match serde_json::from_slice(&bytes) {
                Ok(value) => {
                    self.counters.hits.fetch_add(1, Ordering::Relaxed);
                    debug!(key, "Cache hit");
                    Lookup::Hit(value)
                }
                Err(e) => {
                    // Treated as a miss; the fresh value overwrites it
                    self.counters.misses.fetch_add(1, Ordering::Relaxed);
                    warn!(key, error = %e, "Discarding undecodable cache entry");
                    Lookup::Miss
                }
            },
            Ok(None) => {
                self.counters.misses.fetch_add(1, Ordering::Relaxed);
                debug!(key, "Cache miss");
                Lookup::Miss
            }
            Err(e) => {
                self.counters.bypasses.fetch_add(1, Ordering::Relaxed);
                warn!(key, error = %e, "Cache unavailable, calling through");
                Lookup::Unavailable
            }
        }
    }

    /// Store `value` under `key`; failures are logged and swallowed.
    ///
    /// Values that serialize to JSON `null` are never written.
    pub async fn put<T: Serialize>(&self, key: &str, value: &T, ttl: Option<Duration>) {
        let ttl = ttl.unwrap_or(self.default_ttl);
        let bytes = match serde_json::to_vec(value) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(key, error = %e, "Failed to serialize cache entry");
                return;
            }
        };
        if bytes == b"null" {
            debug!(key, "Null result, not caching");
            return;
        }
        if let Err(e) = self.bounded(self.store.set(key, bytes, ttl)).await {
            warn!(key, error = %e, "Failed to write cache entry");
        }
    }

    /// Delete each key, returning how many were removed.
    ///
    /// Failures are logged and skipped.
    pub async fn evict<I>(&self, keys: I) -> u64
    where
        I: IntoIterator<Item = String>,
    {
        let mut removed = 0;
        for key in keys {
            match self.bounded(self.store.delete(&key)).await {
                Ok(count) => {
                    removed += count;
                    self.counters.evictions.fetch_add(count, Ordering::Relaxed);
                    debug!(key = %key, count, "Cache evicted");
                }
                Err(e) => warn!(key = %key, error = %e, "Cache eviction failed"),
            }
        }
        removed
    }

    /// Delete every key matching a glob; failures are logged and count as 0.
    pub async fn evict_pattern(&self, pattern: &str) -> u64 {
        match self.bounded(self.store.delete_pattern(pattern)).await {
            Ok(count) => {
                self.counters.evictions.fetch_add(count, Ordering::Relaxed);
                count
            }
            Err(e) => {
                warn!(pattern, error = %e, "Cache pattern eviction failed");
                0
            }
        }
    }

    /// Return the cached value for `key`, or run `fetch` and cache its result.
    ///
    /// Errors from `fetch` are returned unchanged and nothing is cached.
    pub async fn get_or_fetch<T, E, F, Fut>(
        &self,
        key: &str,
        ttl: Option<Duration>,
        fetch: F,
    ) -> Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        match self.lookup::<T>(key).await {
            Lookup::Hit(value) => Ok(value),
            Lookup::Miss => {
                let value = fetch().await?;
                self.put(key, &value, ttl).await;
                Ok(value)
            }
            Lookup::Unavailable => fetch().await,
        }
    }

    /// Like [`get_or_fetch`](Self::get_or_fetch) for operations that may find
    /// nothing. `None` results are never cached.
    pub async fn get_or_load<T, E, F, Fut>(
        &self,
        key: &str,
        ttl: Option<Duration>,
        load: F,
    ) -> Result<Option<T>, E>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Option<T>, E>>,
    {
        match self.lookup::<T>(key).await {
            Lookup::Hit(value) => Ok(Some(value)),
            Lookup::Miss => {
                let loaded = load().await?;
                if let Some(ref value) = loaded {
                    self.put(key, value, ttl).await;
                }
                Ok(loaded)
            }
            Lookup::Unavailable => load().await,
        }
    }
}

/// A read-through operation: `key_fn` derives the cache key from the
/// arguments and `op` produces the value on a miss.
///
/// ```ignore
/// let lookup = Cacheable::new(
///     cache.clone(),
///     |(city, country): &(String, String)| keys::city_coordinates(city, country),
///     |(city, country): (String, String)| async move { client.geolocation(&city, &country).await },
/// )
/// .with_ttl(Duration::from_secs(6000));
/// let coords = lookup.call(("London".into(), "GB".into())).await?;
/// ```
pub struct Cacheable<K, F> {
    cache: CacheAside,
    key_fn: K,
    ttl: Option<Duration>,
    op: F,
}

impl<K, F> Cacheable<K, F> {
    pub fn new(cache: CacheAside, key_fn: K, op: F) -> Self {
        Self {
            cache,
            key_fn,
            ttl: None,
            op,
        }
    }

    /// Override the cache's default TTL for this operation
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }

    pub async fn call<A, T, E, Fut>(&self, args: A) -> Result<T, E>
    where
        K: Fn(&A) -> String,
        F: Fn(A) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        T: Serialize + DeserializeOwned,
    {
        let key = (self.key_fn)(&args);
        self.cache
            .get_or_fetch(&key, self.ttl, || (self.op)(args))
            .await
    }

    /// Variant for operations returning `Option`; `None` is not cached.
    pub async fn call_optional<A, T, E, Fut>(&self, args: A) -> Result<Option<T>, E>
    where
        K: Fn(&A) -> String,
        F: Fn(A) -> Fut,
        Fut: Future<Output = Result<Option<T>, E>>,
        T: Serialize + DeserializeOwned,
    {
        let key = (self.key_fn)(&args);
        self.cache
            .get_or_load(&key, self.ttl, || (self.op)(args))
            .await
    }
}

/// A mutation that invalidates cache keys after it succeeds.
///
/// `key_fn` returns every key the mutation makes stale. Failed mutations
/// evict nothing; eviction failures never change the mutation's result.
pub struct CacheEvict<K, F> {
    cache: CacheAside,
    key_fn: K,
    op: F,
}

impl<K, F> CacheEvict<K, F> {
    pub fn new(cache: CacheAside, key_fn: K, op: F) -> Self {
        Self { cache, key_fn, op }
    }

    pub async fn call<A, I, T, E, Fut>(&self, args: A) -> Result<T, E>
    where
        K: Fn(&A) -> I,
        I: IntoIterator<Item = String>,
        F: Fn(A) -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let keys: Vec<String> = (self.key_fn)(&args).into_iter().collect();
        let result = (self.op)(args).await?;
        self.cache.evict(keys).await;
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Result as CacheResult;
    use crate::memory::MemoryStore;
    use async_trait::async_trait;
    use std::sync::atomic::AtomicUsize;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Coordinates {
        lat: f64,
        lon: f64,
    }

    const LONDON: Coordinates = Coordinates {
        lat: 51.5072,
        lon: -0.1276,
    };

    /// Memory store with switchable failures and a write counter
    #[derive(Default)]
    struct FlakyStore {
        inner: MemoryStore,
        fail_get: bool,
        fail_set: bool,
        fail_delete: bool,
        slow_get: Option<Duration>,
        sets: AtomicUsize,
    }

    fn unreachable() -> CacheError {
        CacheError::Backend("connection refused".to_string())
    }

    #[async_trait]
    impl CacheStore for FlakyStore {
        fn backend(&self) -> &'static str {
            "flaky"
        }

        async fn get(&self, key: &str) -> CacheResult<Option<Vec<u8>>> {
            if let Some(delay) = self.slow_get {
                tokio::time::sleep(delay).await;
            }
            if self.fail_get {
                return Err(unreachable());
            }
            self.inner.get(key).await
        }

        async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> CacheResult<()> {
            self.sets.fetch_add(1, Ordering::SeqCst);
            if self.fail_set {
                return Err(unreachable());
            }
            self.inner.set(key, value, ttl).await
        }

        async fn delete(&self, key: &str) -> CacheResult<u64> {
            if self.fail_delete {
                return Err(unreachable());
            }
            self.inner.delete(key).await
        }

        async fn delete_pattern(&self, pattern: &str) -> CacheResult<u64> {
            if self.fail_delete {
                return Err(unreachable());
            }
            self.inner.delete_pattern(pattern).await
        }

        async fn ttl(&self, key: &str) -> CacheResult<i64> {
            self.inner.ttl(key).await
        }

        async fn flush(&self) -> CacheResult<()> {
            self.inner.flush().await
        }

        async fn ping(&self) -> bool {
            !self.fail_get
        }
    }

    fn key_fn(args: &(String, String)) -> String {
        crate::keys::city_coordinates(&args.0, &args.1)
    }

    fn args(city: &str, country: &str) -> (String, String) {
        (city.to_string(), country.to_string())
    }

    #[tokio::test]
    async fn test_hit_skips_underlying_operation() {
        let store = Arc::new(MemoryStore::new());
        store
            .set(
                "weather:coords:london:gb",
                serde_json::to_vec(&LONDON).unwrap(),
                Duration::from_secs(60),
            )
            .await
            .unwrap();
        let cache = CacheAside::new(store);
        let calls = AtomicUsize::new(0);

        let lookup = Cacheable::new(cache.clone(), key_fn, |_: (String, String)| {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Ok::<_, String>(Coordinates { lat: 0.0, lon: 0.0 }) }
        });

        let result = lookup.call(args("London", "GB")).await.unwrap();
        assert_eq!(result, LONDON);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(cache.stats().hits, 1);
    }

    #[tokio::test]
    async fn test_miss_populates_store() {
        let store = Arc::new(MemoryStore::new());
        let cache = CacheAside::new(store.clone());
        let calls = AtomicUsize::new(0);

        let lookup = Cacheable::new(cache.clone(), key_fn, |_: (String, String)| {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Ok::<_, String>(LONDON) }
        })
        .with_ttl(Duration::from_secs(6000));

        assert_eq!(lookup.call(args("London", "GB")).await.unwrap(), LONDON);
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        let cached = store.get("weather:coords:london:gb").await.unwrap().unwrap();
        let cached: Coordinates = serde_json::from_slice(&cached).unwrap();
        assert_eq!(cached, LONDON);

        // Case-varied arguments land on the same key
        assert_eq!(lookup.call(args("London", "gb")).await.unwrap(), LONDON);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(
            cache.stats(),
            CacheStats {
                hits: 1,
                misses: 1,
                bypasses: 0,
                evictions: 0
            }
        );
    }

    #[tokio::test]
    async fn test_ttl_override_and_default() {
        let store = Arc::new(MemoryStore::new());
        let cache = CacheAside::new(store.clone()).with_default_ttl(Duration::from_secs(600));

        cache
            .get_or_fetch("with-default", None, || async { Ok::<_, String>(1u32) })
            .await
            .unwrap();
        cache
            .get_or_fetch("with-override", Some(Duration::from_secs(6000)), || async {
                Ok::<_, String>(2u32)
            })
            .await
            .unwrap();

        let default_ttl = store.ttl("with-default").await.unwrap();
        assert!((595..=600).contains(&default_ttl), "ttl was {default_ttl}");
        let override_ttl = store.ttl("with-override").await.unwrap();
        assert!((5995..=6000).contains(&override_ttl), "ttl was {override_ttl}");
    }

    #[tokio::test]
    async fn test_get_failure_falls_through_without_caching() {
        let store = Arc::new(FlakyStore {
            fail_get: true,
            ..Default::default()
        });
        let cache = CacheAside::new(store.clone());
        let calls = AtomicUsize::new(0);

        let lookup = Cacheable::new(cache.clone(), key_fn, |_: (String, String)| {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Ok::<_, String>(LONDON) }
        });

        assert_eq!(lookup.call(args("London", "GB")).await.unwrap(), LONDON);
        assert_eq!(lookup.call(args("London", "GB")).await.unwrap(), LONDON);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(store.sets.load(Ordering::SeqCst), 0);
        assert_eq!(cache.stats().bypasses, 2);
    }

    #[tokio::test]
    async fn test_slow_store_counts_as_unavailable() {
        let store = Arc::new(FlakyStore {
            slow_get: Some(Duration::from_secs(5)),
            ..Default::default()
        });
        let cache = CacheAside::new(store).with_timeout(Duration::from_millis(50));

        let value = cache
            .get_or_fetch("slow", None, || async { Ok::<_, String>(7u8) })
            .await
            .unwrap();
        assert_eq!(value, 7);
        assert_eq!(cache.stats().bypasses, 1);
    }

    #[tokio::test]
    async fn test_set_failure_is_swallowed() {
        let store = Arc::new(FlakyStore {
            fail_set: true,
            ..Default::default()
        });
        let cache = CacheAside::new(store.clone());

        let value = cache
            .get_or_fetch("k", None, || async { Ok::<_, String>(LONDON) })
            .await
            .unwrap();
        assert_eq!(value, LONDON);
        assert_eq!(store.sets.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_operation_error_propagates_and_is_not_cached() {
        let store = Arc::new(MemoryStore::new());
        let cache = CacheAside::new(store.clone());

        let lookup = Cacheable::new(cache, key_fn, |_: (String, String)| async {
            Err::<Coordinates, _>("City not found".to_string())
        });

        let err = lookup.call(args("Atlantis", "XX")).await.unwrap_err();
        assert_eq!(err, "City not found");
        assert!(!store.exists("weather:coords:atlantis:xx").await.unwrap());
    }

    #[tokio::test]
    async fn test_none_result_is_not_cached() {
        let store = Arc::new(MemoryStore::new());
        let cache = CacheAside::new(store.clone());
        let calls = AtomicUsize::new(0);

        let lookup = Cacheable::new(cache, key_fn, |_: (String, String)| {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Ok::<Option<Coordinates>, String>(None) }
        });

        assert_eq!(lookup.call_optional(args("Nowhere", "ZZ")).await.unwrap(), None);
        assert_eq!(lookup.call_optional(args("Nowhere", "ZZ")).await.unwrap(), None);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert!(!store.exists("weather:coords:nowhere:zz").await.unwrap());
    }

    #[tokio::test]
    async fn test_plain_call_does_not_cache_none() {
        let store = Arc::new(MemoryStore::new());
        let cache = CacheAside::new(store.clone());
        let calls = AtomicUsize::new(0);

        let lookup = Cacheable::new(cache, key_fn, |_: (String, String)| {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Ok::<Option<u32>, String>(None) }
        });

        assert_eq!(lookup.call(args("Nowhere", "ZZ")).await.unwrap(), None);
        assert_eq!(lookup.call(args("Nowhere", "ZZ")).await.unwrap(), None);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(store.get("weather:coords:nowhere:zz").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_unit_result_is_not_cached() {
        let store = Arc::new(MemoryStore::new());
        let cache = CacheAside::new(store.clone());

        cache.put("weather:unit", &(), None).await;
        assert!(!store.exists("weather:unit").await.unwrap());
    }

    #[tokio::test]
    async fn test_some_result_is_cached() {
        let store = Arc::new(MemoryStore::new());
        let cache = CacheAside::new(store.clone());

        let lookup = Cacheable::new(cache, key_fn, |_: (String, String)| async {
            Ok::<_, String>(Some(LONDON))
        });

        assert_eq!(
            lookup.call_optional(args("London", "GB")).await.unwrap(),
            Some(LONDON)
        );
        assert!(store.exists("weather:coords:london:gb").await.unwrap());
    }

    #[tokio::test]
    async fn test_undecodable_entry_is_replaced() {
        let store = Arc::new(MemoryStore::new());
        store
            .set("weather:coords:london:gb", b"not json".to_vec(), Duration::ZERO)
            .await
            .unwrap();
        let cache = CacheAside::new(store.clone());

        let value = cache
            .get_or_fetch("weather:coords:london:gb", None, || async {
                Ok::<_, String>(LONDON)
            })
            .await
            .unwrap();
        assert_eq!(value, LONDON);

        let stored = store.get("weather:coords:london:gb").await.unwrap().unwrap();
        assert_eq!(serde_json::from_slice::<Coordinates>(&stored).unwrap(), LONDON);
    }

    #[tokio::test]
    async fn test_evict_after_successful_mutation() {
        let store = Arc::new(MemoryStore::new());
        store
            .set("weather:current:uuid:abc", b"1".to_vec(), Duration::ZERO)
            .await
            .unwrap();
        let cache = CacheAside::new(store.clone());

        let update = CacheEvict::new(
            cache.clone(),
            |id: &String| [crate::keys::current_by_id(id)],
            |_id: String| async { Ok::<_, String>("updated") },
        );

        assert_eq!(update.call("ABC".to_string()).await.unwrap(), "updated");
        assert!(!store.exists("weather:current:uuid:abc").await.unwrap());
        assert_eq!(cache.stats().evictions, 1);
    }

    #[tokio::test]
    async fn test_failed_mutation_evicts_nothing() {
        let store = Arc::new(MemoryStore::new());
        store
            .set("weather:current:uuid:abc", b"1".to_vec(), Duration::ZERO)
            .await
            .unwrap();
        let cache = CacheAside::new(store.clone());

        let update = CacheEvict::new(
            cache,
            |id: &String| vec![crate::keys::current_by_id(id)],
            |_id: String| async { Err::<(), _>("not found".to_string()) },
        );

        assert!(update.call("abc".to_string()).await.is_err());
        assert!(store.exists("weather:current:uuid:abc").await.unwrap());
    }

    #[tokio::test]
    async fn test_eviction_failure_does_not_fail_mutation() {
        let store = Arc::new(FlakyStore {
            fail_delete: true,
            ..Default::default()
        });
        let cache = CacheAside::new(store);

        let delete = CacheEvict::new(
            cache,
            |id: &String| [crate::keys::current_by_id(id)],
            |_id: String| async { Ok::<_, String>(true) },
        );

        assert!(delete.call("abc".to_string()).await.unwrap());
    }

    #[tokio::test]
    async fn test_ping_reflects_store() {
        assert!(CacheAside::new(Arc::new(MemoryStore::new())).ping().await);
        let down = FlakyStore {
            fail_get: true,
            ..Default::default()
        };
        assert!(!CacheAside::new(Arc::new(down)).ping().await);
    }

    #[tokio::test]
    async fn test_evict_pattern() {
        let store = Arc::new(MemoryStore::new());
        for key in ["weather:current:1:2", "weather:current:3:4", "weather:coords:a:b"] {
            store.set(key, b"1".to_vec(), Duration::ZERO).await.unwrap();
        }
        let cache = CacheAside::new(store.clone());

        assert_eq!(cache.evict_pattern("weather:current:*").await, 2);
        assert!(store.exists("weather:coords:a:b").await.unwrap());
    }
}
