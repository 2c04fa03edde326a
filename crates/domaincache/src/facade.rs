//! The domain-namespaced cache facade.
//!
//! `CacheFacade` owns one store connection and rewrites every caller key to
//! `prefix:key`, where the prefix is derived from the configured domain. It
//! never keeps values in local memory: all state lives in the store.
//!
//! A facade is either active (it has a store) or inert (disabled by
//! configuration, or the connection failed). The state is fixed at
//! construction. Inert facades answer every operation with
//! `CacheError::Unavailable` and never touch the network.

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

use domaincache_core::cache::{
    namespace_prefix, namespaced_key, CacheError, CacheValue, KeyValueStore, Result,
};

use crate::config::CacheConfig;
use crate::store::RedisStore;

/// Number of keys examined per `SCAN` call in [`CacheFacade::delete_by_pattern`].
pub const SCAN_PAGE_SIZE: usize = 1000;

/// TTL callers conventionally pass to [`CacheFacade::remember`].
pub const DEFAULT_REMEMBER_TTL: Duration = Duration::from_secs(3600);

/// How much shorter than requested values written by `remember` live.
pub const REMEMBER_TTL_MARGIN: Duration = Duration::from_secs(3);

/// Effective TTL for values stored by `remember`: `ttl` minus
/// [`REMEMBER_TTL_MARGIN`], whole seconds, never below one second.
///
/// The margin keeps a value that is about to expire remotely from being
/// handed out as fresh.
pub fn remember_ttl(ttl: Duration) -> Duration {
    Duration::from_secs(
        ttl.as_secs()
            .saturating_sub(REMEMBER_TTL_MARGIN.as_secs())
            .max(1),
    )
}

/// Handle to a namespaced view of a key-value store.
///
/// Cloning is cheap and clones share the connection, so the application
/// builds one facade at startup and passes it to whoever needs it.
#[derive(Clone)]
pub struct CacheFacade {
    store: Option<Arc<dyn KeyValueStore>>,
    prefix: Arc<str>,
}

impl fmt::Debug for CacheFacade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheFacade")
            .field("prefix", &self.prefix)
            .field("active", &self.is_active())
            .finish()
    }
}

impl CacheFacade {
    /// Connects to the store described by `config`.
    ///
    /// Never fails: if `config.active` is false no connection is attempted,
    /// and if the connection fails the error is logged. Either way the
    /// returned facade is inert.
    pub async fn connect(config: &CacheConfig) -> Self {
        let domain = config.domain.as_deref();

        if !config.active {
            tracing::info!("Cache disabled by configuration");
            return Self::disabled(domain);
        }

        match RedisStore::connect(config).await {
            Ok(store) => {
                let facade = Self::with_store(Arc::new(store), domain);
                tracing::info!(
                    address = %config.address(),
                    database = config.database,
                    persistent = config.persistent,
                    prefix = %facade.prefix,
                    "Connected to cache store"
                );
                facade
            }
            Err(err) => {
                tracing::error!(
                    address = %config.address(),
                    error = %err,
                    "Cache store connection failed, continuing without cache"
                );
                Self::disabled(domain)
            }
        }
    }

    /// Creates an active facade over an existing store.
    pub fn with_store(store: Arc<dyn KeyValueStore>, domain: Option<&str>) -> Self {
        Self {
            store: Some(store),
            prefix: namespace_prefix(domain).into(),
        }
    }

    /// Creates an inert facade.
    pub fn disabled(domain: Option<&str>) -> Self {
        Self {
            store: None,
            prefix: namespace_prefix(domain).into(),
        }
    }

    /// The namespace prefix, without the trailing `:`.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Returns false for inert facades.
    pub fn is_active(&self) -> bool {
        self.store.is_some()
    }

    /// Returns the store key a caller key maps to.
    pub fn key(&self, key: &str) -> String {
        namespaced_key(&self.prefix, key)
    }

    fn store(&self) -> Result<&dyn KeyValueStore> {
        self.store.as_deref().ok_or(CacheError::Unavailable)
    }

    /// Gets a value, decoding it when it parses as JSON.
    pub async fn get(&self, key: &str) -> Result<Option<CacheValue>> {
        Ok(self.get_raw(key).await?.map(CacheValue::decode))
    }

    /// Gets a value exactly as stored.
    pub async fn get_raw(&self, key: &str) -> Result<Option<String>> {
        self.store()?
            .get(&self.key(key))
            .await
            .inspect_err(|err| log_failure("get", key, err))
    }

    /// Gets a value and deserializes it into `T`.
    pub async fn get_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.get(key).await? {
            Some(value) => value
                .deserialize()
                .map(Some)
                .inspect_err(|err| log_failure("get", key, err)),
            None => Ok(None),
        }
    }

    /// Stores a value. `None` or a zero `ttl` stores it without expiry.
    pub async fn set(
        &self,
        key: &str,
        value: impl Into<CacheValue>,
        ttl: Option<Duration>,
    ) -> Result<()> {
        let store = self.store()?;
        let encoded = value
            .into()
            .encode()
            .inspect_err(|err| log_failure("set", key, err))?;

        store
            .set(&self.key(key), &encoded, ttl.filter(|d| !d.is_zero()))
            .await
            .inspect_err(|err| log_failure("set", key, err))
    }

    /// Serializes `value` as JSON and stores it.
    pub async fn set_json<T: Serialize + ?Sized>(
        &self,
        key: &str,
        value: &T,
        ttl: Option<Duration>,
    ) -> Result<()> {
        let value = CacheValue::structured(value).inspect_err(|err| log_failure("set", key, err))?;
        self.set(key, value, ttl).await
    }

    /// Read-through helper.
    ///
    /// Returns the cached value when there is one, without calling
    /// `supplier`. Otherwise awaits `supplier` and, if it produced a value,
    /// stores it for [`remember_ttl(ttl)`](remember_ttl). The computed value
    /// is returned even if storing it failed; store failures are only logged.
    ///
    /// A cached JSON `null` counts as a miss.
    pub async fn remember<F, Fut, V>(&self, key: &str, ttl: Duration, supplier: F) -> Option<CacheValue>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Option<V>>,
        V: Into<CacheValue>,
    {
        match self.get(key).await {
            Ok(Some(CacheValue::Structured(Value::Null))) | Ok(None) => {
                tracing::trace!(key = %key, "Cache miss");
            }
            Ok(Some(value)) => {
                tracing::trace!(key = %key, "Cache hit");
                return Some(value);
            }
            // Already logged by `get`; fall through to the supplier.
            Err(_) => {}
        }

        let value: CacheValue = supplier().await?.into();
        if self
            .set(key, value.clone(), Some(remember_ttl(ttl)))
            .await
            .is_err()
        {
            tracing::debug!(key = %key, "Returning computed value without caching it");
        }
        Some(value)
    }

    /// Typed variant of [`remember`](Self::remember).
    ///
    /// A cached value that does not deserialize into `T` is treated as a
    /// miss and overwritten.
    pub async fn remember_json<T, F, Fut>(&self, key: &str, ttl: Duration, supplier: F) -> Option<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Option<T>>,
    {
        match self.get(key).await {
            Ok(Some(CacheValue::Structured(Value::Null))) | Ok(None) => {
                tracing::trace!(key = %key, "Cache miss");
            }
            Ok(Some(cached)) => match cached.deserialize::<T>() {
                Ok(value) => {
                    tracing::trace!(key = %key, "Cache hit");
                    return Some(value);
                }
                Err(err) => {
                    tracing::warn!(key = %key, error = %err, "Cached value deserialization failed");
                }
            },
            Err(_) => {}
        }

        let value = supplier().await?;
        if self
            .set_json(key, &value, Some(remember_ttl(ttl)))
            .await
            .is_err()
        {
            tracing::debug!(key = %key, "Returning computed value without caching it");
        }
        Some(value)
    }

    /// Deletes a key, returning how many keys were removed (0 or 1).
    pub async fn delete(&self, key: &str) -> Result<u64> {
        self.store()?
            .del(&[self.key(key)])
            .await
            .inspect_err(|err| log_failure("delete", key, err))
    }

    /// Returns true if the key exists.
    pub async fn has(&self, key: &str) -> Result<bool> {
        self.store()?
            .exists(&self.key(key))
            .await
            .inspect_err(|err| log_failure("has", key, err))
    }

    /// Remaining time to live; `None` if the key is absent or never expires.
    pub async fn ttl(&self, key: &str) -> Result<Option<Duration>> {
        self.store()?
            .ttl(&self.key(key))
            .await
            .inspect_err(|err| log_failure("ttl", key, err))
    }

    /// Sets a hash field, returning true if the field did not exist before.
    pub async fn hset(&self, key: &str, field: &str, value: impl Into<CacheValue>) -> Result<bool> {
        let store = self.store()?;
        let encoded = value
            .into()
            .encode()
            .inspect_err(|err| log_failure("hset", key, err))?;

        store
            .hset(&self.key(key), field, &encoded)
            .await
            .inspect_err(|err| log_failure("hset", key, err))
    }

    pub async fn hget(&self, key: &str, field: &str) -> Result<Option<String>> {
        self.store()?
            .hget(&self.key(key), field)
            .await
            .inspect_err(|err| log_failure("hget", key, err))
    }

    /// Removes a hash field, returning how many fields were removed.
    pub async fn hdel(&self, key: &str, field: &str) -> Result<u64> {
        self.store()?
            .hdel(&self.key(key), field)
            .await
            .inspect_err(|err| log_failure("hdel", key, err))
    }

    pub async fn hexists(&self, key: &str, field: &str) -> Result<bool> {
        self.store()?
            .hexists(&self.key(key), field)
            .await
            .inspect_err(|err| log_failure("hexists", key, err))
    }

    pub async fn hgetall(&self, key: &str) -> Result<HashMap<String, String>> {
        self.store()?
            .hgetall(&self.key(key))
            .await
            .inspect_err(|err| log_failure("hgetall", key, err))
    }

    pub async fn hvals(&self, key: &str) -> Result<Vec<String>> {
        self.store()?
            .hvals(&self.key(key))
            .await
            .inspect_err(|err| log_failure("hvals", key, err))
    }

    /// Atomically adds `by` to a counter and returns the new value.
    /// Missing counters start at zero.
    pub async fn increment(&self, key: &str, by: i64) -> Result<i64> {
        self.store()?
            .incr_by(&self.key(key), by)
            .await
            .inspect_err(|err| log_failure("increment", key, err))
    }

    /// Atomically subtracts `by` from a counter and returns the new value.
    pub async fn decrement(&self, key: &str, by: i64) -> Result<i64> {
        self.store()?
            .decr_by(&self.key(key), by)
            .await
            .inspect_err(|err| log_failure("decrement", key, err))
    }

    /// Deletes every key of this namespace matching a glob pattern.
    ///
    /// Walks the store's cursor scan [`SCAN_PAGE_SIZE`] keys at a time,
    /// deleting each page's matches, until the cursor comes back as `0`.
    /// Returns the number of keys deleted.
    pub async fn delete_by_pattern(&self, pattern: &str) -> Result<u64> {
        let store = self.store()?;
        let pattern_key = self.key(pattern);

        let mut cursor = 0;
        let mut deleted = 0;
        loop {
            let page = store
                .scan(cursor, &pattern_key, SCAN_PAGE_SIZE)
                .await
                .inspect_err(|err| log_failure("delete_by_pattern", pattern, err))?;

            if !page.keys.is_empty() {
                deleted += store
                    .del(&page.keys)
                    .await
                    .inspect_err(|err| log_failure("delete_by_pattern", pattern, err))?;
            }

            cursor = page.cursor;
            if cursor == 0 {
                break;
            }
        }

        tracing::debug!(pattern = %pattern_key, deleted, "Deleted keys by pattern");
        Ok(deleted)
    }

    /// Drops the whole selected database.
    ///
    /// This is NOT limited to this facade's namespace: keys of every other
    /// domain sharing the database are removed too.
    pub async fn flush_all(&self) -> Result<()> {
        let store = self.store()?;
        tracing::warn!(prefix = %self.prefix, "Flushing the entire cache database");
        store
            .flush_db()
            .await
            .inspect_err(|err| log_failure("flush_all", "*", err))
    }

    /// Probes the store. Any failure, including being inert, reads as false.
    pub async fn is_connected(&self) -> bool {
        match self.store() {
            Ok(store) => store.ping().await.is_ok(),
            Err(_) => false,
        }
    }
}

fn log_failure(operation: &'static str, key: &str, err: &CacheError) {
    match err {
        CacheError::Unavailable => {
            tracing::debug!(op = operation, key = %key, "Cache unavailable");
        }
        _ => {
            tracing::warn!(op = operation, key = %key, error = %err, "Cache operation failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use serde::Deserialize;
    use serde_json::json;

    use crate::store::MemoryStore;

    const TEST_MAX_ENTRIES: usize = 100_000;

    fn test_facade(domain: Option<&str>) -> (CacheFacade, MemoryStore) {
        let store = MemoryStore::new(TEST_MAX_ENTRIES);
        let facade = CacheFacade::with_store(Arc::new(store.clone()), domain);
        (facade, store)
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Product {
        id: u32,
        name: String,
    }

    #[test]
    fn test_remember_ttl() {
        assert_eq!(remember_ttl(Duration::from_secs(10)), Duration::from_secs(7));
        assert_eq!(remember_ttl(DEFAULT_REMEMBER_TTL), Duration::from_secs(3597));
        assert_eq!(remember_ttl(Duration::from_secs(4)), Duration::from_secs(1));
        assert_eq!(remember_ttl(Duration::from_secs(3)), Duration::from_secs(1));
        assert_eq!(remember_ttl(Duration::ZERO), Duration::from_secs(1));
    }

    #[test]
    fn test_prefix_and_key() {
        let (facade, _) = test_facade(Some("https://www.example.com"));
        assert_eq!(facade.prefix(), "c75c5f");
        assert_eq!(facade.key("user:1"), "c75c5f:user:1");

        let (global, _) = test_facade(None);
        assert_eq!(global.prefix(), "global");
        assert_eq!(global.key("user:1"), "global:user:1");
    }

    #[tokio::test]
    async fn test_keys_are_namespaced_in_store() {
        let (facade, store) = test_facade(Some("example.com"));

        facade.set("greeting", "hello", None).await.unwrap();

        assert_eq!(
            store.get("c75c5f:greeting").await.unwrap().as_deref(),
            Some("hello")
        );
        assert_eq!(store.get("greeting").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_structured_round_trip() {
        let (facade, store) = test_facade(Some("example.com"));

        facade.set("k", json!({"a": 1}), None).await.unwrap();

        assert_eq!(
            facade.get("k").await.unwrap(),
            Some(CacheValue::Structured(json!({"a": 1})))
        );
        assert_eq!(
            store.get(&facade.key("k")).await.unwrap().as_deref(),
            Some(r#"{"a":1}"#)
        );
    }

    #[tokio::test]
    async fn test_plain_round_trip() {
        let (facade, _) = test_facade(Some("example.com"));

        facade.set("k", "plain", None).await.unwrap();

        assert_eq!(
            facade.get("k").await.unwrap(),
            Some(CacheValue::Scalar("plain".to_string()))
        );
    }

    #[tokio::test]
    async fn test_get_raw_skips_decoding() {
        let (facade, _) = test_facade(None);

        facade.set("k", json!([1, 2]), None).await.unwrap();

        assert_eq!(facade.get_raw("k").await.unwrap().as_deref(), Some("[1,2]"));
    }

    #[tokio::test]
    async fn test_get_missing_is_none() {
        let (facade, _) = test_facade(None);
        assert_eq!(facade.get("missing").await.unwrap(), None);
        assert_eq!(facade.get_raw("missing").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_set_json_and_get_json() {
        let (facade, _) = test_facade(None);
        let product = Product {
            id: 7,
            name: "lamp".to_string(),
        };

        facade.set_json("product:7", &product, None).await.unwrap();

        let cached: Option<Product> = facade.get_json("product:7").await.unwrap();
        assert_eq!(cached, Some(product));
    }

    #[tokio::test]
    async fn test_get_json_wrong_shape_fails() {
        let (facade, _) = test_facade(None);
        facade.set("product:7", "not a product", None).await.unwrap();

        let result = facade.get_json::<Product>("product:7").await;
        assert!(matches!(result, Err(CacheError::Serialization(_))));
    }

    #[tokio::test]
    async fn test_set_with_ttl() {
        let (facade, _) = test_facade(None);

        facade
            .set("short", "v", Some(Duration::from_secs(10)))
            .await
            .unwrap();
        facade.set("forever", "v", None).await.unwrap();
        facade.set("zero", "v", Some(Duration::ZERO)).await.unwrap();

        assert_eq!(
            facade.ttl("short").await.unwrap(),
            Some(Duration::from_secs(10))
        );
        assert_eq!(facade.ttl("forever").await.unwrap(), None);
        assert_eq!(facade.ttl("zero").await.unwrap(), None);
        assert!(facade.has("zero").await.unwrap());
    }

    #[tokio::test]
    async fn test_set_with_huge_ttl_fails_without_panicking() {
        let (facade, _) = test_facade(None);

        let result = facade
            .set("k", "v", Some(Duration::from_secs(u64::MAX)))
            .await;

        assert!(matches!(result, Err(CacheError::OperationFailed(_))));
        assert!(!facade.has("k").await.unwrap());
    }

    #[tokio::test]
    async fn test_remember_cold_then_warm() {
        let (facade, _) = test_facade(Some("example.com"));
        let first_calls = AtomicUsize::new(0);
        let second_calls = AtomicUsize::new(0);

        let value = facade
            .remember("report", Duration::from_secs(10), || async {
                first_calls.fetch_add(1, Ordering::SeqCst);
                Some(json!({"total": 42}))
            })
            .await;

        assert_eq!(value, Some(CacheValue::Structured(json!({"total": 42}))));
        assert_eq!(first_calls.load(Ordering::SeqCst), 1);
        assert_eq!(
            facade.ttl("report").await.unwrap(),
            Some(Duration::from_secs(7))
        );

        let value = facade
            .remember("report", Duration::from_secs(10), || async {
                second_calls.fetch_add(1, Ordering::SeqCst);
                Some(json!({"total": 0}))
            })
            .await;

        assert_eq!(value, Some(CacheValue::Structured(json!({"total": 42}))));
        assert_eq!(second_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_remember_none_writes_nothing() {
        let (facade, store) = test_facade(None);

        let value = facade
            .remember("nothing", Duration::from_secs(10), || async {
                None::<CacheValue>
            })
            .await;

        assert_eq!(value, None);
        assert!(!facade.has("nothing").await.unwrap());
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_remember_short_ttl_floors_at_one_second() {
        let (facade, _) = test_facade(None);

        facade
            .remember("k", Duration::from_secs(2), || async { Some("v") })
            .await;

        assert_eq!(facade.ttl("k").await.unwrap(), Some(Duration::from_secs(1)));
    }

    #[tokio::test]
    async fn test_remember_treats_cached_null_as_miss() {
        let (facade, _) = test_facade(None);
        facade.set("k", Value::Null, None).await.unwrap();

        let value = facade
            .remember("k", Duration::from_secs(10), || async { Some("fresh") })
            .await;

        assert_eq!(value, Some(CacheValue::Scalar("fresh".to_string())));
    }

    #[tokio::test]
    async fn test_remember_on_inert_facade_still_computes() {
        let facade = CacheFacade::disabled(Some("example.com"));
        let calls = AtomicUsize::new(0);

        let value = facade
            .remember("k", DEFAULT_REMEMBER_TTL, || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Some(5_i64)
            })
            .await;

        assert_eq!(value, Some(CacheValue::Scalar("5".to_string())));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_remember_json() {
        let (facade, _) = test_facade(None);
        let product = Product {
            id: 1,
            name: "chair".to_string(),
        };

        let first = facade
            .remember_json("product:1", Duration::from_secs(60), || {
                let product = product.clone();
                async move { Some(product) }
            })
            .await;
        assert_eq!(first.as_ref(), Some(&product));

        let calls = AtomicUsize::new(0);
        let second: Option<Product> = facade
            .remember_json("product:1", Duration::from_secs(60), || async {
                calls.fetch_add(1, Ordering::SeqCst);
                None
            })
            .await;
        assert_eq!(second, Some(product));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_remember_json_replaces_undecodable_value() {
        let (facade, _) = test_facade(None);
        facade.set("product:1", "garbage", None).await.unwrap();

        let product = facade
            .remember_json("product:1", Duration::from_secs(60), || async {
                Some(Product {
                    id: 1,
                    name: "desk".to_string(),
                })
            })
            .await;

        assert_eq!(product.map(|p| p.name), Some("desk".to_string()));
        let cached: Option<Product> = facade.get_json("product:1").await.unwrap();
        assert_eq!(cached.map(|p| p.name), Some("desk".to_string()));
    }

    #[tokio::test]
    async fn test_delete_and_has() {
        let (facade, _) = test_facade(None);
        facade.set("k", "v", None).await.unwrap();

        assert!(facade.has("k").await.unwrap());
        assert_eq!(facade.delete("k").await.unwrap(), 1);
        assert!(!facade.has("k").await.unwrap());
        assert_eq!(facade.delete("k").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_hash_operations() {
        let (facade, store) = test_facade(Some("example.com"));

        assert!(facade.hset("user:1", "name", "ada").await.unwrap());
        assert!(facade.hset("user:1", "visits", 3_i64).await.unwrap());
        assert!(!facade.hset("user:1", "name", "grace").await.unwrap());

        assert_eq!(
            facade.hget("user:1", "name").await.unwrap().as_deref(),
            Some("grace")
        );
        assert!(facade.hexists("user:1", "name").await.unwrap());
        assert_eq!(facade.hgetall("user:1").await.unwrap().len(), 2);
        assert_eq!(facade.hvals("user:1").await.unwrap().len(), 2);
        assert_eq!(facade.hdel("user:1", "name").await.unwrap(), 1);
        assert!(!facade.hexists("user:1", "name").await.unwrap());

        assert!(store.exists("c75c5f:user:1").await.unwrap());
    }

    #[tokio::test]
    async fn test_counters() {
        let (facade, _) = test_facade(None);

        assert_eq!(facade.increment("counter", 1).await.unwrap(), 1);
        assert_eq!(facade.increment("counter", 5).await.unwrap(), 6);
        assert_eq!(facade.decrement("counter", 2).await.unwrap(), 4);
    }

    #[tokio::test]
    async fn test_concurrent_increments_from_independent_facades() {
        let store = MemoryStore::new(TEST_MAX_ENTRIES);

        let mut handles = Vec::new();
        for _ in 0..8 {
            // Each task gets its own facade over the shared store.
            let facade = CacheFacade::with_store(Arc::new(store.clone()), Some("example.com"));
            handles.push(tokio::spawn(async move {
                for _ in 0..100 {
                    facade.increment("hits", 1).await.unwrap();
                }
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let facade = CacheFacade::with_store(Arc::new(store), Some("example.com"));
        assert_eq!(
            facade.get("hits").await.unwrap(),
            Some(CacheValue::Structured(json!(800)))
        );
    }

    #[tokio::test]
    async fn test_counter_on_text_fails() {
        let (facade, _) = test_facade(None);
        facade.set("k", "abc", None).await.unwrap();

        assert!(matches!(
            facade.increment("k", 1).await,
            Err(CacheError::OperationFailed(_))
        ));
    }

    #[tokio::test]
    async fn test_delete_by_pattern_beyond_page_size() {
        let store = MemoryStore::new(TEST_MAX_ENTRIES);
        let facade = CacheFacade::with_store(Arc::new(store.clone()), Some("example.com"));
        let other = CacheFacade::with_store(Arc::new(store.clone()), Some("example.org"));

        for i in 0..1500 {
            facade.set(&format!("user:{}", i), "v", None).await.unwrap();
        }
        facade.set("post:1", "v", None).await.unwrap();
        other.set("user:1", "v", None).await.unwrap();

        let deleted = facade.delete_by_pattern("user:*").await.unwrap();

        assert_eq!(deleted, 1500);
        assert!(!facade.has("user:0").await.unwrap());
        assert!(!facade.has("user:1499").await.unwrap());
        assert!(facade.has("post:1").await.unwrap());
        assert!(other.has("user:1").await.unwrap());
        assert_eq!(store.len().await, 2);
    }

    #[tokio::test]
    async fn test_delete_by_pattern_no_matches() {
        let (facade, _) = test_facade(None);
        facade.set("post:1", "v", None).await.unwrap();

        assert_eq!(facade.delete_by_pattern("user:*").await.unwrap(), 0);
        assert!(facade.has("post:1").await.unwrap());
    }

    #[tokio::test]
    async fn test_flush_all_is_not_scoped_to_prefix() {
        let store = MemoryStore::new(TEST_MAX_ENTRIES);
        let facade = CacheFacade::with_store(Arc::new(store.clone()), Some("example.com"));
        let other = CacheFacade::with_store(Arc::new(store.clone()), Some("example.org"));

        facade.set("k", "mine", None).await.unwrap();
        other.set("k", "theirs", None).await.unwrap();

        facade.flush_all().await.unwrap();

        assert!(!facade.has("k").await.unwrap());
        assert!(!other.has("k").await.unwrap());
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_is_connected() {
        let (facade, _) = test_facade(None);
        assert!(facade.is_active());
        assert!(facade.is_connected().await);
    }

    #[tokio::test]
    async fn test_inert_facade_reports_unavailable() {
        let facade = CacheFacade::disabled(Some("example.com"));

        assert!(!facade.is_active());
        assert!(!facade.is_connected().await);
        assert_eq!(facade.prefix(), "c75c5f");

        assert_eq!(facade.get("k").await, Err(CacheError::Unavailable));
        assert_eq!(facade.set("k", "v", None).await, Err(CacheError::Unavailable));
        assert_eq!(facade.delete("k").await, Err(CacheError::Unavailable));
        assert_eq!(facade.has("k").await, Err(CacheError::Unavailable));
        assert_eq!(facade.hset("k", "f", "v").await, Err(CacheError::Unavailable));
        assert_eq!(facade.hgetall("k").await, Err(CacheError::Unavailable));
        assert_eq!(facade.increment("k", 1).await, Err(CacheError::Unavailable));
        assert_eq!(
            facade.delete_by_pattern("*").await,
            Err(CacheError::Unavailable)
        );
        assert_eq!(facade.flush_all().await, Err(CacheError::Unavailable));
    }

    #[tokio::test]
    async fn test_connect_inactive_never_connects() {
        // Nothing listens on port 1; an attempt would fail, not hang.
        let config = CacheConfig::new()
            .with_port(1)
            .with_active(false)
            .with_domain("example.com");

        let facade = CacheFacade::connect(&config).await;

        assert!(!facade.is_active());
        assert_eq!(facade.prefix(), "c75c5f");
    }

    #[tokio::test]
    async fn test_connect_failure_yields_inert_facade() {
        let config = CacheConfig::new().with_port(1);

        let facade = CacheFacade::connect(&config).await;

        assert!(!facade.is_active());
        assert!(!facade.is_connected().await);
        assert_eq!(facade.get("k").await, Err(CacheError::Unavailable));
    }
}
