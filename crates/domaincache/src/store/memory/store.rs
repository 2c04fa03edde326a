//! In-memory store implementation with LRU eviction.
//!
//! Provides a thread-safe in-process store with TTL support using tokio
//! synchronization primitives and an LRU eviction policy.
//!
//! This implementation mirrors the Redis store behavior for consistency:
//! - Expired keys behave as absent and are dropped when touched
//! - `SCAN` walks keys by insertion sequence, so deleting keys between pages
//!   never makes a surviving key get skipped
//! - Type mismatches (string vs hash) fail like `WRONGTYPE`
//! - `INCRBY`/`DECRBY` keep an existing expiry

use std::collections::HashMap;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use lru::LruCache;
use tokio::sync::RwLock;

use domaincache_core::cache::{
    pattern_matches, CacheError, KeyValueStore, Result, ScanPage,
};

const WRONGTYPE: &str = "WRONGTYPE Operation against a key holding the wrong kind of value";
const NOT_AN_INTEGER: &str = "ERR value is not an integer or out of range";
const INVALID_EXPIRE: &str = "ERR invalid expire time in 'setex' command";

#[derive(Debug, Clone, PartialEq, Eq)]
enum StoredValue {
    String(String),
    Hash(HashMap<String, String>),
}

/// A single store entry with optional expiration.
#[derive(Debug, Clone)]
struct StoreEntry {
    value: StoredValue,
    expires_at: Option<Instant>,
    /// Insertion sequence number, used as the scan position.
    seq: u64,
}

impl StoreEntry {
    /// Returns true if this entry has expired.
    fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|exp| Instant::now() >= exp)
    }
}

#[derive(Debug)]
struct Inner {
    entries: LruCache<String, StoreEntry>,
    /// Next sequence number to hand out. Starts at 1 so `0` stays the
    /// "scan complete" cursor.
    next_seq: u64,
}

impl Inner {
    /// Returns a live entry, dropping it first if it has expired.
    fn live(&mut self, key: &str) -> Option<&mut StoreEntry> {
        if self.entries.peek(key).is_some_and(StoreEntry::is_expired) {
            self.entries.pop(key);
        }
        self.entries.get_mut(key)
    }

    /// Writes a value, keeping the scan position of an existing key.
    fn put(&mut self, key: &str, value: StoredValue, expires_at: Option<Instant>) {
        let existing = self.live(key).map(|entry| entry.seq);
        let seq = match existing {
            Some(seq) => seq,
            None => {
                let seq = self.next_seq;
                self.next_seq += 1;
                seq
            }
        };
        self.entries.put(
            key.to_string(),
            StoreEntry {
                value,
                expires_at,
                seq,
            },
        );
    }

    fn hash(&mut self, key: &str) -> Result<Option<&mut HashMap<String, String>>> {
        match self.live(key) {
            None => Ok(None),
            Some(StoreEntry {
                value: StoredValue::Hash(fields),
                ..
            }) => Ok(Some(fields)),
            Some(_) => Err(CacheError::OperationFailed(WRONGTYPE.to_string())),
        }
    }

    fn add(&mut self, key: &str, by: i64) -> Result<i64> {
        let (current, expires_at) = match self.live(key) {
            None => (0, None),
            Some(StoreEntry {
                value: StoredValue::String(s),
                expires_at,
                ..
            }) => {
                let current = s
                    .parse::<i64>()
                    .map_err(|_| CacheError::OperationFailed(NOT_AN_INTEGER.to_string()))?;
                (current, *expires_at)
            }
            Some(_) => return Err(CacheError::OperationFailed(WRONGTYPE.to_string())),
        };

        let next = current.checked_add(by).ok_or_else(|| {
            CacheError::OperationFailed("ERR increment or decrement would overflow".to_string())
        })?;
        self.put(key, StoredValue::String(next.to_string()), expires_at);
        Ok(next)
    }
}

/// In-memory store implementation with LRU eviction.
///
/// Thread-safe store using `Arc<RwLock<..>>` for concurrent access. Every
/// operation takes the write lock, which makes counters and hash updates
/// atomic the same way a single-threaded server would.
///
/// Clones share the same data, so several facades built over clones of one
/// `MemoryStore` behave like several clients of one database.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    inner: Arc<RwLock<Inner>>,
}

impl MemoryStore {
    /// Creates a new in-memory store with LRU eviction.
    ///
    /// # Arguments
    ///
    /// * `max_entries` - Maximum number of keys before LRU eviction kicks in.
    ///
    /// # Panics
    ///
    /// Panics if `max_entries` is 0.
    pub fn new(max_entries: usize) -> Self {
        let capacity = NonZeroUsize::new(max_entries).expect("max_entries must be > 0");
        Self {
            inner: Arc::new(RwLock::new(Inner {
                entries: LruCache::new(capacity),
                next_seq: 1,
            })),
        }
    }

    /// Number of live keys.
    pub async fn len(&self) -> usize {
        let inner = self.inner.read().await;
        inner
            .entries
            .iter()
            .filter(|(_, entry)| !entry.is_expired())
            .count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

/// Deadline for a `SETEX`-style TTL: whole seconds, never below one.
fn expiry(ttl: Duration) -> Result<Instant> {
    Instant::now()
        .checked_add(Duration::from_secs(ttl.as_secs().max(1)))
        .ok_or_else(|| CacheError::OperationFailed(INVALID_EXPIRE.to_string()))
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let mut inner = self.inner.write().await;
        match inner.live(key) {
            None => Ok(None),
            Some(StoreEntry {
                value: StoredValue::String(s),
                ..
            }) => Ok(Some(s.clone())),
            Some(_) => Err(CacheError::OperationFailed(WRONGTYPE.to_string())),
        }
    }

    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<()> {
        let expires_at = ttl.map(expiry).transpose()?;
        let mut inner = self.inner.write().await;
        inner.put(key, StoredValue::String(value.to_string()), expires_at);
        Ok(())
    }

    async fn del(&self, keys: &[String]) -> Result<u64> {
        let mut inner = self.inner.write().await;
        let mut removed = 0;
        for key in keys {
            if inner.live(key).is_some() {
                inner.entries.pop(key);
                removed += 1;
            }
        }
        Ok(removed)
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        let mut inner = self.inner.write().await;
        Ok(inner.live(key).is_some())
    }

    async fn ttl(&self, key: &str) -> Result<Option<Duration>> {
        let mut inner = self.inner.write().await;
        let remaining = inner
            .live(key)
            .and_then(|entry| entry.expires_at)
            .map(|exp| exp.saturating_duration_since(Instant::now()));

        // Whole seconds, rounded up, like the server reports them.
        Ok(remaining.map(|d| Duration::from_secs(d.as_millis().div_ceil(1000) as u64)))
    }

    async fn scan(&self, cursor: u64, pattern: &str, count: usize) -> Result<ScanPage> {
        let inner = self.inner.read().await;

        let mut candidates: Vec<(u64, &String, bool)> = inner
            .entries
            .iter()
            .filter(|(_, entry)| entry.seq >= cursor)
            .map(|(key, entry)| (entry.seq, key, entry.is_expired()))
            .collect();
        candidates.sort_unstable_by_key(|(seq, _, _)| *seq);

        let examined = &candidates[..candidates.len().min(count.max(1))];
        let keys = examined
            .iter()
            .filter(|(_, key, expired)| !expired && pattern_matches(pattern, key))
            .map(|(_, key, _)| (*key).clone())
            .collect();

        let cursor = if examined.len() < candidates.len() {
            examined.last().map_or(0, |(seq, _, _)| seq + 1)
        } else {
            0
        };

        Ok(ScanPage { cursor, keys })
    }

    async fn hset(&self, key: &str, field: &str, value: &str) -> Result<bool> {
        let mut inner = self.inner.write().await;
        if let Some(fields) = inner.hash(key)? {
            return Ok(fields.insert(field.to_string(), value.to_string()).is_none());
        }

        let fields = HashMap::from([(field.to_string(), value.to_string())]);
        inner.put(key, StoredValue::Hash(fields), None);
        Ok(true)
    }

    async fn hget(&self, key: &str, field: &str) -> Result<Option<String>> {
        let mut inner = self.inner.write().await;
        Ok(inner.hash(key)?.and_then(|fields| fields.get(field).cloned()))
    }

    async fn hdel(&self, key: &str, field: &str) -> Result<u64> {
        let mut inner = self.inner.write().await;
        let Some(fields) = inner.hash(key)? else {
            return Ok(0);
        };
        let removed = fields.remove(field).is_some();
        // The server drops a hash once its last field is gone.
        if fields.is_empty() {
            inner.entries.pop(key);
        }
        Ok(u64::from(removed))
    }

    async fn hexists(&self, key: &str, field: &str) -> Result<bool> {
        let mut inner = self.inner.write().await;
        Ok(inner
            .hash(key)?
            .is_some_and(|fields| fields.contains_key(field)))
    }

    async fn hgetall(&self, key: &str) -> Result<HashMap<String, String>> {
        let mut inner = self.inner.write().await;
        Ok(inner.hash(key)?.map(|fields| fields.clone()).unwrap_or_default())
    }

    async fn hvals(&self, key: &str) -> Result<Vec<String>> {
        let mut inner = self.inner.write().await;
        Ok(inner
            .hash(key)?
            .map(|fields| fields.values().cloned().collect())
            .unwrap_or_default())
    }

    async fn incr_by(&self, key: &str, by: i64) -> Result<i64> {
        let mut inner = self.inner.write().await;
        inner.add(key, by)
    }

    async fn decr_by(&self, key: &str, by: i64) -> Result<i64> {
        let by = by.checked_neg().ok_or_else(|| {
            CacheError::OperationFailed("ERR decrement would overflow".to_string())
        })?;
        let mut inner = self.inner.write().await;
        inner.add(key, by)
    }

    async fn flush_db(&self) -> Result<()> {
        let mut inner = self.inner.write().await;
        inner.entries.clear();
        Ok(())
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}
