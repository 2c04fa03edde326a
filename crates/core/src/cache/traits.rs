use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;

use super::Result;

/// One page of a cursor-based key scan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanPage {
    /// Cursor to pass to the next call; `0` means the scan is complete.
    pub cursor: u64,
    /// Keys matched in this page. May be empty even when `cursor != 0`.
    pub keys: Vec<String>,
}

/// The primitives of a networked key-value store the facade delegates to.
///
/// Keys passed here are already namespaced. Implementations own atomicity:
/// counters and hash mutations must be safe under concurrent callers.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Gets a string value (`GET`).
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Sets a string value, with expiry when `ttl` is given (`SET` / `SETEX`).
    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<()>;

    /// Deletes keys, returning how many existed (`DEL`).
    async fn del(&self, keys: &[String]) -> Result<u64>;

    /// Returns true if the key exists (`EXISTS`).
    async fn exists(&self, key: &str) -> Result<bool>;

    /// Returns the remaining time to live, `None` if the key is absent or
    /// has no expiry (`TTL`).
    async fn ttl(&self, key: &str) -> Result<Option<Duration>>;

    /// Scans one page of keys matching a glob pattern (`SCAN ... MATCH ... COUNT`).
    async fn scan(&self, cursor: u64, pattern: &str, count: usize) -> Result<ScanPage>;

    /// Sets a hash field, returning true if the field is new (`HSET`).
    async fn hset(&self, key: &str, field: &str, value: &str) -> Result<bool>;

    /// Gets a hash field (`HGET`).
    async fn hget(&self, key: &str, field: &str) -> Result<Option<String>>;

    /// Deletes a hash field, returning how many fields were removed (`HDEL`).
    async fn hdel(&self, key: &str, field: &str) -> Result<u64>;

    /// Returns true if the hash field exists (`HEXISTS`).
    async fn hexists(&self, key: &str, field: &str) -> Result<bool>;

    /// Returns every field and value of a hash (`HGETALL`).
    async fn hgetall(&self, key: &str) -> Result<HashMap<String, String>>;

    /// Returns every value of a hash (`HVALS`).
    async fn hvals(&self, key: &str) -> Result<Vec<String>>;

    /// Atomically adds `by` to an integer value (`INCRBY`).
    async fn incr_by(&self, key: &str, by: i64) -> Result<i64>;

    /// Atomically subtracts `by` from an integer value (`DECRBY`).
    async fn decr_by(&self, key: &str, by: i64) -> Result<i64>;

    /// Drops every key of the selected database (`FLUSHDB`).
    async fn flush_db(&self) -> Result<()>;

    /// Liveness probe (`PING`).
    async fn ping(&self) -> Result<()>;
}
