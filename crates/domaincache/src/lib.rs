//! Domain-namespaced caching facade over a Redis-compatible store.
//!
//! ```no_run
//! use std::time::Duration;
//! use domaincache::{CacheConfig, CacheFacade};
//!
//! # async fn run() {
//! let config = CacheConfig::from_env().with_domain("https://www.example.com");
//! let cache = CacheFacade::connect(&config).await;
//!
//! let report = cache
//!     .remember("report:daily", Duration::from_secs(600), || async {
//!         Some(serde_json::json!({"visits": 42}))
//!     })
//!     .await;
//! # let _ = report;
//! # }
//! ```

pub mod config;
pub mod facade;
pub mod store;

pub use config::{CacheConfig, CONNECT_TIMEOUT};
pub use facade::{
    remember_ttl, CacheFacade, DEFAULT_REMEMBER_TTL, REMEMBER_TTL_MARGIN, SCAN_PAGE_SIZE,
};
pub use store::{MemoryStore, RedisStore};

pub use domaincache_core::cache::{
    namespace_prefix, CacheError, CacheValue, KeyValueStore, Result, ScanPage,
};
