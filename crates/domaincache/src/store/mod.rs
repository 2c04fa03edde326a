//! Store backends implementing `domaincache_core::cache::KeyValueStore`.
//!
//! - `redis_impl`: the production backend, talking to a Redis-compatible server
//! - `memory`: an in-process backend with matching semantics

pub mod memory;
pub mod redis_impl;

pub use memory::MemoryStore;
pub use redis_impl::RedisStore;
