//! In-memory store backend.
//!
//! Provides a thread-safe in-process store with the same observable
//! semantics as the Redis backend, for tests and single-process embedding.

mod store;

pub use store::MemoryStore;
