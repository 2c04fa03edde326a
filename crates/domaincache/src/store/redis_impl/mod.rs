//! Redis store backend.
//!
//! Talks to a Redis-compatible server through the `redis` crate, either over
//! a single multiplexed connection or a reconnecting connection manager.

mod error;
mod store;

pub use store::RedisStore;
