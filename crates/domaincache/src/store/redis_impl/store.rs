//! Redis store implementation.
//!
//! Every trait method maps onto exactly one Redis command. AUTH and SELECT
//! are not issued by hand: the password and database index travel in the
//! connection info and the client performs them during the handshake (and
//! again after every reconnect, for the connection manager).

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use redis::aio::{ConnectionManager, MultiplexedConnection};
use redis::{ConnectionAddr, ConnectionInfo, FromRedisValue, RedisConnectionInfo};
use tokio::time::timeout;

use domaincache_core::cache::{CacheError, KeyValueStore, Result, ScanPage};

use super::error::map_redis_error;
use crate::config::{CacheConfig, CONNECT_TIMEOUT};

#[derive(Clone)]
enum Connection {
    /// Reconnects on its own when the socket drops.
    Managed(ConnectionManager),
    /// A single multiplexed socket; once it drops, commands fail.
    Multiplexed(MultiplexedConnection),
}

/// Redis-backed [`KeyValueStore`].
///
/// Cloning is cheap: clones share the underlying connection.
#[derive(Clone)]
pub struct RedisStore {
    conn: Connection,
}

impl RedisStore {
    /// Connects to the server described by `config`.
    ///
    /// `config.persistent` selects a reconnecting connection manager instead
    /// of a single multiplexed connection. The connection attempt is bounded
    /// by [`CONNECT_TIMEOUT`] and confirmed with a PING.
    ///
    /// # Errors
    ///
    /// Returns `CacheError::ConnectionFailed` if the server cannot be reached
    /// in time, and `CacheError::OperationFailed` if it rejects AUTH or SELECT.
    pub async fn connect(config: &CacheConfig) -> Result<Self> {
        let client = redis::Client::open(connection_info(config)).map_err(map_redis_error)?;

        let conn = if config.persistent {
            let manager = timeout(CONNECT_TIMEOUT, ConnectionManager::new(client))
                .await
                .map_err(|_| connect_timed_out(config))?
                .map_err(map_redis_error)?;
            Connection::Managed(manager)
        } else {
            let conn = timeout(CONNECT_TIMEOUT, client.get_multiplexed_async_connection())
                .await
                .map_err(|_| connect_timed_out(config))?
                .map_err(map_redis_error)?;
            Connection::Multiplexed(conn)
        };

        let store = Self { conn };
        store.ping().await?;
        Ok(store)
    }

    async fn query<T: FromRedisValue>(&self, cmd: &redis::Cmd) -> Result<T> {
        let result: redis::RedisResult<T> = match &self.conn {
            Connection::Managed(conn) => cmd.query_async(&mut conn.clone()).await,
            Connection::Multiplexed(conn) => cmd.query_async(&mut conn.clone()).await,
        };
        result.map_err(map_redis_error)
    }
}

fn connection_info(config: &CacheConfig) -> ConnectionInfo {
    ConnectionInfo {
        addr: ConnectionAddr::Tcp(config.host.clone(), config.port),
        redis: RedisConnectionInfo {
            db: config.database,
            password: config.password.clone(),
            ..Default::default()
        },
    }
}

fn connect_timed_out(config: &CacheConfig) -> CacheError {
    CacheError::ConnectionFailed(format!(
        "connecting to {} timed out after {:?}",
        config.address(),
        CONNECT_TIMEOUT
    ))
}

#[async_trait]
impl KeyValueStore for RedisStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        self.query(redis::cmd("GET").arg(key)).await
    }

    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<()> {
        match ttl {
            Some(duration) => {
                let seconds = duration.as_secs().max(1);
                self.query(redis::cmd("SETEX").arg(key).arg(seconds).arg(value))
                    .await
            }
            None => self.query(redis::cmd("SET").arg(key).arg(value)).await,
        }
    }

    async fn del(&self, keys: &[String]) -> Result<u64> {
        if keys.is_empty() {
            return Ok(0);
        }
        let mut cmd = redis::cmd("DEL");
        for key in keys {
            cmd.arg(key);
        }
        self.query(&cmd).await
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        let count: u64 = self.query(redis::cmd("EXISTS").arg(key)).await?;
        Ok(count > 0)
    }

    async fn ttl(&self, key: &str) -> Result<Option<Duration>> {
        // -2: no such key, -1: no expiry.
        let seconds: i64 = self.query(redis::cmd("TTL").arg(key)).await?;
        Ok(u64::try_from(seconds).ok().map(Duration::from_secs))
    }

    async fn scan(&self, cursor: u64, pattern: &str, count: usize) -> Result<ScanPage> {
        let (cursor, keys): (u64, Vec<String>) = self
            .query(
                redis::cmd("SCAN")
                    .arg(cursor)
                    .arg("MATCH")
                    .arg(pattern)
                    .arg("COUNT")
                    .arg(count),
            )
            .await?;
        Ok(ScanPage { cursor, keys })
    }

    async fn hset(&self, key: &str, field: &str, value: &str) -> Result<bool> {
        let added: u64 = self
            .query(redis::cmd("HSET").arg(key).arg(field).arg(value))
            .await?;
        Ok(added > 0)
    }

    async fn hget(&self, key: &str, field: &str) -> Result<Option<String>> {
        self.query(redis::cmd("HGET").arg(key).arg(field)).await
    }

    async fn hdel(&self, key: &str, field: &str) -> Result<u64> {
        self.query(redis::cmd("HDEL").arg(key).arg(field)).await
    }

    async fn hexists(&self, key: &str, field: &str) -> Result<bool> {
        self.query(redis::cmd("HEXISTS").arg(key).arg(field)).await
    }

    async fn hgetall(&self, key: &str) -> Result<HashMap<String, String>> {
        self.query(redis::cmd("HGETALL").arg(key)).await
    }

    async fn hvals(&self, key: &str) -> Result<Vec<String>> {
        self.query(redis::cmd("HVALS").arg(key)).await
    }

    async fn incr_by(&self, key: &str, by: i64) -> Result<i64> {
        self.query(redis::cmd("INCRBY").arg(key).arg(by)).await
    }

    async fn decr_by(&self, key: &str, by: i64) -> Result<i64> {
        self.query(redis::cmd("DECRBY").arg(key).arg(by)).await
    }

    async fn flush_db(&self) -> Result<()> {
        self.query(&redis::cmd("FLUSHDB")).await
    }

    async fn ping(&self) -> Result<()> {
        let _: String = self.query(&redis::cmd("PING")).await?;
        Ok(())
    }
}
