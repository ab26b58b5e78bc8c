//! Redis-backed store.
//!
//! [`RedisStore`] holds one synchronous connection behind a `Mutex`, so a
//! single handle can be shared across threads; commands from different
//! threads are serialized on that connection. Every method is exactly one
//! round-trip. Nothing is retried.

use std::sync::Mutex;
use std::time::Duration;

use tracing::{debug, info};

use crate::config::StoreConfig;
use crate::error::{StoreError, StoreResult};
use crate::traits::KeyValueStore;

/// A [`KeyValueStore`] talking to a Redis server.
pub struct RedisStore {
    url: String,
    conn: Mutex<redis::Connection>,
}

impl RedisStore {
    /// Connect using the given configuration.
    ///
    /// Fails with [`StoreError::Unavailable`] if the server cannot be
    /// reached within the configured timeout, and with
    /// [`StoreError::Config`] if the URL is malformed.
    pub fn connect(config: &StoreConfig) -> StoreResult<Self> {
        config.validate()?;
        let client = redis::Client::open(config.url.as_str())
            .map_err(|e| StoreError::from_redis(e, &config.url, "url"))?;
        let conn = client
            .get_connection_with_timeout(config.connect_timeout())
            .map_err(|e| StoreError::from_redis(e, &config.url, "url"))?;
        info!(url = %config.url, "connected to redis");
        Ok(Self {
            url: config.url.clone(),
            conn: Mutex::new(conn),
        })
    }

    /// The URL this store is connected to.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Run one command against `key`, whose value the command expects to be
    /// of type `expected`.
    fn query<T: redis::FromRedisValue>(
        &self,
        cmd: &redis::Cmd,
        key: &str,
        expected: &'static str,
    ) -> StoreResult<T> {
        let mut conn = self.conn.lock().expect("lock poisoned");
        cmd.query(&mut *conn)
            .map_err(|e| StoreError::from_redis(e, key, expected))
    }
}

impl KeyValueStore for RedisStore {
    fn set(&self, key: &str, value: &[u8]) -> StoreResult<()> {
        debug!(key, len = value.len(), "SET");
        self.query(redis::cmd("SET").arg(key).arg(value), key, "string")
    }

    fn get(&self, key: &str) -> StoreResult<Option<Vec<u8>>> {
        self.query(redis::cmd("GET").arg(key), key, "string")
    }

    fn set_with_expiration(&self, key: &str, value: &[u8], ttl: Duration) -> StoreResult<()> {
        let secs = ttl.as_secs();
        if secs == 0 {
            return Err(StoreError::InvalidExpiration(ttl));
        }
        debug!(key, ttl_secs = secs, "SETEX");
        self.query(redis::cmd("SETEX").arg(key).arg(secs).arg(value), key, "string")
    }

    fn increment(&self, key: &str) -> StoreResult<i64> {
        let value: i64 = self.query(redis::cmd("INCR").arg(key), key, "string")?;
        debug!(key, value, "INCR");
        Ok(value)
    }

    fn append_to_list(&self, key: &str, value: &[u8]) -> StoreResult<usize> {
        let len: usize = self.query(redis::cmd("RPUSH").arg(key).arg(value), key, "list")?;
        debug!(key, len, "RPUSH");
        Ok(len)
    }

    fn read_list_range(&self, key: &str, start: isize, end: isize) -> StoreResult<Vec<Vec<u8>>> {
        self.query(redis::cmd("LRANGE").arg(key).arg(start).arg(end), key, "list")
    }

    fn clear_all(&self) -> StoreResult<()> {
        info!(url = %self.url, "FLUSHDB");
        self.query(&redis::cmd("FLUSHDB"), "", "database")
    }

    fn delete(&self, key: &str) -> StoreResult<bool> {
        let removed: usize = self.query(redis::cmd("DEL").arg(key), key, "key")?;
        Ok(removed > 0)
    }

    fn exists(&self, key: &str) -> StoreResult<bool> {
        self.query(redis::cmd("EXISTS").arg(key), key, "key")
    }

    fn list_len(&self, key: &str) -> StoreResult<usize> {
        self.query(redis::cmd("LLEN").arg(key), key, "list")
    }
}

impl std::fmt::Debug for RedisStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisStore").field("url", &self.url).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unreachable_server_is_unavailable() {
        // Port 1 on localhost is never a Redis server.
        let config = StoreConfig::default()
            .with_url("redis://127.0.0.1:1/")
            .with_connect_timeout(Duration::from_millis(200));
        let err = RedisStore::connect(&config).unwrap_err();
        assert!(matches!(err, StoreError::Unavailable(_)));
    }

    #[test]
    fn zero_timeout_is_rejected_before_connecting() {
        let config = StoreConfig::default().with_connect_timeout(Duration::ZERO);
        assert!(matches!(
            RedisStore::connect(&config),
            Err(StoreError::Config(_))
        ));
    }

    #[test]
    fn malformed_url_is_config_error() {
        let config = StoreConfig::default().with_url("not a url");
        assert!(matches!(
            RedisStore::connect(&config),
            Err(StoreError::Config(_))
        ));
    }
}
