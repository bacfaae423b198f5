//! Redis [`KvStore`] implementation.
//!
//! Values are plain strings. Each value key `K` has a companion counter at
//! `K#version`; every write goes through a `MULTI` block or a Lua script
//! that updates both, so a compare-and-set is atomic on the server.

use async_trait::async_trait;
use redis::{aio::ConnectionManager, AsyncCommands, Client, Script};
use tracing::{debug, info};

use super::{Backend, KvStore, Versioned};
use crate::error::StoreResult;

const VERSION_SUFFIX: &str = "#version";

const COMPARE_AND_SET: &str = r"
local current = tonumber(redis.call('GET', KEYS[2]) or '0')
if current ~= tonumber(ARGV[1]) then
  return 0
end
redis.call('SET', KEYS[1], ARGV[2])
redis.call('INCR', KEYS[2])
return 1
";

const SET_IF_ABSENT: &str = r"
if redis.call('EXISTS', KEYS[1]) == 1 then
  return 0
end
redis.call('SET', KEYS[1], ARGV[1])
redis.call('INCR', KEYS[2])
return 1
";

/// Redis-backed store.
pub struct RedisStore {
    conn: ConnectionManager,
    compare_and_set: Script,
    set_if_absent: Script,
}

impl RedisStore {
    /// Connects to Redis.
    ///
    /// # Arguments
    /// * `url` - Redis connection URL (e.g., redis://localhost:6379)
    pub async fn connect(url: &str) -> StoreResult<Self> {
        let client = Client::open(url)?;
        let conn = ConnectionManager::new(client).await?;

        info!("Connected to Redis");

        Ok(Self {
            conn,
            compare_and_set: Script::new(COMPARE_AND_SET),
            set_if_absent: Script::new(SET_IF_ABSENT),
        })
    }

    fn version_key(key: &str) -> String {
        format!("{key}{VERSION_SUFFIX}")
    }
}

#[async_trait]
impl KvStore for RedisStore {
    async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let mut conn = self.conn.clone();
        let value: Option<String> = conn.get(key).await?;
        Ok(value)
    }

    async fn set(&self, key: &str, value: String) -> StoreResult<()> {
        let mut conn = self.conn.clone();
        redis::pipe()
            .atomic()
            .set(key, value)
            .ignore()
            .incr(Self::version_key(key), 1)
            .ignore()
            .query_async::<()>(&mut conn)
            .await?;

        debug!(key = %key, "Stored value in Redis");
        Ok(())
    }

    async fn delete(&self, key: &str) -> StoreResult<()> {
        let mut conn = self.conn.clone();
        redis::pipe()
            .atomic()
            .del(key)
            .ignore()
            .incr(Self::version_key(key), 1)
            .ignore()
            .query_async::<()>(&mut conn)
            .await?;

        debug!(key = %key, "Deleted value from Redis");
        Ok(())
    }

    async fn set_if_absent(&self, key: &str, value: String) -> StoreResult<bool> {
        let mut conn = self.conn.clone();
        let written: i32 = self
            .set_if_absent
            .key(key)
            .key(Self::version_key(key))
            .arg(value)
            .invoke_async(&mut conn)
            .await?;
        Ok(written == 1)
    }

    async fn get_versioned(&self, key: &str) -> StoreResult<Versioned> {
        let mut conn = self.conn.clone();
        let (value, version): (Option<String>, Option<u64>) = redis::cmd("MGET")
            .arg(key)
            .arg(Self::version_key(key))
            .query_async(&mut conn)
            .await?;

        Ok(Versioned {
            value,
            version: version.unwrap_or(0),
        })
    }

    async fn compare_and_set(
        &self,
        key: &str,
        expected_version: u64,
        value: String,
    ) -> StoreResult<bool> {
        let mut conn = self.conn.clone();
        let written: i32 = self
            .compare_and_set
            .key(key)
            .key(Self::version_key(key))
            .arg(expected_version)
            .arg(value)
            .invoke_async(&mut conn)
            .await?;

        if written == 0 {
            debug!(key = %key, expected_version, "Version mismatch");
        }
        Ok(written == 1)
    }

    fn backend(&self) -> Backend {
        Backend::Redis
    }

    async fn ping(&self) -> StoreResult<()> {
        let mut conn = self.conn.clone();
        let _: String = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(())
    }
}
