//! Redis cache backend (the external store).
//!
//! Values are stored as JSON with `SET key value EX ttl`; Redis handles
//! expiry, so this backend never evicts explicitly.

use std::time::Duration;

use async_trait::async_trait;
use redis::AsyncCommands;
use redis::aio::MultiplexedConnection;

use super::CacheBackend;
use crate::{Error, Item};

/// Key read once at connect time to prove the server answers.
const PROBE_KEY: &str = "smallgiants:probe";

/// External cache backend over a multiplexed Redis connection.
#[derive(Clone)]
pub struct RedisBackend {
    conn: MultiplexedConnection,
}

impl RedisBackend {
    /// Connect and verify the server is reachable.
    pub async fn connect(url: &str) -> Result<Self, Error> {
        let client = redis::Client::open(url)?;
        let mut conn = client.get_multiplexed_async_connection().await?;
        let _: Option<Vec<u8>> = conn.get(PROBE_KEY).await?;
        Ok(Self { conn })
    }
}

#[async_trait]
impl CacheBackend for RedisBackend {
    fn name(&self) -> &'static str {
        "redis"
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<Item>>, Error> {
        let mut conn = self.conn.clone();
        let payload: Option<Vec<u8>> = conn.get(key).await?;
        payload
            .map(|bytes| serde_json::from_slice(&bytes))
            .transpose()
            .map_err(|e| Error::Cache(format!("corrupt cache payload: {e}")))
    }

    async fn set(&self, key: &str, items: &[Item], ttl: Duration) -> Result<(), Error> {
        let payload = serde_json::to_vec(items)?;
        let mut conn = self.conn.clone();
        conn.set_ex::<_, _, ()>(key, payload, ttl.as_secs().max(1)).await?;
        Ok(())
    }
}
