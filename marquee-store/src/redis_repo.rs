use async_trait::async_trait;
use marquee_core::repository::SeatCache;
use marquee_core::{CacheError, CacheResult};
use redis::AsyncCommands;
use std::time::Duration;
use tracing::debug;

#[derive(Clone)]
pub struct RedisClient {
    client: redis::Client,
}

fn cache_error(err: redis::RedisError) -> CacheError {
    CacheError::Unavailable(err.to_string())
}

/// Redis rejects `EX 0`; round sub-second TTLs up to one second.
fn ttl_secs(ttl: Duration) -> u64 {
    ttl.as_secs().max(1)
}

impl RedisClient {
    pub async fn new(connection_string: &str) -> Result<Self, redis::RedisError> {
        let client = redis::Client::open(connection_string)?;
        Ok(Self { client })
    }

    async fn connection(&self) -> CacheResult<redis::aio::MultiplexedConnection> {
        self.client
            .get_multiplexed_async_connection()
            .await
            .map_err(cache_error)
    }

    pub async fn ping(&self) -> CacheResult<()> {
        let mut conn = self.connection().await?;
        redis::cmd("PING")
            .query_async::<String>(&mut conn)
            .await
            .map_err(cache_error)?;
        Ok(())
    }
}

#[async_trait]
impl SeatCache for RedisClient {
    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        let mut conn = self.connection().await?;
        conn.get(key).await.map_err(cache_error)
    }

    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> CacheResult<()> {
        let mut conn = self.connection().await?;
        match ttl {
            Some(ttl) => conn.set_ex::<_, _, ()>(key, value, ttl_secs(ttl)).await,
            None => conn.set::<_, _, ()>(key, value).await,
        }
        .map_err(cache_error)
    }

    async fn set_if_absent(&self, key: &str, value: &str, ttl: Duration) -> CacheResult<bool> {
        let mut conn = self.connection().await?;

        // SET NX: Only set if key does not exist
        let result: Option<String> = redis::cmd("SET")
            .arg(key)
            .arg(value)
            .arg("NX")
            .arg("EX")
            .arg(ttl_secs(ttl))
            .query_async(&mut conn)
            .await
            .map_err(cache_error)?;

        Ok(result.is_some())
    }

    async fn delete(&self, key: &str) -> CacheResult<()> {
        let mut conn = self.connection().await?;
        let removed: i64 = conn.del(key).await.map_err(cache_error)?;
        debug!("DEL {} removed {} key(s)", key, removed);
        Ok(())
    }

    async fn delete_if_equals(&self, key: &str, expected: &str) -> CacheResult<bool> {
        let mut conn = self.connection().await?;
        let script = redis::Script::new(r#"
            if redis.call("GET", KEYS[1]) == ARGV[1] then
                return redis.call("DEL", KEYS[1])
            else
                return 0
            end
        "#);

        let removed: i64 = script
            .key(key)
            .arg(expected)
            .invoke_async(&mut conn)
            .await
            .map_err(cache_error)?;

        Ok(removed == 1)
    }
}
