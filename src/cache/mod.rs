use redis::{aio::MultiplexedConnection, AsyncCommands, Client};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, warn};

use crate::database::Database;

pub mod movies;
pub mod seats;

#[derive(Clone)]
pub struct RedisClient {
    pub conn: MultiplexedConnection,
}

impl RedisClient {
    pub async fn connect(redis_url: &str) -> redis::RedisResult<Self> {
        let client = Client::open(redis_url)?;
        let conn = client.get_multiplexed_tokio_connection().await?;
        Ok(RedisClient { conn })
    }
}

/// Read-through cache in front of Postgres.
///
/// Redis is optional. Without it, and whenever a Redis call fails, reads go
/// straight to the database and writes to the cache are skipped.
#[derive(Clone)]
pub struct CacheService {
    redis: Option<RedisClient>,
    db: Database,
}

impl CacheService {
    pub fn new(redis: Option<RedisClient>, db: Database) -> Self {
        Self { redis, db }
    }

    pub fn disabled(db: Database) -> Self {
        Self { redis: None, db }
    }

    async fn get_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let redis = self.redis.as_ref()?;
        let mut conn = redis.conn.clone();
        let data: Option<String> = match conn.get(key).await {
            Ok(data) => data,
            Err(e) => {
                warn!(key, error = %e, "Cache read failed");
                return None;
            }
        };
        match serde_json::from_str(&data?) {
            Ok(value) => {
                debug!(key, "Cache hit");
                Some(value)
            }
            Err(e) => {
                warn!(key, error = %e, "Discarding unreadable cache entry");
                None
            }
        }
    }

    async fn set_json<T: Serialize + ?Sized>(&self, key: &str, value: &T, ttl_seconds: u64) {
        let Some(redis) = self.redis.as_ref() else {
            return;
        };
        let data = match serde_json::to_string(value) {
            Ok(data) => data,
            Err(e) => {
                warn!(key, error = %e, "Cache serialize failed");
                return;
            }
        };
        let mut conn = redis.conn.clone();
        let result: redis::RedisResult<()> = conn.set_ex(key, data, ttl_seconds).await;
        if let Err(e) = result {
            warn!(key, error = %e, "Cache write failed");
        }
    }

    async fn delete(&self, key: &str) {
        let Some(redis) = self.redis.as_ref() else {
            return;
        };
        let mut conn = redis.conn.clone();
        let result: redis::RedisResult<()> = conn.del(key).await;
        if let Err(e) = result {
            warn!(key, error = %e, "Cache invalidation failed");
        }
    }
}
