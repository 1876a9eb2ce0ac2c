use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use redis::{AsyncCommands, Client as RedisClient};

use crate::cache::keys::page_key;
use crate::cache::{CacheError, PathCache};

/// 每个路径一个 hash，字段为查询变体
pub struct RedisPathCache {
    redis: Arc<RedisClient>,
    ttl: Duration,
}

impl RedisPathCache {
    pub fn new(redis: Arc<RedisClient>, ttl: Duration) -> Self {
        Self { redis, ttl }
    }
}

#[async_trait]
impl PathCache for RedisPathCache {
    async fn get(&self, path: &str, variant: &str) -> Result<Option<String>, CacheError> {
        let mut conn = self.redis.get_multiplexed_async_connection().await?;
        let result: Option<String> = conn.hget(page_key(path), variant).await?;
        Ok(result)
    }

    async fn put(&self, path: &str, variant: &str, body: &str) -> Result<(), CacheError> {
        let mut conn = self.redis.get_multiplexed_async_connection().await?;
        let key = page_key(path);

        let _: () = conn.hset(&key, variant, body).await?;
        // 整个路径共用一个过期时间
        let _: () = conn.expire(&key, self.ttl.as_secs() as i64).await?;

        Ok(())
    }

    async fn invalidate(&self, path: &str) -> Result<(), CacheError> {
        let mut conn = self.redis.get_multiplexed_async_connection().await?;
        let _: () = conn.del(page_key(path)).await?;
        tracing::debug!("Invalidated cached path {}", path);
        Ok(())
    }
}
