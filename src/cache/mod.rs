// 读路径缓存
// 写操作之后按路径失效，缓存故障只记日志，不影响请求

use std::future::Future;

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;

pub mod keys;
pub mod operations;

pub use operations::RedisPathCache;

#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),
}

#[async_trait]
pub trait PathCache: Send + Sync {
    /// 读取某个路径下某个查询变体的缓存
    async fn get(&self, path: &str, variant: &str) -> Result<Option<String>, CacheError>;

    async fn put(&self, path: &str, variant: &str, body: &str) -> Result<(), CacheError>;

    /// 丢弃路径下所有变体
    async fn invalidate(&self, path: &str) -> Result<(), CacheError>;
}

/// 未配置 Redis 时使用
pub struct NoopPathCache;

#[async_trait]
impl PathCache for NoopPathCache {
    async fn get(&self, _path: &str, _variant: &str) -> Result<Option<String>, CacheError> {
        Ok(None)
    }

    async fn put(&self, _path: &str, _variant: &str, _body: &str) -> Result<(), CacheError> {
        Ok(())
    }

    async fn invalidate(&self, _path: &str) -> Result<(), CacheError> {
        Ok(())
    }
}

/// 依次失效多个路径
pub async fn revalidate_paths(cache: &dyn PathCache, paths: &[String]) {
    for path in paths {
        if let Err(e) = cache.invalidate(path).await {
            tracing::warn!("Failed to invalidate cached path {}: {}", path, e);
        }
    }
}

/// 先读缓存，未命中时执行 load 并回填
pub async fn read_through<T, E, Fut>(
    cache: &dyn PathCache,
    path: &str,
    variant: &str,
    load: Fut,
) -> Result<T, E>
where
    T: Serialize + DeserializeOwned,
    Fut: Future<Output = Result<T, E>>,
{
    match cache.get(path, variant).await {
        Ok(Some(body)) => match serde_json::from_str(&body) {
            Ok(value) => return Ok(value),
            Err(e) => tracing::warn!("Discarding undecodable cache entry for {}: {}", path, e),
        },
        Ok(None) => {}
        Err(e) => tracing::warn!("Cache read failed for {}: {}", path, e),
    }

    let value = load.await?;

    match serde_json::to_string(&value) {
        Ok(body) => {
            if let Err(e) = cache.put(path, variant, &body).await {
                tracing::warn!("Cache write failed for {}: {}", path, e);
            }
        }
        Err(e) => tracing::warn!("Failed to encode cache entry for {}: {}", path, e),
    }

    Ok(value)
}
