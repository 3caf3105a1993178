use crate::config::CacheSettings;
use redis::aio::ConnectionManager;
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur with cache operations
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Redis error: {0}")]
    RedisError(#[from] redis::RedisError),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Timed out connecting to Redis")]
    ConnectTimeout,
}

/// Two-tier cache for user records and the archive snapshot
///
/// L1 is a bounded in-process moka cache local to this instance. L2 is
/// Redis, shared by every instance and written through on `set`.
pub struct CacheManager {
    redis: Arc<tokio::sync::Mutex<ConnectionManager>>,
    l1_cache: moka::future::Cache<String, Arc<Vec<u8>>>,
    ttl_secs: u64,
}

impl CacheManager {
    pub async fn new(settings: &CacheSettings) -> Result<Self, CacheError> {
        let ttl_secs = settings.ttl_secs.unwrap_or(300);
        let connect_timeout = Duration::from_secs(settings.connection_timeout_secs.unwrap_or(5));

        let client = redis::Client::open(settings.redis_url.as_str())?;
        let redis = tokio::time::timeout(connect_timeout, ConnectionManager::new(client))
            .await
            .map_err(|_| CacheError::ConnectTimeout)??;

        let l1_cache = moka::future::CacheBuilder::new(settings.l1_cache_size.unwrap_or(10_000))
            .time_to_live(Duration::from_secs(settings.l1_ttl_secs.unwrap_or(ttl_secs)))
            .build();

        Ok(Self {
            redis: Arc::new(tokio::sync::Mutex::new(redis)),
            l1_cache,
            ttl_secs,
        })
    }

    /// Look a value up in L1, then L2; `None` on a miss in both
    pub async fn get<T>(&self, key: &str) -> Result<Option<T>, CacheError>
    where
        T: DeserializeOwned,
    {
        if let Some(bytes) = self.l1_cache.get(key).await {
            tracing::trace!("L1 cache hit: {}", key);
            return Ok(Some(serde_json::from_slice(&bytes)?));
        }

        let mut conn = self.redis.lock().await;
        let value: Option<Vec<u8>> = redis::cmd("GET")
            .arg(key)
            .query_async(&mut *conn)
            .await?;
        drop(conn);

        match value {
            Some(bytes) => {
                tracing::trace!("L2 cache hit: {}", key);
                let decoded = serde_json::from_slice(&bytes)?;
                self.l1_cache.insert(key.to_string(), Arc::new(bytes)).await;
                Ok(Some(decoded))
            }
            None => {
                tracing::trace!("Cache miss: {}", key);
                Ok(None)
            }
        }
    }

    /// Write through both tiers
    pub async fn set<T>(&self, key: &str, value: &T) -> Result<(), CacheError>
    where
        T: Serialize,
    {
        let bytes = serde_json::to_vec(value)?;

        let mut conn = self.redis.lock().await;
        redis::cmd("SETEX")
            .arg(key)
            .arg(self.ttl_secs)
            .arg(bytes.as_slice())
            .query_async::<()>(&mut *conn)
            .await?;
        drop(conn);

        self.l1_cache.insert(key.to_string(), Arc::new(bytes)).await;

        tracing::trace!("Cache set: {}", key);
        Ok(())
    }

    /// Remove keys from both tiers
    pub async fn delete(&self, keys: &[String]) -> Result<(), CacheError> {
        if keys.is_empty() {
            return Ok(());
        }
        for key in keys {
            self.l1_cache.invalidate(key).await;
        }

        let mut conn = self.redis.lock().await;
        redis::cmd("DEL")
            .arg(keys)
            .query_async::<()>(&mut *conn)
            .await?;

        tracing::debug!("Invalidated cache keys: {:?}", keys);
        Ok(())
    }
}

/// Cache key builder
pub struct CacheKey;

impl CacheKey {
    /// Snapshot of the whole users collection
    pub fn archive() -> String {
        "twinber:archive".to_string()
    }

    pub fn user_by_code(code: &str) -> String {
        format!("twinber:user:code:{}", code.to_uppercase())
    }

    pub fn user_by_uid(uid: &str) -> String {
        format!("twinber:user:uid:{}", uid)
    }
}
