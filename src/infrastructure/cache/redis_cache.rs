//! Redis-backed cache implementation.

use super::service::{CacheError, CacheResult, CacheService};
use async_trait::async_trait;
use redis::{AsyncCommands, Client, aio::ConnectionManager};
use tracing::{debug, info, warn};

/// Redis store for the encoded user dataset.
///
/// Uses a single `ConnectionManager` created at startup and cloned per call;
/// the manager reconnects on its own after a dropped connection.
pub struct RedisCache {
    client: ConnectionManager,
}

impl RedisCache {
    /// Connects to Redis and validates the connection with a PING.
    ///
    /// # Arguments
    ///
    /// - `redis_url` - Redis connection string (e.g., `"redis://localhost:6379/0"`)
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::ConnectionError`] if the URL is invalid, the connection cannot
    /// be established, or the PING health check fails.
    pub async fn connect(redis_url: &str) -> CacheResult<Self> {
        info!("Connecting to Redis");

        let client = Client::open(redis_url).map_err(|e| {
            CacheError::ConnectionError(format!("Failed to create Redis client: {}", e))
        })?;

        let manager = ConnectionManager::new(client).await.map_err(|e| {
            CacheError::ConnectionError(format!("Failed to connect to Redis: {}", e))
        })?;

        let mut test_conn = manager.clone();
        test_conn
            .ping::<()>()
            .await
            .map_err(|e| CacheError::ConnectionError(format!("Redis PING failed: {}", e)))?;

        info!("✓ Connected to Redis");

        Ok(Self { client: manager })
    }
}

#[async_trait]
impl CacheService for RedisCache {
    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        let mut conn = self.client.clone();

        match conn.get::<_, Option<String>>(key).await {
            Ok(Some(value)) => {
                debug!("Redis GET {}: {} bytes", key, value.len());
                Ok(Some(value))
            }
            Ok(None) => {
                debug!("Redis GET {}: absent", key);
                Ok(None)
            }
            Err(e) => {
                warn!("Redis GET error for {}: {}", key, e);
                Err(CacheError::ConnectionError(format!("GET {}: {}", key, e)))
            }
        }
    }

    async fn set(&self, key: &str, value: &str) -> CacheResult<()> {
        let mut conn = self.client.clone();

        conn.set::<_, _, ()>(key, value).await.map_err(|e| {
            warn!("Redis SET error for {}: {}", key, e);
            CacheError::ConnectionError(format!("SET {}: {}", key, e))
        })?;

        debug!("Redis SET {}: {} bytes (no TTL)", key, value.len());
        Ok(())
    }

    async fn delete(&self, key: &str) -> CacheResult<bool> {
        let mut conn = self.client.clone();

        let deleted = conn.del::<_, i32>(key).await.map_err(|e| {
            warn!("Redis DEL error for {}: {}", key, e);
            CacheError::ConnectionError(format!("DEL {}: {}", key, e))
        })?;

        Ok(deleted > 0)
    }

    async fn health_check(&self) -> bool {
        let mut conn = self.client.clone();
        conn.ping::<()>().await.is_ok()
    }
}
