//! In-process cache implementation.

use super::service::{CacheResult, CacheService};
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::debug;

/// A cache kept in process memory.
///
/// Selected with `CACHE_BACKEND=memory`. Values are lost on restart and are not
/// shared between instances, so this is meant for local runs and tests.
pub struct MemoryCache {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryCache {
    /// Creates an empty MemoryCache.
    pub fn new() -> Self {
        debug!("Using MemoryCache (in-process store)");
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CacheService for MemoryCache {
    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> CacheResult<()> {
        self.entries
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn delete(&self, key: &str) -> CacheResult<bool> {
        Ok(self.entries.write().await.remove(key).is_some())
    }

    async fn health_check(&self) -> bool {
        true
    }
}
