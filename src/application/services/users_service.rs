//! Cache-aside orchestration for the bulk user dataset.

use std::sync::Arc;

use serde_json::json;
use tokio::sync::Mutex;
use tracing::{debug, error, info};

use crate::application::services::aggregator::Aggregator;
use crate::error::AppError;
use crate::infrastructure::cache::{CacheError, CacheService};
use crate::utils::record_codec;

/// Tunables for one dataset population cycle.
#[derive(Debug, Clone)]
pub struct DatasetSettings {
    pub cache_key: String,
    pub total_records: usize,
    pub per_page: usize,
    pub concurrency: usize,
    /// Serialize concurrent cache misses so only one of them aggregates.
    pub single_flight: bool,
}

/// How a payload was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    /// Served from the store without touching the upstream.
    Hit,
    /// Aggregated on this request and written back to the store.
    Populated,
}

impl CacheStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CacheStatus::Hit => "HIT",
            CacheStatus::Populated => "MISS",
        }
    }
}

/// Encoded dataset ready to be written to a response.
#[derive(Debug, Clone)]
pub struct UsersPayload {
    pub body: String,
    pub status: CacheStatus,
}

/// Serves the user dataset from cache, populating it on a miss.
///
/// # Flow
///
/// 1. `GET` the cache key; a hit is returned unchanged
/// 2. On a miss, aggregate all pages from the upstream
/// 3. Encode the records and `SET` them under the cache key
/// 4. Return the encoded payload
///
/// Cache store errors at step 1 or 3 fail the request. Upstream page errors never do.
pub struct UsersService {
    cache: Arc<dyn CacheService>,
    aggregator: Aggregator,
    settings: DatasetSettings,
    populate_lock: Mutex<()>,
}

impl UsersService {
    /// Creates a new users service.
    pub fn new(
        cache: Arc<dyn CacheService>,
        aggregator: Aggregator,
        settings: DatasetSettings,
    ) -> Self {
        Self {
            cache,
            aggregator,
            settings,
            populate_lock: Mutex::new(()),
        }
    }

    pub fn settings(&self) -> &DatasetSettings {
        &self.settings
    }

    /// Returns the encoded dataset, from cache when present.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Cache`] if the store fails on read or write.
    /// Returns [`AppError::Internal`] if the records cannot be encoded.
    pub async fn get_users(&self) -> Result<UsersPayload, AppError> {
        let key = &self.settings.cache_key;

        if let Some(body) = self.cache.get(key).await.map_err(read_error)? {
            debug!("Cache HIT: {}", key);
            metrics::counter!("users.cache.hit").increment(1);
            return Ok(UsersPayload {
                body,
                status: CacheStatus::Hit,
            });
        }

        debug!("Cache MISS: {}", key);
        metrics::counter!("users.cache.miss").increment(1);

        if !self.settings.single_flight {
            return self.populate().await;
        }

        let _guard = self.populate_lock.lock().await;

        // Another request may have populated the key while this one waited.
        if let Some(body) = self.cache.get(key).await.map_err(read_error)? {
            debug!("Cache populated by concurrent request: {}", key);
            return Ok(UsersPayload {
                body,
                status: CacheStatus::Hit,
            });
        }

        self.populate().await
    }

    /// Aggregates and stores the dataset regardless of what the cache holds.
    ///
    /// # Errors
    ///
    /// Same as [`Self::get_users`] minus the initial read.
    pub async fn populate(&self) -> Result<UsersPayload, AppError> {
        let settings = &self.settings;

        let report = self
            .aggregator
            .aggregate_all(
                settings.total_records,
                settings.per_page,
                settings.concurrency,
            )
            .await;

        let body = record_codec::encode(&report.records).map_err(|e| {
            error!("Error encoding users: {}", e);
            AppError::internal("Error encoding users", json!({ "reason": e.to_string() }))
        })?;

        self.cache
            .set(&settings.cache_key, &body)
            .await
            .map_err(|e| {
                AppError::cache(
                    "Error storing users in cache",
                    json!({ "reason": e.to_string() }),
                )
            })?;

        info!(
            key = %settings.cache_key,
            records = report.records.len(),
            pages_failed = report.pages_failed,
            "Cache populated"
        );

        Ok(UsersPayload {
            body,
            status: CacheStatus::Populated,
        })
    }
}

fn read_error(e: CacheError) -> AppError {
    AppError::cache(
        "Error fetching users from cache",
        json!({ "reason": e.to_string() }),
    )
}
