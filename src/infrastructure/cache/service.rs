//! Cache service trait and error types.

use async_trait::async_trait;
use std::fmt;

/// Errors that can occur during cache operations.
///
/// A missing key is not an error; see [`CacheService::get`].
#[derive(Debug)]
pub enum CacheError {
    ConnectionError(String),
}

impl fmt::Display for CacheError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::ConnectionError(e) => write!(f, "Cache connection error: {}", e),
        }
    }
}

impl std::error::Error for CacheError {}

/// Result type for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;

/// Key/value store holding the encoded user dataset.
///
/// Unlike a fail-open lookup cache, errors here are surfaced to the caller:
/// the cache is the system of record for a populated dataset, so a store
/// failure must fail the request rather than masquerade as a miss.
///
/// # Implementations
///
/// - [`crate::infrastructure::cache::RedisCache`] - Redis-backed store
/// - [`crate::infrastructure::cache::MemoryCache`] - In-process store
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CacheService: Send + Sync {
    /// Reads the value stored under `key`.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(value))` on hit
    /// - `Ok(None)` when the key is absent
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::ConnectionError`] if the store cannot be reached.
    async fn get(&self, key: &str) -> CacheResult<Option<String>>;

    /// Stores `value` under `key` with no expiration.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::ConnectionError`] if the store cannot be reached.
    async fn set(&self, key: &str, value: &str) -> CacheResult<()>;

    /// Removes `key`. Returns `true` if a value was present.
    ///
    /// Used by the admin CLI; the request path never deletes.
    async fn delete(&self, key: &str) -> CacheResult<bool>;

    /// Checks if the cache backend is reachable.
    ///
    /// Used by the health endpoint and `admin check`.
    async fn health_check(&self) -> bool;
}
