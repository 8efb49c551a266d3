//! Key/value store holding the encoded user dataset.
//!
//! Provides a [`CacheService`] trait with two implementations:
//! - [`RedisCache`] - Production Redis-backed store
//! - [`MemoryCache`] - In-process store for local runs and tests

mod memory_cache;
mod redis_cache;
mod service;

pub use memory_cache::MemoryCache;
pub use redis_cache::RedisCache;
pub use service::{CacheError, CacheResult, CacheService};

#[cfg(test)]
pub use service::MockCacheService;
