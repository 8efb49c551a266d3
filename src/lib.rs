//! # Users Cache
//!
//! Serves a bulk user dataset from a Redis cache, synthesizing it on a miss by
//! fetching every page of a paginated upstream provider concurrently.
//!
//! ## Architecture
//!
//! - **Domain Layer** ([`domain`]) - User entities and the page source trait
//! - **Application Layer** ([`application`]) - Aggregation and cache-aside orchestration
//! - **Infrastructure Layer** ([`infrastructure`]) - Redis/in-memory cache and the upstream HTTP client
//! - **API Layer** ([`api`]) - Axum handlers, DTOs, and middleware
//!
//! ## Request Flow
//!
//! 1. `GET /users` reads the dataset key from the cache store
//! 2. On hit, the cached JSON is returned unchanged
//! 3. On miss, all pages are fetched concurrently; failed pages are dropped
//! 4. Records are normalized, encoded as JSON, and written back before replying
//!
//! Cache store failures return 500. Upstream page failures never fail a request.
//!
//! ## Quick Start
//!
//! ```bash
//! export REDIS_URL="redis://localhost:6379/0"
//! cargo run
//! curl http://localhost:8080/users
//! ```
//!
//! ## Configuration
//!
//! Service configuration is loaded from environment variables via [`config::Config`].
//! See [`config`] module for available options.

pub mod api;
pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod state;
pub mod utils;

pub mod config;
pub mod server;

pub mod routes;

pub use error::AppError;
pub use state::AppState;

/// Commonly used types for external consumers.
///
/// Re-exports frequently used types to simplify imports for library users
/// and integration tests.
pub mod prelude {
    pub use crate::application::services::{
        AggregateReport, Aggregator, CacheStatus, DatasetSettings, UsersService,
    };
    pub use crate::domain::entities::{RawPage, RawUser, RecordSet, UserRecord};
    pub use crate::domain::{FetchError, PageFetcher};
    pub use crate::error::AppError;
    pub use crate::infrastructure::cache::{CacheError, CacheService, MemoryCache};
    pub use crate::state::AppState;
}
