//! Application layer services implementing the cache-aside pipeline.
//!
//! Services consume the [`crate::domain::PageFetcher`] and
//! [`crate::infrastructure::cache::CacheService`] seams and provide a narrow
//! API for HTTP handlers and the admin CLI.
//!
//! # Available Services
//!
//! - [`services::aggregator::Aggregator`] - Concurrent page fan-out and flattening
//! - [`services::users_service::UsersService`] - Cache lookup, population and write-back

pub mod services;
