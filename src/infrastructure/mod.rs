//! Infrastructure layer for external integrations.
//!
//! Concrete implementations of the seams the application layer depends on.
//!
//! # Modules
//!
//! - [`cache`] - Key/value store for the encoded dataset (Redis and in-memory)
//! - [`upstream`] - HTTP client for the paginated user provider

pub mod cache;
pub mod upstream;
