//! Domain layer containing the user data model and its upstream contract.
//!
//! # Architecture
//!
//! - [`entities`] - Raw upstream shapes and the canonical [`entities::UserRecord`]
//! - [`page_fetcher`] - [`page_fetcher::PageFetcher`] trait implemented by the infrastructure layer
//!
//! The domain layer has no dependencies on infrastructure or presentation layers.

pub mod entities;
pub mod page_fetcher;

pub use page_fetcher::{FetchError, PageFetcher};
