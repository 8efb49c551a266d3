//! Page source abstraction for the upstream user provider.

use async_trait::async_trait;

use crate::domain::entities::RawPage;

/// Errors that can occur while fetching a single page.
///
/// None of these are retried; the aggregator drops the page and carries on.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("Upstream transport error: {0}")]
    Transport(String),

    #[error("Upstream responded with status {0}")]
    UpstreamStatus(u16),

    #[error("Failed to decode upstream page: {0}")]
    Decode(String),
}

/// Retrieves one page of raw users from the upstream provider.
///
/// # Implementations
///
/// - [`crate::infrastructure::upstream::RandomUserClient`] - HTTP client for the provider
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetches `page_size` users at the 1-based `page_index`.
    ///
    /// # Errors
    ///
    /// - [`FetchError::Transport`] on connection or I/O failure
    /// - [`FetchError::UpstreamStatus`] on any non-200 response
    /// - [`FetchError::Decode`] when the body is not a valid page
    async fn fetch(&self, page_size: usize, page_index: usize) -> Result<RawPage, FetchError>;
}
