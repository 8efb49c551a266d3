//! HTTP client for the paginated random-user provider.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tracing::debug;
use url::Url;

use crate::domain::entities::RawPage;
use crate::domain::page_fetcher::{FetchError, PageFetcher};

/// Fields requested from the provider via the `inc` query parameter.
pub const UPSTREAM_FIELDS: &str = "gender,name,location,login";

/// Fetches pages of users over HTTP.
///
/// Holds one `reqwest::Client` (and its connection pool) for the lifetime of
/// the process; clone the surrounding `Arc` rather than the client.
pub struct RandomUserClient {
    client: Client,
    base_url: Url,
}

impl RandomUserClient {
    /// Creates a client for the provider at `base_url`.
    ///
    /// `timeout` bounds each request end to end; `None` waits indefinitely.
    ///
    /// # Errors
    ///
    /// Returns an error if `base_url` does not parse or the TLS backend fails to initialize.
    pub fn new(base_url: &str, timeout: Option<Duration>) -> anyhow::Result<Self> {
        let base_url = Url::parse(base_url)?;

        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            base_url,
        })
    }

    /// Builds the request URL for one page.
    ///
    /// `noinfo` suppresses the provider's `info` block, which is never read.
    pub fn page_url(&self, page_size: usize, page_index: usize) -> Url {
        let mut url = self.base_url.clone();
        url.query_pairs_mut()
            .append_pair("results", &page_size.to_string())
            .append_pair("page", &page_index.to_string())
            .append_pair("inc", UPSTREAM_FIELDS)
            .append_key_only("noinfo");
        url
    }
}

#[async_trait]
impl PageFetcher for RandomUserClient {
    async fn fetch(&self, page_size: usize, page_index: usize) -> Result<RawPage, FetchError> {
        let url = self.page_url(page_size, page_index);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(FetchError::UpstreamStatus(status.as_u16()));
        }

        let page: RawPage = response.json().await.map_err(|e| {
            if e.is_decode() {
                FetchError::Decode(e.to_string())
            } else {
                FetchError::Transport(e.to_string())
            }
        })?;

        debug!(page = page_index, records = page.len(), "Fetched upstream page");

        Ok(page)
    }
}

impl std::fmt::Debug for RandomUserClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RandomUserClient")
            .field("base_url", &self.base_url.as_str())
            .finish()
    }
}
