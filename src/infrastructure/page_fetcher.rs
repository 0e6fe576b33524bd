//! # Search Page Fetcher
//!
//! Fetches the markup of one search-results page through the shared transport.
//! No retries: a failure goes straight back to the orchestrator.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::debug;

use crate::domain::constants::PAGE_PARAM;
use crate::infrastructure::transport::{Transport, TransportError};

#[derive(Clone)]
pub struct PageFetcher {
    transport: Arc<dyn Transport>,
    page_timeout: Option<Duration>,
}

impl PageFetcher {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            page_timeout: None,
        }
    }

    /// Bound each fetch by `timeout` in addition to the transport's own timeout
    #[must_use]
    pub const fn with_page_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.page_timeout = timeout;
        self
    }

    /// Fetch `url` with extra query parameters
    pub async fn fetch(&self, url: &str, params: &[(&str, String)]) -> Result<String, TransportError> {
        let start_time = Instant::now();

        let result = match self.page_timeout {
            Some(limit) => tokio::time::timeout(limit, self.transport.get(url, params))
                .await
                .unwrap_or_else(|_| {
                    Err(TransportError::Timeout {
                        url: url.to_string(),
                    })
                }),
            None => self.transport.get(url, params).await,
        };

        match &result {
            Ok(markup) => debug!(
                "Fetched {} {:?}: {} chars in {:?}",
                url,
                params,
                markup.len(),
                start_time.elapsed()
            ),
            Err(e) => debug!("Fetch of {} {:?} failed after {:?}: {}", url, params, start_time.elapsed(), e),
        }

        result
    }

    /// Fetch result page `page` of the search at `search_url`.
    /// Page 1 is the bare search URL; later pages add `page=<n>`.
    pub async fn fetch_page(&self, search_url: &str, page: u32) -> Result<String, TransportError> {
        if page <= 1 {
            self.fetch(search_url, &[]).await
        } else {
            self.fetch(search_url, &[(PAGE_PARAM, page.to_string())]).await
        }
    }
}
