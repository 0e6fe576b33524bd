//! Pagination orchestrator
//!
//! Page 1 is fetched first because it advertises the page count. Its markup
//! is parsed once for both the count and its listings, so a search over P
//! pages issues exactly P requests. Pages 2..=P then run concurrently, bounded
//! by a semaphore, and are flattened back into page-number order.

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Context;
use chrono::Utc;
use futures::future::join_all;
use thiserror::Error;
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

use crate::application::search_cache::SearchCache;
use crate::domain::search_query::InvalidQuery;
use crate::domain::{Marketplace, PageFailure, Record, SearchQuery, SearchResults};
use crate::infrastructure::config::{AppConfig, PageFailurePolicy, SearchConfig};
use crate::infrastructure::http_client::HttpClient;
use crate::infrastructure::page_fetcher::PageFetcher;
use crate::infrastructure::parsing::{
    ParseContext, ParsingError, ParsingResult, SearchResultParser,
};
use crate::infrastructure::transport::{Transport, TransportError};

/// Why a single result page contributed no records
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PageError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Parsing(#[from] ParsingError),

    #[error("Page task ended abnormally: {0}")]
    Task(String),
}

#[derive(Error, Debug)]
pub enum SearchError {
    #[error(transparent)]
    InvalidQuery(#[from] InvalidQuery),

    /// The first page could not be fetched, so nothing is known about the search
    #[error("First results page could not be fetched: {0}")]
    Transport(#[from] TransportError),

    #[error("Results page {page} failed: {source}")]
    Page {
        page: u32,
        #[source]
        source: PageError,
    },
}

impl SearchError {
    /// Message suitable for showing to the person who ran the search
    pub fn user_message(&self) -> String {
        match self {
            Self::InvalidQuery(e) => format!("Invalid search: {e}"),
            Self::Transport(e)
            | Self::Page {
                source: PageError::Transport(e),
                ..
            } => e.user_message(),
            Self::Page { page, source } => format!("Results page {page} could not be read: {source}"),
        }
    }
}

type PageOutcome = (u32, Result<Vec<Record>, PageError>);

/// Runs searches against one storefront transport
pub struct SearchService {
    fetcher: PageFetcher,
    parser: Arc<SearchResultParser>,
    config: SearchConfig,
    cache: SearchCache,
}

impl SearchService {
    /// Create a service with the default selectors
    pub fn new(transport: Arc<dyn Transport>, config: SearchConfig) -> ParsingResult<Self> {
        let parser = SearchResultParser::new()?;
        Ok(Self::with_parser(transport, config, parser))
    }

    /// Create a service with a preconfigured parser; the extraction policy is
    /// taken from `config`
    pub fn with_parser(
        transport: Arc<dyn Transport>,
        config: SearchConfig,
        parser: SearchResultParser,
    ) -> Self {
        let fetcher = PageFetcher::new(transport)
            .with_page_timeout(config.page_timeout_seconds.map(Duration::from_secs));
        let parser = Arc::new(parser.with_policy(config.extraction_policy));

        Self {
            fetcher,
            parser,
            config,
            cache: SearchCache::new(),
        }
    }

    /// Build the HTTP transport and the service from the full application config
    pub fn from_app_config(config: &AppConfig) -> anyhow::Result<Self> {
        let client = HttpClient::new(config.http.clone()).context("Failed to build HTTP client")?;
        Self::new(Arc::new(client), config.search.clone())
            .context("Failed to compile search-result selectors")
    }

    pub const fn cache(&self) -> &SearchCache {
        &self.cache
    }

    /// Fetch every result page of `query` and return the listings in page order
    pub async fn search(&self, query: &SearchQuery) -> Result<SearchResults, SearchError> {
        let start_time = Instant::now();
        let search_url = query.search_url(self.config.base_url.as_deref())?.to_string();
        let marketplace = query.marketplace();

        info!("Searching '{}' on {} ({})", query.term(), marketplace, search_url);

        let first_markup = self.fetcher.fetch_page(&search_url, 1).await?;

        let (pages_discovered, first_page) = self
            .parser
            .analyze_first_page(&first_markup, &ParseContext::new(1, marketplace));
        let total_pages = pages_discovered.min(self.config.page_limit());

        if total_pages < pages_discovered {
            info!(
                "Storefront advertises {} pages, fetching the first {}",
                pages_discovered, total_pages
            );
        } else {
            debug!("Fetching {} result pages", total_pages);
        }

        let mut outcomes: Vec<PageOutcome> = Vec::with_capacity(total_pages as usize);
        outcomes.push((1, first_page.map_err(PageError::from)));
        outcomes.extend(
            self.collect_remaining_pages(&search_url, marketplace, total_pages)
                .await,
        );

        let (records, failed_pages) = self.merge_pages(outcomes)?;

        info!(
            "Search for '{}' finished: {} records from {} pages ({} failed) in {:?}",
            query.term(),
            records.len(),
            total_pages,
            failed_pages.len(),
            start_time.elapsed()
        );

        Ok(SearchResults {
            query: query.clone(),
            records,
            pages_discovered,
            pages_fetched: total_pages,
            failed_pages,
            completed_at: Utc::now(),
        })
    }

    /// Like [`Self::search`], but answers repeated queries from the cache.
    /// Only successful searches are remembered.
    pub async fn search_cached(&self, query: &SearchQuery) -> Result<Arc<SearchResults>, SearchError> {
        if let Some(hit) = self.cache.get(query).await {
            debug!("Cache hit for '{}' on {}", query.term(), query.marketplace());
            return Ok(hit);
        }

        let results = Arc::new(self.search(query).await?);
        self.cache.insert(query.clone(), Arc::clone(&results)).await;
        Ok(results)
    }

    /// Fetch and parse pages `2..=total_pages` concurrently.
    /// Outcomes come back in page order whatever order the tasks finish in.
    async fn collect_remaining_pages(
        &self,
        search_url: &str,
        marketplace: Marketplace,
        total_pages: u32,
    ) -> Vec<PageOutcome> {
        if total_pages < 2 {
            return Vec::new();
        }

        let max_concurrent = self.config.effective_concurrency();
        let semaphore = Arc::new(Semaphore::new(max_concurrent));
        let pages: Vec<u32> = (2..=total_pages).collect();

        debug!(
            "Spawning {} page tasks (max {} concurrent)",
            pages.len(),
            max_concurrent
        );

        let tasks: Vec<_> = pages
            .iter()
            .map(|&page| {
                let fetcher = self.fetcher.clone();
                let parser = Arc::clone(&self.parser);
                let semaphore = Arc::clone(&semaphore);
                let url = search_url.to_string();

                tokio::spawn(async move {
                    let _permit = semaphore
                        .acquire_owned()
                        .await
                        .map_err(|e| PageError::Task(e.to_string()))?;

                    let markup = fetcher.fetch_page(&url, page).await?;
                    let records = parser.extract(&markup, &ParseContext::new(page, marketplace))?;

                    debug!("Page {} yielded {} records (permit released)", page, records.len());
                    Ok::<Vec<Record>, PageError>(records)
                })
            })
            .collect();

        pages
            .into_iter()
            .zip(join_all(tasks).await)
            .map(|(page, joined)| {
                let outcome = joined.unwrap_or_else(|e| Err(PageError::Task(e.to_string())));
                (page, outcome)
            })
            .collect()
    }

    /// Flatten page outcomes in page order, applying the page failure policy
    fn merge_pages(
        &self,
        outcomes: Vec<PageOutcome>,
    ) -> Result<(Vec<Record>, Vec<PageFailure>), SearchError> {
        let mut records = Vec::new();
        let mut failed_pages = Vec::new();

        for (page, outcome) in outcomes {
            match outcome {
                Ok(page_records) => records.extend(page_records),
                Err(source) => match self.config.page_failure_policy {
                    PageFailurePolicy::Skip => {
                        warn!("Skipping results page {}: {}", page, source);
                        failed_pages.push(PageFailure {
                            page,
                            reason: source.to_string(),
                        });
                    }
                    PageFailurePolicy::Abort => {
                        return Err(SearchError::Page { page, source });
                    }
                },
            }
        }

        Ok((records, failed_pages))
    }
}
