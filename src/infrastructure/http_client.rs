//! HTTP client for storefront requests with optional pacing
//!
//! One client is built per process and shared read-only by every page
//! worker. Pacing uses a token bucket so workers wait for a slot
//! independently instead of queueing behind each other.

use std::num::NonZeroU32;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use governor::{
    Quota, RateLimiter,
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
};
use reqwest::{
    Client,
    header::{ACCEPT, ACCEPT_LANGUAGE, HeaderMap, HeaderValue},
};
use tracing::{debug, info};

pub use crate::infrastructure::config::HttpClientConfig;
use crate::infrastructure::transport::{Transport, TransportError};

/// Shared `reqwest` transport
pub struct HttpClient {
    client: Client,
    rate_limiter: Option<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>,
}

impl HttpClient {
    /// Create a new HTTP client with the given configuration
    pub fn new(config: HttpClientConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_str(&config.accept).context("Invalid Accept header")?,
        );
        headers.insert(
            ACCEPT_LANGUAGE,
            HeaderValue::from_str(&config.accept_language)
                .context("Invalid Accept-Language header")?,
        );

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(config.user_agent.as_str())
            .default_headers(headers)
            .cookie_store(true)
            .gzip(true)
            .brotli(true)
            .redirect(if config.follow_redirects {
                reqwest::redirect::Policy::limited(10)
            } else {
                reqwest::redirect::Policy::none()
            })
            .build()
            .context("Failed to create HTTP client")?;

        let rate_limiter = NonZeroU32::new(config.max_requests_per_second)
            .map(|rps| RateLimiter::direct(Quota::per_second(rps)));

        info!(
            "HTTP client ready (timeout {}s, pacing {})",
            config.timeout_seconds,
            rate_limiter
                .as_ref()
                .map_or_else(|| "off".to_string(), |_| format!("{} rps", config.max_requests_per_second))
        );

        Ok(Self {
            client,
            rate_limiter,
        })
    }

    fn request_error(url: &str, err: &reqwest::Error) -> TransportError {
        if err.is_timeout() {
            TransportError::Timeout {
                url: url.to_string(),
            }
        } else {
            TransportError::Request {
                url: url.to_string(),
                message: err.to_string(),
            }
        }
    }
}

#[async_trait]
impl Transport for HttpClient {
    async fn get(&self, url: &str, params: &[(&str, String)]) -> Result<String, TransportError> {
        if let Some(limiter) = &self.rate_limiter {
            limiter.until_ready().await;
        }

        debug!("HTTP GET {} {:?}", url, params);

        let response = self
            .client
            .get(url)
            .query(params)
            .send()
            .await
            .map_err(|e| Self::request_error(url, &e))?;

        let status = response.status();
        let final_url = response.url().to_string();

        if !status.is_success() {
            debug!("HTTP error {}: {}", status, final_url);
            // The status is what matters; an unreadable error body only costs the message
            let body = response.text().await.unwrap_or_default();
            return Err(TransportError::from_status(status.as_u16(), &final_url, &body));
        }

        let body = response
            .text()
            .await
            .map_err(|e| Self::request_error(&final_url, &e))?;

        debug!("Fetched {} ({} chars)", final_url, body.len());
        Ok(body)
    }
}
