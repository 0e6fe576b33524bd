//! Test utilities shared by unit tests
//!
//! A scripted transport standing in for the storefront, plus builders for
//! realistic search-result markup.

use std::collections::HashMap;
use std::io;
use std::sync::{Arc, Mutex};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use crate::domain::constants::PAGE_PARAM;
use crate::infrastructure::transport::{Transport, TransportError};

struct ScriptedResponse {
    result: Result<String, TransportError>,
    delay: Option<Duration>,
}

/// Transport answering from a per-page script.
///
/// The page number is read from the `page` query parameter (absent = 1).
/// Unscripted pages answer 404.
#[derive(Default)]
pub struct ScriptedTransport {
    responses: HashMap<u32, ScriptedResponse>,
    requests: Mutex<Vec<u32>>,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(self, page: u32, markup: impl Into<String>) -> Self {
        self.script(page, Ok(markup.into()), None)
    }

    pub fn page_with_delay(self, page: u32, markup: impl Into<String>, delay: Duration) -> Self {
        self.script(page, Ok(markup.into()), Some(delay))
    }

    pub fn failing_page(self, page: u32, status: u16) -> Self {
        let error = TransportError::from_status(
            status,
            &format!("https://www.amazon.com/s?page={page}"),
            "<html><body><p>Sorry! Something went wrong.</p></body></html>",
        );
        self.script(page, Err(error), None)
    }

    fn script(
        mut self,
        page: u32,
        result: Result<String, TransportError>,
        delay: Option<Duration>,
    ) -> Self {
        self.responses.insert(page, ScriptedResponse { result, delay });
        self
    }

    /// Pages requested so far, in request order
    pub fn requested_pages(&self) -> Vec<u32> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    /// Highest number of requests that were in flight at the same time
    pub fn peak_concurrency(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn get(&self, url: &str, params: &[(&str, String)]) -> Result<String, TransportError> {
        let page = params
            .iter()
            .find(|(key, _)| *key == PAGE_PARAM)
            .and_then(|(_, value)| value.parse().ok())
            .unwrap_or(1);

        self.requests.lock().unwrap().push(page);
        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(current, Ordering::SeqCst);

        let response = self.responses.get(&page);
        if let Some(delay) = response.and_then(|r| r.delay) {
            tokio::time::sleep(delay).await;
        } else {
            tokio::task::yield_now().await;
        }

        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        match response {
            Some(response) => response.result.clone(),
            None => Err(TransportError::from_status(404, url, "")),
        }
    }
}

/// In-memory log sink for asserting on what a code path logs.
///
/// Install with `tracing::subscriber::set_default(capture.subscriber())` on a
/// current-thread runtime so every event lands in the same buffer.
#[derive(Clone, Default)]
pub struct LogCapture(Arc<Mutex<Vec<u8>>>);

impl LogCapture {
    pub fn new() -> Self {
        Self::default()
    }

    /// Plain-text subscriber keeping `WARN` and above
    pub fn subscriber(&self) -> impl tracing::Subscriber + Send + Sync + use<> {
        let writer = self.clone();
        tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::WARN)
            .finish()
    }

    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl io::Write for LogCapture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// One listing container, every field optional so tests can drop them
#[derive(Debug, Clone)]
pub struct ListingFixture {
    pub id: String,
    pub image: Option<String>,
    pub brand: Option<String>,
    pub title: Option<String>,
    pub price: Option<String>,
    pub rating_label: Option<String>,
    pub reviews: Option<String>,
}

impl ListingFixture {
    /// Fully populated listing as shown on amazon.com
    pub fn english(id: &str) -> Self {
        Self {
            id: id.to_string(),
            image: Some(format!("https://m.media-amazon.com/images/I/{id}.jpg")),
            brand: Some("Acme Audio".to_string()),
            title: Some(format!("Wireless Headphones {id}, Black")),
            price: Some("$1,299.99".to_string()),
            rating_label: Some("4.5 out of 5 stars".to_string()),
            reviews: Some("(1,234)".to_string()),
        }
    }

    /// Fully populated listing as shown on amazon.it
    pub fn italian(id: &str) -> Self {
        Self {
            price: Some("1.299,99 €".to_string()),
            rating_label: Some("4,5 su 5 stelle".to_string()),
            reviews: Some("(1.234)".to_string()),
            ..Self::english(id)
        }
    }

    pub fn render(&self) -> String {
        let id = &self.id;
        let mut html = format!(
            r#"<div data-asin="{id}" data-index="1" data-component-type="s-search-result" class="s-result-item s-asin">
<div class="s-card-container">"#
        );

        if let Some(image) = &self.image {
            html.push_str(&format!(
                r#"<div class="s-product-image-container"><img class="s-image" src="{image}" alt=""></div>"#
            ));
        }
        if let Some(brand) = &self.brand {
            html.push_str(&format!(
                r#"<h2 class="a-size-mini s-line-clamp-1"><span class="a-size-base-plus a-color-base">{brand}</span></h2>"#
            ));
        }
        if let Some(title) = &self.title {
            html.push_str(&format!(
                r#"<h2 class="a-size-base-plus a-spacing-none a-color-base a-text-normal">
  <a class="a-link-normal s-link-style" href="/dp/{id}/ref=sr_1_1"><span>{title}</span></a>
</h2>"#
            ));
        }
        if let Some(label) = &self.rating_label {
            html.push_str(&format!(
                r#"<div class="a-row a-size-small"><span aria-label="{label}"><i class="a-icon a-icon-star-small"><span class="a-icon-alt">{label}</span></i></span>"#
            ));
            if let Some(reviews) = &self.reviews {
                html.push_str(&format!(
                    r#"<a class="a-link-normal s-underline-link-text" href="/dp/{id}/ref=sr_1_1#customerReviews"><span class="a-size-base s-underline-text">{reviews}</span></a>"#
                ));
            }
            html.push_str("</div>");
        } else if let Some(reviews) = &self.reviews {
            html.push_str(&format!(
                r#"<a href="/dp/{id}#customerReviews"><span class="a-size-base">{reviews}</span></a>"#
            ));
        }
        if let Some(price) = &self.price {
            html.push_str(&format!(
                r#"<a class="a-link-normal" href="/dp/{id}"><span class="a-price" data-a-size="xl"><span class="a-offscreen">{price}</span><span aria-hidden="true"><span class="a-price-whole">1</span></span></span></a>"#
            ));
        }

        html.push_str("</div></div>\n");
        html
    }
}

/// Whole results document with the given listing containers and, when
/// `total_pages` is set, a pagination strip advertising that many pages
pub fn results_page(listings: &[String], total_pages: Option<u32>) -> String {
    let mut html = String::from(
        r#"<!doctype html><html lang="en-us"><head><title>Amazon.com : headphones</title>
<script>window.ue_t0 = 1;</script></head><body>
<div class="s-main-slot s-result-list s-search-results">
"#,
    );

    for listing in listings {
        html.push_str(listing);
    }

    if let Some(total) = total_pages {
        html.push_str(&pagination_strip(total));
    }

    html.push_str("</div></body></html>");
    html
}

fn pagination_strip(total: u32) -> String {
    let mut strip = String::from(
        r#"<div class="s-pagination-container"><span class="s-pagination-strip">
<span class="s-pagination-item s-pagination-previous s-pagination-disabled">Previous</span>
<span class="s-pagination-item s-pagination-selected">1</span>"#,
    );
    if total > 2 {
        strip.push_str(r#"<a class="s-pagination-item s-pagination-button" href="/s?k=x&amp;page=2">2</a>"#);
        strip.push_str(r#"<span class="s-pagination-item s-pagination-ellipsis">...</span>"#);
    }
    if total > 1 {
        strip.push_str(&format!(
            r#"<span class="s-pagination-item s-pagination-disabled">{total}</span>
<a class="s-pagination-item s-pagination-next" href="/s?k=x&amp;page=2">Next</a>"#
        ));
    } else {
        strip.push_str(r#"<span class="s-pagination-item s-pagination-next s-pagination-disabled">Next</span>"#);
    }
    strip.push_str("</span></div>");
    strip
}

/// Identifier of listing `index` on result page `page`
pub fn listing_id(page: u32, index: usize) -> String {
    format!("B{page:03}{index:06}")
}

/// English results page `page` holding `count` listings
pub fn english_results_page(page: u32, count: usize, total_pages: Option<u32>) -> String {
    let listings: Vec<String> = (0..count)
        .map(|index| ListingFixture::english(&listing_id(page, index)).render())
        .collect();
    results_page(&listings, total_pages)
}
