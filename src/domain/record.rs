use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{Marketplace, SearchQuery};

/// One product listing extracted from a search-results page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Site-assigned identifier (ASIN), never empty
    pub id: String,
    #[serde(rename = "imageUrl", skip_serializing_if = "Option::is_none", default)]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub description: Option<String>,
    pub link: String,
    /// Advertised price as displayed, currency symbol and separators included
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub price: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub rating: Option<f64>,
    #[serde(rename = "reviewCount", skip_serializing_if = "Option::is_none", default)]
    pub review_count: Option<u64>,
}

impl Record {
    /// Create a record with only the identifier and its derived link set.
    pub fn new(id: impl Into<String>, marketplace: Marketplace) -> Self {
        let id = id.into();
        let link = marketplace.product_link(&id);
        Self {
            id,
            image_url: None,
            description: None,
            link,
            price: None,
            rating: None,
            review_count: None,
        }
    }
}

/// A page that contributed no records because fetching or parsing it failed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageFailure {
    pub page: u32,
    pub reason: String,
}

/// Ordered outcome of one search: page 1's records first, then page 2's, ...
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResults {
    pub query: SearchQuery,
    pub records: Vec<Record>,
    /// Page count advertised by the pagination control, before clamping
    #[serde(rename = "pagesDiscovered")]
    pub pages_discovered: u32,
    /// Pages actually requested
    #[serde(rename = "pagesFetched")]
    pub pages_fetched: u32,
    #[serde(rename = "failedPages")]
    pub failed_pages: Vec<PageFailure>,
    #[serde(rename = "completedAt")]
    pub completed_at: DateTime<Utc>,
}

impl SearchResults {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }

    /// True when at least one page was dropped
    pub fn is_partial(&self) -> bool {
        !self.failed_pages.is_empty()
    }
}

impl<'a> IntoIterator for &'a SearchResults {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
