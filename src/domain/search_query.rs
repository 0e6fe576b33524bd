use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use crate::domain::Marketplace;
use crate::domain::constants::{SEARCH_PATH, SEARCH_TERM_PARAM};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidQuery {
    #[error("search term must not be empty")]
    EmptyTerm,

    #[error("invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}

/// What the user searched for and on which storefront. Also the cache key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SearchQuery {
    term: String,
    marketplace: Marketplace,
}

impl SearchQuery {
    pub fn new(term: &str, marketplace: Marketplace) -> Result<Self, InvalidQuery> {
        let term = term.trim();
        if term.is_empty() {
            return Err(InvalidQuery::EmptyTerm);
        }
        Ok(Self {
            term: term.to_string(),
            marketplace,
        })
    }

    pub fn term(&self) -> &str {
        &self.term
    }

    pub const fn marketplace(&self) -> Marketplace {
        self.marketplace
    }

    /// Canonical first-page search URL, `<base>/s?k=<term>`.
    ///
    /// `base_url` replaces the storefront root when set (used for proxies and tests).
    pub fn search_url(&self, base_url: Option<&str>) -> Result<Url, InvalidQuery> {
        let base = base_url.map_or_else(|| self.marketplace.base_url(), str::to_string);
        let mut url = Url::parse(&base).map_err(|e| InvalidQuery::InvalidBaseUrl {
            url: base.clone(),
            reason: e.to_string(),
        })?;
        url.set_path(SEARCH_PATH);
        url.query_pairs_mut()
            .clear()
            .append_pair(SEARCH_TERM_PARAM, &self.term);
        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_blank_terms() {
        assert_eq!(
            SearchQuery::new("   ", Marketplace::UnitedStates),
            Err(InvalidQuery::EmptyTerm)
        );
    }

    #[test]
    fn encodes_term_in_search_url() {
        let query = SearchQuery::new(" noise cancelling headphones ", Marketplace::Italy).unwrap();
        let url = query.search_url(None).unwrap();
        assert_eq!(url.as_str(), "https://www.amazon.it/s?k=noise+cancelling+headphones");
    }

    #[test]
    fn base_url_override_keeps_search_path() {
        let query = SearchQuery::new("usb c", Marketplace::UnitedStates).unwrap();
        let url = query.search_url(Some("http://127.0.0.1:8080")).unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:8080/s?k=usb+c");
    }
}
