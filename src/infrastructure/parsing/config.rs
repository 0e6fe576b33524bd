//! CSS selectors for search-result pages
//!
//! Centralized so a markup change on the storefront is a one-file update.

use serde::{Deserialize, Serialize};

/// Selectors and markers used by [`super::SearchResultParser`]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchResultSelectors {
    /// One element per listing
    pub container: String,

    /// Attribute on the container holding the ASIN
    pub id_attribute: String,

    /// Primary product image
    pub image: String,

    /// Title fragments joined into the description
    pub heading: String,

    /// Price block
    pub price: String,

    /// Display text inside the price block
    pub price_text: String,

    /// Candidates for the star-rating accessible label
    pub rating_label: String,

    /// Fallback element whose text is the rating label
    pub rating_text: String,

    /// Candidate anchors for the review count
    pub review_link: String,

    /// Link target suffix marking the reviews anchor
    pub review_anchor_suffix: String,

    /// Entries of the pagination control
    pub pagination_item: String,

    /// Present on the storefront's robot-check page
    pub robot_check: String,
}

impl Default for SearchResultSelectors {
    fn default() -> Self {
        Self {
            container: "div[data-component-type='s-search-result']".to_string(),
            id_attribute: "data-asin".to_string(),
            image: "img.s-image".to_string(),
            heading: "h2".to_string(),
            price: "span.a-price".to_string(),
            price_text: "span.a-offscreen".to_string(),
            rating_label: "[aria-label]".to_string(),
            rating_text: "span.a-icon-alt".to_string(),
            review_link: "a[href]".to_string(),
            review_anchor_suffix: "#customerReviews".to_string(),
            pagination_item: "span.s-pagination-item".to_string(),
            robot_check: "form[action*='validateCaptcha']".to_string(),
        }
    }
}
