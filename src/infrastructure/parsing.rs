//! HTML parsing for storefront search-result pages
//!
//! Selectors are configurable and compiled once per parser; locale-specific
//! text handling lives in pure functions so each storefront can be tested
//! on its own.

pub mod config;
pub mod context;
pub mod error;
pub mod locale;
pub mod search_result_parser;

// Re-export public types
pub use config::SearchResultSelectors;
pub use context::ParseContext;
pub use error::{ParsingError, ParsingResult};
pub use locale::{parse_rating_label, parse_review_count};
pub use search_result_parser::SearchResultParser;

use scraper::Html;

/// Parser that needs contextual information (page number, storefront)
pub trait ContextualParser {
    type Output;
    type Context;

    /// Parse HTML with contextual information
    fn parse_with_context(&self, html: &Html, context: &Self::Context) -> ParsingResult<Self::Output>;
}
