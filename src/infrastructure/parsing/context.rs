//! Parsing context for search-result pages

use crate::domain::Marketplace;

/// Where the markup being parsed came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseContext {
    /// 1-based result page number
    pub page: u32,

    /// Storefront, decides link host and label languages
    pub marketplace: Marketplace,
}

impl ParseContext {
    pub const fn new(page: u32, marketplace: Marketplace) -> Self {
        Self { page, marketplace }
    }
}
