//! Fixed values shared across the search pipeline.

/// Hard ceiling on the number of result pages fetched for one search.
pub const MAX_PAGES_CEILING: u32 = 50;

/// Path of the search endpoint on every storefront.
pub const SEARCH_PATH: &str = "/s";

/// Query parameter carrying the search term.
pub const SEARCH_TERM_PARAM: &str = "k";

/// Query parameter carrying the 1-based result page number.
pub const PAGE_PARAM: &str = "page";

/// Path prefix of canonical product pages (`/dp/<ASIN>`).
pub const PRODUCT_PATH_PREFIX: &str = "/dp/";

/// Separator between the heading fragments that make up a description.
pub const DESCRIPTION_SEPARATOR: &str = ": ";
