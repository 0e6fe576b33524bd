//! Application layer: search orchestration, memoization and result presentation.

pub mod presentation;
pub mod search_cache;
pub mod search_service;

pub use presentation::{
    HistogramBin, PriceFilterOutcome, PriceRange, TableRow, filter_by_price, parse_price_value,
    price_histogram,
};
pub use search_cache::SearchCache;
pub use search_service::{PageError, SearchError, SearchService};
