//! Domain layer: marketplaces, queries and extracted listing records.

pub mod constants;
pub mod marketplace;
pub mod record;
pub mod search_query;

pub use marketplace::{Marketplace, UnknownMarketplace};
pub use record::{PageFailure, Record, SearchResults};
pub use search_query::SearchQuery;
