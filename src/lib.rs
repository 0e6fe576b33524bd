//! ASearch - a better Amazon search
//!
//! Fetches paginated search results from an Amazon storefront, extracts the
//! listings into structured records and prepares them for price filtering,
//! tabular display and a price histogram.

// Module declarations
pub mod application;
pub mod domain;
pub mod infrastructure;

#[cfg(test)]
pub mod test_utils;

// Re-export the types most callers need
pub use application::{SearchCache, SearchError, SearchService};
pub use domain::{Marketplace, Record, SearchQuery, SearchResults};
pub use infrastructure::{HttpClient, Transport, TransportError};
