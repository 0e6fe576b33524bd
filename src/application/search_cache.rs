//! Process-lifetime memo of completed searches

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::debug;

use crate::domain::{SearchQuery, SearchResults};

/// Completed searches keyed by (term, marketplace).
///
/// Entries live until [`SearchCache::clear`]; nothing expires on its own.
#[derive(Debug, Default)]
pub struct SearchCache {
    entries: Mutex<HashMap<SearchQuery, Arc<SearchResults>>>,
}

impl SearchCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, query: &SearchQuery) -> Option<Arc<SearchResults>> {
        self.entries.lock().await.get(query).cloned()
    }

    pub async fn insert(&self, query: SearchQuery, results: Arc<SearchResults>) {
        debug!(
            "Caching {} records for '{}' on {}",
            results.len(),
            query.term(),
            query.marketplace()
        );
        self.entries.lock().await.insert(query, results);
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }

    pub async fn clear(&self) {
        self.entries.lock().await.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Marketplace;
    use chrono::Utc;

    fn results_for(query: &SearchQuery) -> Arc<SearchResults> {
        Arc::new(SearchResults {
            query: query.clone(),
            records: Vec::new(),
            pages_discovered: 1,
            pages_fetched: 1,
            failed_pages: Vec::new(),
            completed_at: Utc::now(),
        })
    }

    #[tokio::test]
    async fn entries_are_keyed_by_term_and_marketplace() {
        let cache = SearchCache::new();
        let us = SearchQuery::new("lamp", Marketplace::UnitedStates).unwrap();
        let it = SearchQuery::new("lamp", Marketplace::Italy).unwrap();

        cache.insert(us.clone(), results_for(&us)).await;

        assert!(cache.get(&us).await.is_some());
        assert!(cache.get(&it).await.is_none());
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn clear_drops_everything() {
        let cache = SearchCache::new();
        let query = SearchQuery::new("lamp", Marketplace::Germany).unwrap();
        cache.insert(query.clone(), results_for(&query)).await;

        cache.clear().await;

        assert!(cache.is_empty().await);
        assert!(cache.get(&query).await.is_none());
    }
}
