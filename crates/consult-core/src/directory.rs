//! Searchable provider directory
//!
//! [`DirectoryFilter`] owns the current search query and a shared
//! [`ProviderCatalog`]. The visible list is recomputed on every read, so it
//! always reflects the latest query and never reorders the catalog.

use crate::provider::{Provider, ProviderCard, ProviderCatalog, ProviderId};

/// Search query plus the catalog it filters
#[derive(Debug, Clone)]
pub struct DirectoryFilter {
    catalog: ProviderCatalog,
    query: String,
    /// Lowercased copy of `query`, kept in step by `set_query`
    needle: String,
}

impl DirectoryFilter {
    /// Create a filter showing the whole catalog
    pub fn new(catalog: ProviderCatalog) -> Self {
        Self {
            catalog,
            query: String::new(),
            needle: String::new(),
        }
    }

    /// Replace the current query
    pub fn set_query(&mut self, text: impl Into<String>) {
        self.query = text.into();
        self.needle = self.query.to_lowercase();
        tracing::trace!("Directory query set to {:?}", self.query);
    }

    /// Reset to the empty query, restoring the full list
    pub fn clear_query(&mut self) {
        self.set_query(String::new());
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    /// Providers whose name or specialty contains the query, ignoring case,
    /// in catalog order
    pub fn visible_providers(&self) -> Vec<&Provider> {
        self.catalog
            .iter()
            .filter(|p| p.matches_lowercase(&self.needle))
            .collect()
    }

    /// Card view models for the visible providers
    pub fn visible_cards(&self) -> Vec<ProviderCard> {
        self.visible_providers()
            .into_iter()
            .map(ProviderCard::from)
            .collect()
    }

    /// Look up any catalog provider, visible or not
    pub fn provider(&self, id: ProviderId) -> Option<&Provider> {
        self.catalog.get(id)
    }

    pub fn catalog(&self) -> &ProviderCatalog {
        &self.catalog
    }
}

impl Default for DirectoryFilter {
    fn default() -> Self {
        Self::new(ProviderCatalog::seed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(filter: &DirectoryFilter) -> Vec<u32> {
        filter.visible_providers().iter().map(|p| p.id.0).collect()
    }

    #[test]
    fn empty_query_shows_everything_in_order() {
        let filter = DirectoryFilter::default();
        assert_eq!(ids(&filter), vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn matches_specialty_regardless_of_case() {
        let mut filter = DirectoryFilter::default();
        filter.set_query("NEURO");
        assert_eq!(ids(&filter), vec![2]);
    }

    #[test]
    fn matches_name() {
        let mut filter = DirectoryFilter::default();
        filter.set_query("wilson");
        assert_eq!(ids(&filter), vec![4]);
    }

    #[test]
    fn visible_cards_track_query() {
        let mut filter = DirectoryFilter::default();
        filter.set_query("ist");
        let cards = filter.visible_cards();
        // Cardiologist, Neurologist, Dermatologist, Psychiatrist
        assert_eq!(
            cards.iter().map(|c| c.id.0).collect::<Vec<_>>(),
            vec![1, 2, 3, 5]
        );
    }
}
