use std::collections::HashMap;

use crate::model::LocationMatch;

/// Session-scoped map from lowercased query text to search results.
///
/// Entries are written once and never evicted or replaced.
#[derive(Debug, Default)]
pub struct SearchCache {
    entries: HashMap<String, Vec<LocationMatch>>,
}

impl SearchCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn key(query: &str) -> String {
        query.to_lowercase()
    }

    pub fn get(&self, query: &str) -> Option<&[LocationMatch]> {
        self.entries.get(&Self::key(query)).map(Vec::as_slice)
    }

    /// Store results for `query` unless an entry already exists.
    pub fn insert(&mut self, query: &str, results: Vec<LocationMatch>) {
        self.entries.entry(Self::key(query)).or_insert(results);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
