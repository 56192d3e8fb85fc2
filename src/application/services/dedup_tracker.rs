use dashmap::DashSet;

use crate::domain::DocumentKey;

/// Keys of documents that completed successfully.
///
/// Entries are only added after a record reaches `COMPLETED` and are only
/// removed in bulk by [`DedupTracker::clear`].
#[derive(Debug, Default)]
pub struct DedupTracker {
    keys: DashSet<DocumentKey>,
}

impl DedupTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, key: &DocumentKey) -> bool {
        self.keys.contains(key)
    }

    pub fn mark_processed(&self, key: DocumentKey) {
        self.keys.insert(key);
    }

    /// Drops every entry and returns how many were held.
    pub fn clear(&self) -> usize {
        let cleared = self.keys.len();
        self.keys.clear();
        cleared
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}
