use crate::models::Mapping;
use std::collections::HashMap;

/// Backing storage for the short-link directory.
///
/// Implementations are not expected to synchronize themselves: the
/// [`Directory`](crate::directory::Directory) wraps its store in a single
/// reader/writer lock and only ever calls `insert` while holding it
/// exclusively.
pub trait LinkStore: Send + Sync {
    /// Look up a key. Returns a clone of the target if present.
    fn get(&self, key: &str) -> Option<String>;

    fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Insert a mapping, replacing any previous target for the same key.
    fn insert(&mut self, mapping: Mapping);

    /// Number of mappings currently stored.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// In-process store. Everything is lost when the process exits.
#[derive(Debug, Default)]
pub struct MemoryStore {
    links: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LinkStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.links.get(key).cloned()
    }

    fn contains(&self, key: &str) -> bool {
        self.links.contains_key(key)
    }

    fn insert(&mut self, mapping: Mapping) {
        self.links.insert(mapping.key, mapping.target);
    }

    fn len(&self) -> usize {
        self.links.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_store_is_empty() {
        let store = MemoryStore::new();
        assert!(store.is_empty());
        assert_eq!(store.get("anything"), None);
    }

    #[test]
    fn insert_then_get() {
        let mut store = MemoryStore::new();
        store.insert(Mapping::new("deadbeef", "http://example.com"));

        assert!(store.contains("deadbeef"));
        assert_eq!(store.get("deadbeef").as_deref(), Some("http://example.com"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn same_target_under_different_keys() {
        let mut store = MemoryStore::new();
        store.insert(Mapping::new("00000001", "http://example.com"));
        store.insert(Mapping::new("00000002", "http://example.com"));

        assert_eq!(store.len(), 2);
        assert_eq!(store.get("00000001"), store.get("00000002"));
    }
}
