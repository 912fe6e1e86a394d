//! KeyDir implementation
//!
//! BTreeMap-backed index from key to record location.

use std::collections::btree_map::{self, BTreeMap};

use super::KeyDirEntry;

/// In-memory index of live keys
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyDir {
    entries: BTreeMap<String, KeyDirEntry>,
}

impl KeyDir {
    /// Create a new empty KeyDir
    pub fn new() -> Self {
        Self::default()
    }

    /// Location of the live record for `key`
    pub fn get(&self, key: &str) -> Option<&KeyDirEntry> {
        self.entries.get(key)
    }

    /// Point `key` at a new location, returning the entry it replaced
    pub fn insert(&mut self, key: String, entry: KeyDirEntry) -> Option<KeyDirEntry> {
        self.entries.insert(key, entry)
    }

    /// Drop `key` from the index, returning its last location
    pub fn remove(&mut self, key: &str) -> Option<KeyDirEntry> {
        self.entries.remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in key order
    pub fn iter(&self) -> btree_map::Iter<'_, String, KeyDirEntry> {
        self.entries.iter()
    }

    /// Live keys in sorted order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl<'a> IntoIterator for &'a KeyDir {
    type Item = (&'a String, &'a KeyDirEntry);
    type IntoIter = btree_map::Iter<'a, String, KeyDirEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
