//! String map
//!
//! HashMap-based key → value map with RwLock for concurrency.

use std::collections::HashMap;

use bytes::Bytes;
use parking_lot::RwLock;

/// Key → value map
#[derive(Debug, Default)]
pub struct StringStore {
    data: RwLock<HashMap<Bytes, Bytes>>,
}

impl StringStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a key, replacing any previous value (write lock)
    pub fn set(&self, key: Bytes, value: Bytes) {
        self.data.write().insert(key, value);
    }

    /// Get a value by key (read lock)
    pub fn get(&self, key: &[u8]) -> Option<Bytes> {
        self.data.read().get(key).cloned()
    }

    /// Delete every listed key, returning how many existed (write lock)
    pub fn delete<K: AsRef<[u8]>>(&self, keys: &[K]) -> usize {
        let mut data = self.data.write();
        keys.iter()
            .map(AsRef::<[u8]>::as_ref)
            .filter(|key| data.remove(*key).is_some())
            .count()
    }

    /// Count how many of the listed keys exist (read lock)
    ///
    /// A key listed twice counts twice.
    pub fn exists<K: AsRef<[u8]>>(&self, keys: &[K]) -> usize {
        let data = self.data.read();
        keys.iter()
            .map(AsRef::<[u8]>::as_ref)
            .filter(|key| data.contains_key(*key))
            .count()
    }

    pub fn len(&self) -> usize {
        self.data.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.read().is_empty()
    }
}
