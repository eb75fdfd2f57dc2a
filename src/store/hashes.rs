//! Hash map
//!
//! Nested key → (field → value) map with one RwLock over the whole
//! structure.

use std::collections::HashMap;

use bytes::Bytes;
use parking_lot::RwLock;

/// Key → (field → value) map
#[derive(Debug, Default)]
pub struct HashStore {
    data: RwLock<HashMap<Bytes, HashMap<Bytes, Bytes>>>,
}

impl HashStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set one field of a hash, creating the hash if needed (write lock)
    pub fn set(&self, key: Bytes, field: Bytes, value: Bytes) {
        self.data.write().entry(key).or_default().insert(field, value);
    }

    /// Get one field of a hash (read lock)
    pub fn get(&self, key: &[u8], field: &[u8]) -> Option<Bytes> {
        self.data.read().get(key)?.get(field).cloned()
    }

    /// Every field/value pair of a hash, or `None` if the hash is absent
    ///
    /// Pairs come back in no particular order.
    pub fn get_all(&self, key: &[u8]) -> Option<Vec<(Bytes, Bytes)>> {
        let data = self.data.read();
        let fields = data.get(key)?;
        Some(
            fields
                .iter()
                .map(|(field, value)| (field.clone(), value.clone()))
                .collect(),
        )
    }

    /// Delete the listed fields of a hash, returning how many existed
    ///
    /// A hash left without fields is removed.
    pub fn delete<F: AsRef<[u8]>>(&self, key: &[u8], fields: &[F]) -> usize {
        let mut data = self.data.write();
        let Some(hash) = data.get_mut(key) else {
            return 0;
        };

        let removed = fields
            .iter()
            .map(AsRef::<[u8]>::as_ref)
            .filter(|field| hash.remove(*field).is_some())
            .count();

        if hash.is_empty() {
            data.remove(key);
        }
        removed
    }

    /// Count how many of the listed fields exist in a hash (read lock)
    pub fn exists<F: AsRef<[u8]>>(&self, key: &[u8], fields: &[F]) -> usize {
        let data = self.data.read();
        match data.get(key) {
            Some(hash) => fields
                .iter()
                .map(AsRef::<[u8]>::as_ref)
                .filter(|field| hash.contains_key(*field))
                .count(),
            None => 0,
        }
    }

    /// Number of hashes
    pub fn len(&self) -> usize {
        self.data.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.read().is_empty()
    }
}
