//! Store Module
//!
//! In-memory data for the server.
//!
//! ## Responsibilities
//! - String map: key → value
//! - Hash map: key → (field → value)
//! - Single-writer/multi-reader access per map
//!
//! ## Concurrency
//! Each map sits behind its own `parking_lot::RwLock`. Writers to one map
//! exclude each other and its readers; the two maps are independent, so
//! there is no ordering between a string write and a hash write.
//!
//! Keys, fields and values are binary safe (`Bytes`).

mod strings;
mod hashes;

pub use strings::StringStore;
pub use hashes::HashStore;

/// The two maps every command operates on
#[derive(Debug, Default)]
pub struct Store {
    strings: StringStore,
    hashes: HashStore,
}

impl Store {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// The string map
    pub fn strings(&self) -> &StringStore {
        &self.strings
    }

    /// The hash map
    pub fn hashes(&self) -> &HashStore {
        &self.hashes
    }

    /// True when neither map holds a key
    pub fn is_empty(&self) -> bool {
        self.strings.is_empty() && self.hashes.is_empty()
    }
}
