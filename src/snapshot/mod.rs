//! Snapshot Module
//!
//! The committed contents of a store, as an immutable ordered map.
//!
//! ## Responsibilities
//! - Point lookups and ordered range access for readers
//! - Consistent point-in-time views: a reader keeps the map it started with
//! - Applying committed records to produce the next version
//!
//! ## Data Structure Choice
//! `Arc<BTreeMap<Bytes, Bytes>>`:
//! - Ordered keys (lexicographic over raw bytes)
//! - Taking a snapshot is one `Arc` clone
//! - A commit copies the map only while readers still hold the old one
//!   (`Arc::make_mut`), otherwise it mutates in place

mod table;

pub use table::Snapshot;

use bytes::Bytes;

/// A stored key-value pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub key: Bytes,
    pub value: Bytes,
}

impl Entry {
    pub fn new(key: impl Into<Bytes>, value: impl Into<Bytes>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}
