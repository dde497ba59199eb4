//! Ordered cursor over a snapshot

use std::ops::Bound;

use bytes::Bytes;

use crate::snapshot::{Entry, Snapshot};

#[derive(Debug, Clone)]
enum Position {
    Unpositioned,
    At(Bytes),
    Exhausted,
}

/// A traversal position within one snapshot
///
/// Every move is a fresh ordered lookup relative to the last key returned,
/// so the cursor owns no borrow of the map and can be carried by iterators.
#[derive(Debug, Clone)]
pub struct Cursor {
    snapshot: Snapshot,
    position: Position,
}

impl Cursor {
    pub(crate) fn new(snapshot: Snapshot) -> Self {
        Self {
            snapshot,
            position: Position::Unpositioned,
        }
    }

    /// Move to the smallest key
    pub fn first(&mut self) -> Option<Entry> {
        self.land(self.snapshot.first_from(Bound::Unbounded))
    }

    /// Move to the first key >= `target`
    pub fn seek(&mut self, target: &[u8]) -> Option<Entry> {
        self.land(self.snapshot.first_from(Bound::Included(target)))
    }

    /// Move past the current key
    ///
    /// On an unpositioned cursor this is `first`.
    pub fn next_entry(&mut self) -> Option<Entry> {
        let found = match &self.position {
            Position::Unpositioned => self.snapshot.first_from(Bound::Unbounded),
            Position::At(key) => self.snapshot.first_from(Bound::Excluded(key.as_ref())),
            Position::Exhausted => None,
        };
        self.land(found)
    }

    /// Key the cursor currently rests on
    pub fn key(&self) -> Option<&[u8]> {
        match &self.position {
            Position::At(key) => Some(key.as_ref()),
            _ => None,
        }
    }

    fn land(&mut self, found: Option<Entry>) -> Option<Entry> {
        self.position = match &found {
            Some(entry) => Position::At(entry.key.clone()),
            None => Position::Exhausted,
        };
        found
    }
}
