//! Snapshot implementation
//!
//! Copy-on-write BTreeMap shared between readers.

use std::collections::BTreeMap;
use std::ops::Bound;
use std::sync::Arc;

use bytes::Bytes;

use crate::log::{LogRecord, Operation};

use super::Entry;

/// One committed version of the store
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    data: Arc<BTreeMap<Bytes, Bytes>>,
    seq: u64,
}

impl Snapshot {
    /// Create a new empty snapshot
    pub fn new() -> Self {
        Self::default()
    }

    /// Sequence number of the commit this snapshot reflects
    pub fn seq(&self) -> u64 {
        self.seq
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn get(&self, key: &[u8]) -> Option<Bytes> {
        self.data.get(key).cloned()
    }

    /// First entry at or after `start`
    pub fn first_from(&self, start: Bound<&[u8]>) -> Option<Entry> {
        self.data
            .range::<[u8], _>((start, Bound::Unbounded))
            .next()
            .map(|(k, v)| Entry::new(k.clone(), v.clone()))
    }

    /// Number of keys in `[start, end)`-style bounds
    pub fn count_range(&self, start: Bound<&[u8]>, end: Bound<&[u8]>) -> usize {
        if is_empty_range(start, end) {
            return 0;
        }
        self.data.range::<[u8], _>((start, end)).count()
    }

    /// All entries in key order
    pub fn iter(&self) -> impl Iterator<Item = (&Bytes, &Bytes)> {
        self.data.iter()
    }

    /// Apply a committed record, producing the next version
    pub(crate) fn apply(&mut self, record: LogRecord) {
        let data = Arc::make_mut(&mut self.data);
        for op in record.ops {
            match op {
                Operation::Put { key, value } => {
                    data.insert(Bytes::from(key), Bytes::from(value));
                }
                Operation::Delete { key } => {
                    data.remove(key.as_slice());
                }
            }
        }
        self.seq = record.seq;
    }
}

/// `BTreeMap::range` panics on inverted bounds; those ranges are just empty
fn is_empty_range(start: Bound<&[u8]>, end: Bound<&[u8]>) -> bool {
    match (start, end) {
        (Bound::Included(s), Bound::Included(e)) => s > e,
        (Bound::Included(s), Bound::Excluded(e))
        | (Bound::Excluded(s), Bound::Included(e))
        | (Bound::Excluded(s), Bound::Excluded(e)) => s >= e,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn put(key: &[u8], value: &[u8]) -> Operation {
        Operation::Put {
            key: key.to_vec(),
            value: value.to_vec(),
        }
    }

    #[test]
    fn readers_keep_their_version() {
        let mut current = Snapshot::new();
        current.apply(LogRecord::new(1, vec![put(b"a", b"1")]));

        let reader = current.clone();
        current.apply(LogRecord::new(
            2,
            vec![put(b"b", b"2"), Operation::Delete { key: b"a".to_vec() }],
        ));

        assert_eq!(reader.seq(), 1);
        assert_eq!(reader.get(b"a"), Some(Bytes::from_static(b"1")));
        assert_eq!(reader.get(b"b"), None);

        assert_eq!(current.seq(), 2);
        assert_eq!(current.get(b"a"), None);
        assert_eq!(current.len(), 1);
    }

    #[test]
    fn first_from_respects_bounds() {
        let mut snap = Snapshot::new();
        snap.apply(LogRecord::new(1, vec![put(b"a", b"1"), put(b"c", b"3")]));

        let e = snap.first_from(Bound::Included(&b"b"[..])).unwrap();
        assert_eq!(e.key, Bytes::from_static(b"c"));
        let e = snap.first_from(Bound::Excluded(&b"a"[..])).unwrap();
        assert_eq!(e.key, Bytes::from_static(b"c"));
        assert!(snap.first_from(Bound::Excluded(&b"c"[..])).is_none());
    }

    #[test]
    fn inverted_range_counts_zero() {
        let mut snap = Snapshot::new();
        snap.apply(LogRecord::new(1, vec![put(b"a", b"1")]));
        assert_eq!(snap.count_range(Bound::Included(&b"z"[..]), Bound::Excluded(&b"b"[..])), 0);
        assert_eq!(snap.count_range(Bound::Included(&b"a"[..]), Bound::Excluded(&b"a"[..])), 0);
        assert_eq!(snap.count_range(Bound::Included(&b"a"[..]), Bound::Unbounded), 1);
    }
}
