//! Prefix bounds
//!
//! A prefix `P` covers the half-open range `[P, upper(P))`. The upper bound
//! drops trailing `0xFF` bytes and increments the last remaining byte, so
//! `[0x01, 0xFF]` is bounded by `[0x02]`. An empty or all-`0xFF` prefix has
//! no finite upper bound.

use std::ops::Bound;

/// Smallest key strictly greater than every key starting with `prefix`
///
/// Returns `None` when no such key exists (empty or all-`0xFF` prefix).
pub fn prefix_upper_bound(prefix: &[u8]) -> Option<Vec<u8>> {
    let last = prefix.iter().rposition(|&b| b != 0xFF)?;
    let mut upper = prefix[..=last].to_vec();
    upper[last] += 1;
    Some(upper)
}

/// A byte prefix plus its precomputed upper bound
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrefixBound {
    prefix: Vec<u8>,
    upper: Option<Vec<u8>>,
}

impl PrefixBound {
    pub fn new(prefix: impl Into<Vec<u8>>) -> Self {
        let prefix = prefix.into();
        let upper = prefix_upper_bound(&prefix);
        Self { prefix, upper }
    }

    pub fn prefix(&self) -> &[u8] {
        &self.prefix
    }

    /// Exclusive end of the range
    pub fn upper(&self) -> Bound<&[u8]> {
        match &self.upper {
            Some(upper) => Bound::Excluded(upper.as_slice()),
            None => Bound::Unbounded,
        }
    }

    /// Byte-for-byte prefix match
    pub fn contains(&self, key: &[u8]) -> bool {
        key.starts_with(&self.prefix)
    }

    /// Where a scan over this prefix starts: the prefix itself, or `seek`
    /// when that lies further along
    pub fn start<'a>(&'a self, seek: Option<&'a [u8]>) -> &'a [u8] {
        match seek {
            Some(target) if target > self.prefix.as_slice() => target,
            _ => &self.prefix,
        }
    }
}
