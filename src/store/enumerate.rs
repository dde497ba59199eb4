//! Ordered scans
//!
//! ## Algorithm
//! 1. Begin a read transaction (one snapshot for the whole scan)
//! 2. Position the cursor: at the prefix, or at the seek target when that
//!    lies further along; with neither, at the first key
//! 3. Walk forward in key order, stopping at the first key that no longer
//!    starts with the prefix (every later key is greater, so none can match)
//! 4. Re-check the context before every step
//!
//! A seek target beyond the prefix range lands past it immediately and
//! yields nothing.

use std::iter::FusedIterator;
use std::ops::Bound;

use crate::context::Context;
use crate::error::Result;
use crate::key::{KeyArg, PrefixBound};
use crate::snapshot::Entry;
use crate::txn::{Cursor, ReadTxn};

use super::key_spec::KeySpec;
use super::Store;

/// A pending scan: optional prefix, seek target and limit, then a terminal
/// (`visit`, `iter` or `count`)
#[must_use = "an enumeration does nothing until `visit`, `iter` or `count` is called"]
pub struct EnumerateOp<'s> {
    store: &'s Store,
    ctx: Context,
    prefix: KeySpec,
    seek: KeySpec,
    limit: Option<usize>,
}

impl<'s> EnumerateOp<'s> {
    pub(crate) fn new(store: &'s Store, ctx: Context) -> Self {
        Self {
            store,
            ctx,
            prefix: KeySpec::Unset,
            seek: KeySpec::Unset,
            limit: None,
        }
    }

    /// Only keys starting with the formatted prefix
    pub fn by_prefix<'a, I, A>(mut self, template: &str, args: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: Into<KeyArg<'a>>,
    {
        self.prefix = KeySpec::template(template, args);
        self
    }

    /// Only keys starting with `prefix`
    pub fn by_raw_prefix(mut self, prefix: impl AsRef<[u8]>) -> Self {
        self.prefix = KeySpec::raw(prefix);
        self
    }

    /// Start at the first key >= the formatted target
    pub fn seek<'a, I, A>(mut self, template: &str, args: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: Into<KeyArg<'a>>,
    {
        self.seek = KeySpec::template(template, args);
        self
    }

    /// Start at the first key >= `target`
    pub fn by_raw_seek(mut self, target: impl AsRef<[u8]>) -> Self {
        self.seek = KeySpec::raw(target);
        self
    }

    /// Stop after `limit` entries
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Pull-style scan over one snapshot
    pub fn iter(self) -> Result<EntryIter> {
        let prefix = self.prefix.optional()?.map(PrefixBound::new);
        let seek = self.seek.optional()?;
        let txn = self.store.engine().begin_read(&self.ctx)?;
        Ok(EntryIter::new(txn, prefix, seek, self.limit))
    }

    /// Call `visitor` for each matching entry in key order until it returns
    /// `false`
    ///
    /// Entries handed out before an error stay handed out; the error only
    /// says the scan did not finish.
    pub fn visit<F>(self, mut visitor: F) -> Result<()>
    where
        F: FnMut(&Entry) -> bool,
    {
        for entry in self.iter()? {
            if !visitor(&entry?) {
                break;
            }
        }
        Ok(())
    }

    /// Number of matching entries, without materializing them
    pub fn count(self) -> Result<usize> {
        let prefix = self.prefix.optional()?.map(PrefixBound::new);
        let seek = self.seek.optional()?;
        let txn = self.store.engine().begin_read(&self.ctx)?;

        let start = match (&prefix, &seek) {
            (Some(bound), seek) => Bound::Included(bound.start(seek.as_deref())),
            (None, Some(target)) => Bound::Included(target.as_slice()),
            (None, None) => Bound::Unbounded,
        };
        let end = prefix.as_ref().map_or(Bound::Unbounded, PrefixBound::upper);

        let matched = txn.snapshot().count_range(start, end);
        Ok(self.limit.map_or(matched, |limit| matched.min(limit)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum IterState {
    Start,
    Running,
    Done,
}

/// Lazily yields the entries of a scan
///
/// Owns its read transaction, so the view stays fixed for the iterator's
/// lifetime and is released when it is dropped. After yielding an error
/// (cancellation) the iterator is exhausted.
pub struct EntryIter {
    txn: ReadTxn,
    cursor: Cursor,
    prefix: Option<PrefixBound>,
    seek: Option<Vec<u8>>,
    remaining: Option<usize>,
    state: IterState,
}

impl EntryIter {
    fn new(
        txn: ReadTxn,
        prefix: Option<PrefixBound>,
        seek: Option<Vec<u8>>,
        limit: Option<usize>,
    ) -> Self {
        let cursor = txn.cursor();
        Self {
            txn,
            cursor,
            prefix,
            seek,
            remaining: limit,
            state: IterState::Start,
        }
    }

    /// Sequence number of the snapshot being scanned
    pub fn seq(&self) -> u64 {
        self.txn.seq()
    }

    fn position(&mut self) -> Option<Entry> {
        match (&self.prefix, &self.seek) {
            (Some(bound), seek) => {
                let start = bound.start(seek.as_deref()).to_vec();
                self.cursor.seek(&start)
            }
            (None, Some(target)) => {
                let target = target.clone();
                self.cursor.seek(&target)
            }
            (None, None) => self.cursor.first(),
        }
    }
}

impl Iterator for EntryIter {
    type Item = Result<Entry>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.state == IterState::Done {
            return None;
        }
        if let Err(e) = self.txn.context().check() {
            self.state = IterState::Done;
            return Some(Err(e));
        }
        if self.remaining == Some(0) {
            self.state = IterState::Done;
            return None;
        }

        let found = match self.state {
            IterState::Start => {
                self.state = IterState::Running;
                self.position()
            }
            _ => self.cursor.next_entry(),
        };

        let entry = match found {
            Some(entry) => entry,
            None => {
                self.state = IterState::Done;
                return None;
            }
        };

        if let Some(bound) = &self.prefix {
            if !bound.contains(&entry.key) {
                self.state = IterState::Done;
                return None;
            }
        }

        if let Some(remaining) = self.remaining.as_mut() {
            *remaining -= 1;
        }
        Some(Ok(entry))
    }
}

impl FusedIterator for EntryIter {}
