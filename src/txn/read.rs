//! Read-only transactions

use bytes::Bytes;

use crate::context::Context;
use crate::error::Result;
use crate::snapshot::Snapshot;

use super::Cursor;

/// A read-only view of the store at one commit
#[derive(Debug, Clone)]
pub struct ReadTxn {
    snapshot: Snapshot,
    ctx: Context,
}

impl ReadTxn {
    pub(crate) fn new(snapshot: Snapshot, ctx: Context) -> Self {
        Self { snapshot, ctx }
    }

    /// Value stored under `key`, if any
    pub fn get(&self, key: &[u8]) -> Result<Option<Bytes>> {
        self.ctx.check()?;
        Ok(self.snapshot.get(key))
    }

    /// A cursor over this transaction's view
    pub fn cursor(&self) -> Cursor {
        Cursor::new(self.snapshot.clone())
    }

    /// Number of entries in this view
    pub fn len(&self) -> usize {
        self.snapshot.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshot.is_empty()
    }

    /// Sequence number of the commit this view reflects
    pub fn seq(&self) -> u64 {
        self.snapshot.seq()
    }

    pub fn context(&self) -> &Context {
        &self.ctx
    }

    pub(crate) fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }
}
