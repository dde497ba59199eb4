//! Read-write transactions

use std::collections::BTreeMap;

use bytes::Bytes;
use parking_lot::MutexGuard;

use crate::context::Context;
use crate::engine::Engine;
use crate::error::{Result, StoreError};
use crate::log::{LogRecord, LogWriter, Operation};
use crate::snapshot::Snapshot;

/// An exclusive read-write transaction
///
/// Holds the engine's writer lock for its whole life. Dropping it without
/// calling [`commit`](Self::commit) discards every pending write.
pub struct WriteTxn<'e> {
    engine: &'e Engine,
    log: MutexGuard<'e, Option<LogWriter>>,
    base: Snapshot,
    /// `None` marks a pending delete
    pending: BTreeMap<Bytes, Option<Bytes>>,
    ctx: Context,
}

impl<'e> WriteTxn<'e> {
    pub(crate) fn new(
        engine: &'e Engine,
        log: MutexGuard<'e, Option<LogWriter>>,
        base: Snapshot,
        ctx: Context,
    ) -> Self {
        Self {
            engine,
            log,
            base,
            pending: BTreeMap::new(),
            ctx,
        }
    }

    /// Value under `key` as this transaction sees it
    pub fn get(&self, key: &[u8]) -> Result<Option<Bytes>> {
        self.ctx.check()?;
        match self.pending.get(key) {
            Some(pending) => Ok(pending.clone()),
            None => Ok(self.base.get(key)),
        }
    }

    /// Insert or overwrite `key`
    pub fn put(&mut self, key: impl Into<Bytes>, value: impl Into<Bytes>) {
        self.pending.insert(key.into(), Some(value.into()));
    }

    /// Remove `key`, returning whether it was visible before
    pub fn delete(&mut self, key: impl Into<Bytes>) -> bool {
        let key = key.into();
        let existed = match self.pending.get(&key) {
            Some(pending) => pending.is_some(),
            None => self.base.get(&key).is_some(),
        };
        self.pending.insert(key, None);
        existed
    }

    /// Number of keys written or deleted so far
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub fn context(&self) -> &Context {
        &self.ctx
    }

    /// Make every pending write durable and visible, atomically
    ///
    /// The context is checked once before the record is written. After that
    /// point the commit runs to completion regardless of cancellation.
    /// Returns the sequence number of the resulting snapshot.
    pub fn commit(self) -> Result<u64> {
        let WriteTxn {
            engine,
            mut log,
            base,
            pending,
            ctx,
        } = self;

        if pending.is_empty() {
            return Ok(base.seq());
        }
        ctx.check()?;

        let writer = log.as_mut().ok_or(StoreError::Closed)?;
        let seq = base.seq() + 1;
        let ops: Vec<Operation> = pending
            .into_iter()
            .map(|(key, value)| match value {
                Some(value) => Operation::Put {
                    key: key.to_vec(),
                    value: value.to_vec(),
                },
                None => Operation::Delete { key: key.to_vec() },
            })
            .collect();
        let op_count = ops.len();
        let record = LogRecord::new(seq, ops);

        let log_len = writer.append(&record)?;

        // Release our handle on the old version so publishing can reuse it
        drop(base);
        engine.publish(record);

        tracing::debug!(store = %engine.name(), seq, ops = op_count, log_len, "commit");
        Ok(seq)
    }

    /// Discard every pending write
    pub fn rollback(self) {
        if !self.pending.is_empty() {
            tracing::trace!(store = %self.engine.name(), discarded = self.pending.len(), "rollback");
        }
    }
}
