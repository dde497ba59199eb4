//! Engine Module
//!
//! The storage engine behind a store: one backing file, one in-memory
//! snapshot, one writer lock.
//!
//! ## Responsibilities
//! - Open/create the backing file with the requested permission bits
//! - Replay the commit log on startup
//! - Hand out read and write transactions
//! - Compaction, close and destroy

use std::ffi::OsString;
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use parking_lot::{Mutex, MutexGuard, RwLock};

use crate::config::StoreConfig;
use crate::context::Context;
use crate::error::{Result, StoreError};
use crate::flock;
use crate::log::{LogRecord, LogRecovery, LogWriter, Operation};
use crate::snapshot::Snapshot;
use crate::txn::{ReadTxn, WriteTxn};

/// The storage engine
///
/// ## Concurrency Model: Single-Writer / Multiple-Reader (SWMR)
///
/// - **Writes** (commit/compact/close/destroy): serialized by `log`
///   - The mutex around the log writer *is* the writer lock
///   - A write transaction holds it from begin to commit/rollback
///
/// - **Reads**: never take the writer lock
///   - `snapshot` is read-locked just long enough to clone an `Arc`
///   - Each reader then works on its own immutable version
///
/// Closing or destroying while other calls are in flight is the caller's
/// problem: in-flight readers finish on their snapshot, later calls fail
/// with `Closed`.
pub struct Engine {
    /// Engine configuration
    config: StoreConfig,

    /// Commit log writer; `None` once closed. Doubles as the writer lock.
    log: Mutex<Option<LogWriter>>,

    /// Latest committed version
    snapshot: RwLock<Snapshot>,

    /// Set by close/destroy; checked before every transaction
    closed: AtomicBool,

    /// Set by destroy
    destroyed: AtomicBool,
}

impl Engine {
    /// Open or create an engine with the given config
    ///
    /// On startup:
    /// 1. Validate the config
    /// 2. Open/create the backing file (mode applied on creation) and lock it
    /// 3. Replay the commit log into a snapshot
    /// 4. Optionally compact
    pub fn open(config: StoreConfig) -> Result<Self> {
        config.validate()?;

        let mut file = open_store_file(&config.path, config.mode, false)?;

        let mut snapshot = Snapshot::new();
        let recovery = LogRecovery::replay(&mut file, |record| snapshot.apply(record))?;

        if recovery.truncated_bytes > 0 {
            tracing::warn!(
                store = %config.name,
                path = %config.path.display(),
                truncated_bytes = recovery.truncated_bytes,
                "discarded torn commit at end of log"
            );
        }
        tracing::debug!(
            store = %config.name,
            path = %config.path.display(),
            created = recovery.initialized,
            records = recovery.records_replayed,
            entries = snapshot.len(),
            seq = recovery.last_seq,
            "store opened"
        );

        let writer = LogWriter::new(file, recovery.valid_len, config.sync_strategy);
        let compact = config.compact_on_open && recovery.records_replayed > 1;

        let engine = Self {
            config,
            log: Mutex::new(Some(writer)),
            snapshot: RwLock::new(snapshot),
            closed: AtomicBool::new(false),
            destroyed: AtomicBool::new(false),
        };

        if compact {
            engine.compact(&Context::background())?;
        }

        Ok(engine)
    }

    /// Begin a read-only transaction on the latest committed version
    pub fn begin_read(&self, ctx: &Context) -> Result<ReadTxn> {
        ctx.check()?;
        self.ensure_open()?;
        let snapshot = self.snapshot.read().clone();
        Ok(ReadTxn::new(snapshot, ctx.clone()))
    }

    /// Begin a read-write transaction, waiting for the writer lock
    pub fn begin_write(&self, ctx: &Context) -> Result<WriteTxn<'_>> {
        ctx.check()?;
        self.ensure_open()?;
        let log = self.lock_writer(ctx)?;
        if log.is_none() {
            return Err(StoreError::Closed);
        }
        let base = self.snapshot.read().clone();
        Ok(WriteTxn::new(self, log, base, ctx.clone()))
    }

    /// Acquire the writer lock in slices, re-checking `ctx` in between
    fn lock_writer(&self, ctx: &Context) -> Result<MutexGuard<'_, Option<LogWriter>>> {
        let poll = self.config.lock_poll_interval;
        loop {
            let slice = ctx.remaining().map_or(poll, |left| left.min(poll));
            if let Some(guard) = self.log.try_lock_for(slice.max(Duration::from_millis(1))) {
                return Ok(guard);
            }
            ctx.check()?;
        }
    }

    /// Install a committed record as the latest version
    ///
    /// Called by `WriteTxn::commit` with the writer lock held.
    pub(crate) fn publish(&self, record: LogRecord) {
        self.snapshot.write().apply(record);
    }

    /// Rewrite the log as a single record holding the live entries
    ///
    /// The new log is written next to the old one and renamed over it, so
    /// a crash leaves either the old or the new file in place.
    pub fn compact(&self, ctx: &Context) -> Result<()> {
        ctx.check()?;
        self.ensure_open()?;
        let mut log = self.lock_writer(ctx)?;
        if log.is_none() {
            return Err(StoreError::Closed);
        }

        let snapshot = self.snapshot.read().clone();
        let ops = snapshot
            .iter()
            .map(|(key, value)| Operation::Put {
                key: key.to_vec(),
                value: value.to_vec(),
            })
            .collect();
        let record = LogRecord::new(snapshot.seq(), ops);

        let tmp_path = self.compaction_path();
        let mut file = open_store_file(&tmp_path, self.config.mode, true)?;
        let header_len = LogWriter::write_header(&mut file)?;
        let mut writer = LogWriter::new(file, header_len, self.config.sync_strategy);
        let before = log.as_ref().map_or(0, LogWriter::valid_len);
        let after = writer.append(&record)?;
        writer.sync()?;

        fs::rename(&tmp_path, &self.config.path)?;
        *log = Some(writer);

        tracing::info!(
            store = %self.config.name,
            entries = snapshot.len(),
            before_bytes = before,
            after_bytes = after,
            "log compacted"
        );
        Ok(())
    }

    /// Sync and release the backing file, keeping it on disk
    pub fn close(&self) -> Result<()> {
        let mut log = self.log.lock();
        let mut writer = log.take().ok_or(StoreError::Closed)?;
        self.closed.store(true, Ordering::Release);
        writer.sync()?;

        tracing::info!(store = %self.config.name, "store closed");
        Ok(())
    }

    /// Close the engine and delete the backing file
    ///
    /// A second call fails with `Closed`.
    pub fn destroy(&self) -> Result<()> {
        let mut log = self.log.lock();
        if self.destroyed.swap(true, Ordering::AcqRel) {
            return Err(StoreError::Closed);
        }
        self.closed.store(true, Ordering::Release);
        drop(log.take());
        *self.snapshot.write() = Snapshot::new();

        fs::remove_file(&self.config.path)?;

        tracing::info!(
            store = %self.config.name,
            path = %self.config.path.display(),
            "store destroyed"
        );
        Ok(())
    }

    fn ensure_open(&self) -> Result<()> {
        if self.closed.load(Ordering::Acquire) {
            return Err(StoreError::Closed);
        }
        Ok(())
    }

    fn compaction_path(&self) -> PathBuf {
        let mut name = OsString::from(self.config.path.as_os_str());
        name.push(".compact");
        PathBuf::from(name)
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn path(&self) -> &Path {
        &self.config.path
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Sequence number of the latest commit
    pub fn last_seq(&self) -> u64 {
        self.snapshot.read().seq()
    }

    /// Length of the backing log in bytes, `None` once closed
    pub fn log_len(&self) -> Option<u64> {
        self.log.lock().as_ref().map(LogWriter::valid_len)
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }
}

/// Open the backing file read-write, creating it with `mode` if missing,
/// and lock it for this engine
fn open_store_file(path: &Path, mode: u32, truncate: bool) -> Result<File> {
    let mut options = OpenOptions::new();
    options.read(true).write(true).create(true).truncate(truncate);

    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(mode);
    }
    #[cfg(not(unix))]
    let _ = mode;

    let file = options.open(path)?;
    flock::lock_exclusive(&file, path)?;
    Ok(file)
}
