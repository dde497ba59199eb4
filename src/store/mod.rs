//! Store Module
//!
//! The public face of CursorKV. Every operation is described by a small
//! builder (`set`, `get`, `remove`, `enumerate`) that accumulates a key and
//! options and runs once, inside its own transaction, when its terminal
//! method is called.
//!
//! ```no_run
//! use cursorkv::{Context, Store};
//!
//! # fn main() -> cursorkv::Result<()> {
//! let store = Store::new("test", "/tmp/example.db", 0o600)?;
//! let ctx = Context::background();
//!
//! store.set(&ctx).by_key("%s:name", ["first"]).string("value")?;
//! let value = store.get(&ctx).by_key("%s:name", ["first"]).string()?;
//! assert_eq!(value.as_deref(), Some("value"));
//!
//! store.enumerate(&ctx).by_prefix("%s:", ["first"]).visit(|entry| {
//!     println!("{:?} = {:?}", entry.key, entry.value);
//!     true
//! })?;
//! # Ok(())
//! # }
//! ```

mod enumerate;
mod get;
mod key_spec;
mod remove;
mod set;

pub use enumerate::{EntryIter, EnumerateOp};
pub use get::GetOp;
pub use remove::RemoveOp;
pub use set::SetOp;

use std::path::Path;
use std::sync::Arc;

use crate::config::StoreConfig;
use crate::context::Context;
use crate::engine::Engine;
use crate::error::Result;
use crate::txn::{ReadTxn, WriteTxn};

/// A named, file-backed ordered key-value store
///
/// Cloning is cheap; clones share one engine and may be used from many
/// threads at once.
#[derive(Clone)]
pub struct Store {
    engine: Arc<Engine>,
}

impl Store {
    /// Open or create the store file at `path`
    ///
    /// `mode` holds the permission bits used if the file has to be created.
    pub fn new(name: impl Into<String>, path: impl AsRef<Path>, mode: u32) -> Result<Self> {
        let config = StoreConfig::builder()
            .name(name)
            .path(path.as_ref())
            .mode(mode)
            .build();
        Self::open(config)
    }

    /// Open or create a store from a full configuration
    pub fn open(config: StoreConfig) -> Result<Self> {
        Ok(Self {
            engine: Arc::new(Engine::open(config)?),
        })
    }

    // =========================================================================
    // Operations
    // =========================================================================

    /// Describe a single-key write
    pub fn set(&self, ctx: &Context) -> SetOp<'_> {
        SetOp::new(self, ctx.clone())
    }

    /// Describe a single-key read
    pub fn get(&self, ctx: &Context) -> GetOp<'_> {
        GetOp::new(self, ctx.clone())
    }

    /// Describe a single-key delete
    pub fn remove(&self, ctx: &Context) -> RemoveOp<'_> {
        RemoveOp::new(self, ctx.clone())
    }

    /// Describe an ordered scan
    pub fn enumerate(&self, ctx: &Context) -> EnumerateOp<'_> {
        EnumerateOp::new(self, ctx.clone())
    }

    /// Run `f` against one consistent read-only view
    pub fn view<T, F>(&self, ctx: &Context, f: F) -> Result<T>
    where
        F: FnOnce(&ReadTxn) -> Result<T>,
    {
        let txn = self.engine.begin_read(ctx)?;
        f(&txn)
    }

    /// Run `f` in a write transaction: committed if `f` returns `Ok`,
    /// rolled back otherwise
    pub fn update<T, F>(&self, ctx: &Context, f: F) -> Result<T>
    where
        F: FnOnce(&mut WriteTxn<'_>) -> Result<T>,
    {
        let mut txn = self.engine.begin_write(ctx)?;
        match f(&mut txn) {
            Ok(value) => {
                txn.commit()?;
                Ok(value)
            }
            Err(e) => {
                txn.rollback();
                Err(e)
            }
        }
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Rewrite the backing file so it holds only live entries
    pub fn compact(&self, ctx: &Context) -> Result<()> {
        self.engine.compact(ctx)
    }

    /// Release the backing file without deleting it
    pub fn close(&self) -> Result<()> {
        self.engine.close()
    }

    /// Close the store and delete its backing file
    ///
    /// Callers must quiesce other users of the store first. Calling it a
    /// second time fails with `StoreError::Closed`.
    pub fn destroy(&self) -> Result<()> {
        self.engine.destroy()
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn name(&self) -> &str {
        self.engine.name()
    }

    pub fn path(&self) -> &Path {
        self.engine.path()
    }

    /// Number of stored entries
    pub fn len(&self, ctx: &Context) -> Result<usize> {
        Ok(self.engine.begin_read(ctx)?.len())
    }

    pub fn is_empty(&self, ctx: &Context) -> Result<bool> {
        Ok(self.len(ctx)? == 0)
    }

    /// Sequence number of the latest commit
    pub fn last_seq(&self) -> u64 {
        self.engine.last_seq()
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("name", &self.name())
            .field("path", &self.path())
            .finish()
    }
}
