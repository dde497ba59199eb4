//! # CursorKV
//!
//! An embedded, ordered, transactional key-value store with:
//! - Bucket-scoped keys built from printf-style templates
//! - Prefix-bounded, seekable cursor scans in raw byte order
//! - Single-writer/multi-reader transactions with snapshot isolation
//! - A single checksummed, append-only backing file
//! - Cancellation contexts on every operation
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                          Store                               │
//! │        set / get / remove / enumerate  (op builders)         │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │  key templates → raw keys
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                       Transactions                           │
//! │         ReadTxn (snapshot)   WriteTxn (writer lock)          │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!          ┌────────────┴────────────┐
//!          │                         │
//!          ▼                         ▼
//!   ┌─────────────┐          ┌─────────────┐
//!   │ Commit Log  │          │  Snapshot   │
//!   │  (Append)   │          │ (Arc+BTree) │
//!   └─────────────┘          └─────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod config;
pub mod context;
pub mod error;

pub mod engine;
mod flock;
pub mod key;
pub mod log;
pub mod snapshot;
pub mod store;
pub mod txn;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use config::{StoreConfig, SyncStrategy};
pub use context::Context;
pub use engine::Engine;
pub use error::{Result, StoreError};
pub use key::{bucket_key, bucket_prefix, format_key, KeyArg, BUCKET_SEPARATOR};
pub use snapshot::Entry;
pub use store::{EntryIter, EnumerateOp, GetOp, RemoveOp, SetOp, Store};
pub use txn::{Cursor, ReadTxn, WriteTxn};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of CursorKV
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
