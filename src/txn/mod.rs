//! Transaction Module
//!
//! Read and read-write transactions over the engine.
//!
//! ## Concurrency Model: Single-Writer / Multiple-Reader (SWMR)
//!
//! - **ReadTxn**: holds the snapshot that was current at begin. Never waits
//!   for writers and never sees their later commits.
//! - **WriteTxn**: holds the writer lock from begin until commit/rollback.
//!   Sees its own pending writes layered over the snapshot it began with.
//!   Commits are all-or-nothing: one log record, then one snapshot swap.
//!
//! Transactions live inside a single store call (or a `view`/`update`
//! closure) and are released on every exit path, including unwinding.

mod cursor;
mod read;
mod write;

pub use cursor::Cursor;
pub use read::ReadTxn;
pub use write::WriteTxn;
