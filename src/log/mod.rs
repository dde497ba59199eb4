//! Commit Log Module
//!
//! The single backing file of a store: an append-only sequence of
//! checksummed commit records. Each committed write transaction becomes one
//! record, so a commit is either fully present or absent after a crash.
//!
//! ## Responsibilities
//! - Append one record per committed transaction
//! - CRC32 checksums for corruption detection
//! - Sequence numbers for ordering
//! - Replay on open, trimming a torn final record
//!
//! ## File Format
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ Header (8 bytes)                            │
//! │   Magic "CKVL" (4) | Version u16 (2) | 0 (2)│
//! ├─────────────────────────────────────────────┤
//! │ Record 1                                    │
//! │ ┌─────────┬─────────┬─────────────────────┐ │
//! │ │ Len (4) │ CRC (4) │ bincode(LogRecord)  │ │
//! │ └─────────┴─────────┴─────────────────────┘ │
//! ├─────────────────────────────────────────────┤
//! │ Record 2 ...                                │
//! └─────────────────────────────────────────────┘
//! ```

mod record;
mod recovery;
mod writer;

pub use record::{LogRecord, Operation, FRAME_HEADER_SIZE};
pub use recovery::{LogRecovery, RecoveryResult};
pub use writer::LogWriter;

/// Magic bytes identifying a CursorKV store file
pub(crate) const MAGIC: &[u8; 4] = b"CKVL";

/// Current file format version
pub(crate) const VERSION: u16 = 1;

/// Header size: Magic (4) + Version (2) + Reserved (2) = 8 bytes
pub const HEADER_SIZE: u64 = 8;

/// Upper limit on a single record payload
pub(crate) const MAX_RECORD_SIZE: u32 = 1 << 30;

/// The header bytes every store file starts with
pub(crate) fn header_bytes() -> [u8; HEADER_SIZE as usize] {
    let mut header = [0u8; HEADER_SIZE as usize];
    header[0..4].copy_from_slice(MAGIC);
    header[4..6].copy_from_slice(&VERSION.to_le_bytes());
    header
}
