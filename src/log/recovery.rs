//! Commit log recovery
//!
//! Replays the log on open.

use std::fs::File;
use std::io::{Read, Seek, SeekFrom};

use crate::error::{Result, StoreError};

use super::{
    header_bytes, LogRecord, LogWriter, FRAME_HEADER_SIZE, HEADER_SIZE, MAGIC, MAX_RECORD_SIZE,
    VERSION,
};

/// Replays a store file into memory
pub struct LogRecovery;

/// Result of a replay
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecoveryResult {
    /// Number of commit records applied
    pub records_replayed: u64,

    /// Sequence number of the last applied record (0 for an empty log)
    pub last_seq: u64,

    /// Length of the valid log after recovery
    pub valid_len: u64,

    /// Bytes removed from the end of the file (torn final record)
    pub truncated_bytes: u64,

    /// Whether the file was empty and received a fresh header
    pub initialized: bool,
}

impl LogRecovery {
    /// Replay every record in `file`, handing each to `apply` in order
    ///
    /// This will:
    /// 1. Write a header into an empty file
    /// 2. Reject files with a foreign magic or version
    /// 3. Stop at a torn final record and truncate it away
    /// 4. Fail on a damaged record, or a length overrunning the file, that
    ///    is followed by more data
    pub fn replay<F>(file: &mut File, mut apply: F) -> Result<RecoveryResult>
    where
        F: FnMut(LogRecord),
    {
        let mut data = Vec::new();
        file.seek(SeekFrom::Start(0))?;
        file.read_to_end(&mut data)?;

        let mut result = RecoveryResult::default();

        if (data.len() as u64) < HEADER_SIZE {
            // A crash while creating the file can leave a partial header
            if !header_bytes().starts_with(&data) {
                return Err(StoreError::Incompatible(format!(
                    "file of {} bytes is too short to be a store",
                    data.len()
                )));
            }
            file.set_len(0)?;
            result.valid_len = LogWriter::write_header(file)?;
            result.initialized = true;
            return Ok(result);
        }

        Self::check_header(&data)?;

        let file_len = data.len();
        let mut offset = HEADER_SIZE as usize;

        while offset < file_len {
            let remaining = file_len - offset;
            if remaining < FRAME_HEADER_SIZE {
                break;
            }

            let len = u32::from_le_bytes(read4(&data, offset));
            let crc = u32::from_le_bytes(read4(&data, offset + 4));
            if len > MAX_RECORD_SIZE {
                return Err(StoreError::Corruption(format!(
                    "record at offset {} claims {} bytes",
                    offset, len
                )));
            }
            let end = offset + FRAME_HEADER_SIZE + len as usize;

            if end > file_len {
                // Torn only if nothing committed follows: a damaged length
                // field would otherwise swallow every later record
                if let Some(next) = find_frame(&data, offset + 1) {
                    return Err(StoreError::Corruption(format!(
                        "record at offset {} overruns the file but a record follows at offset {}",
                        offset, next
                    )));
                }
                break;
            }

            let payload = &data[offset + FRAME_HEADER_SIZE..end];
            if crc32fast::hash(payload) != crc {
                if end == file_len {
                    break;
                }
                return Err(StoreError::Corruption(format!(
                    "checksum mismatch for record at offset {}",
                    offset
                )));
            }

            let record = LogRecord::decode(payload)?;
            if result.records_replayed > 0 && record.seq <= result.last_seq {
                return Err(StoreError::Corruption(format!(
                    "sequence {} at offset {} does not follow {}",
                    record.seq, offset, result.last_seq
                )));
            }

            result.last_seq = record.seq;
            result.records_replayed += 1;
            apply(record);
            offset = end;
        }

        result.valid_len = offset as u64;
        result.truncated_bytes = (file_len - offset) as u64;
        if result.truncated_bytes > 0 {
            file.set_len(result.valid_len)?;
            file.sync_data()?;
        }

        Ok(result)
    }

    fn check_header(data: &[u8]) -> Result<()> {
        if &data[0..4] != MAGIC {
            return Err(StoreError::Incompatible(format!(
                "invalid magic: expected CKVL, got {:?}",
                &data[0..4]
            )));
        }
        let version = u16::from_le_bytes([data[4], data[5]]);
        if version != VERSION {
            return Err(StoreError::Incompatible(format!(
                "unsupported format version: {}",
                version
            )));
        }
        Ok(())
    }
}

/// Offset of the first intact frame at or after `from`, if any
///
/// A frame is intact when its length fits, its checksum matches and its
/// payload decodes as a record.
fn find_frame(data: &[u8], from: usize) -> Option<usize> {
    let last_start = data.len().checked_sub(FRAME_HEADER_SIZE)?;
    (from..=last_start).find(|&start| {
        let len = u32::from_le_bytes(read4(data, start));
        if len == 0 || len > MAX_RECORD_SIZE {
            return false;
        }
        let end = start + FRAME_HEADER_SIZE + len as usize;
        if end > data.len() {
            return false;
        }
        let payload = &data[start + FRAME_HEADER_SIZE..end];
        crc32fast::hash(payload) == u32::from_le_bytes(read4(data, start + 4))
            && LogRecord::decode(payload).is_ok()
    })
}

fn read4(data: &[u8], at: usize) -> [u8; 4] {
    [data[at], data[at + 1], data[at + 2], data[at + 3]]
}
