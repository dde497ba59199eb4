//! Commit log writer
//!
//! Appends framed records to the store file.

use std::fs::File;
use std::io::{self, Seek, SeekFrom, Write};

use crate::config::SyncStrategy;
use crate::error::{Result, StoreError};

use super::{header_bytes, LogRecord};

/// Appends commit records to an open store file
///
/// `len` is the length of the valid prefix of the file. Records are always
/// written at `len`, and `len` only advances once the frame is written and,
/// when the strategy asks for it, synced. A failed append cuts the file back
/// to `len`, so a rejected commit never reappears on replay. If that cut
/// fails too, the writer is poisoned and refuses further appends.
#[derive(Debug)]
pub struct LogWriter {
    file: File,
    len: u64,
    sync_strategy: SyncStrategy,
    unsynced: usize,
    poisoned: bool,
    #[cfg(test)]
    fail_next_sync: bool,
}

impl LogWriter {
    /// Wrap a file whose first `len` bytes are a valid log
    pub fn new(file: File, len: u64, sync_strategy: SyncStrategy) -> Self {
        Self {
            file,
            len,
            sync_strategy,
            unsynced: 0,
            poisoned: false,
            #[cfg(test)]
            fail_next_sync: false,
        }
    }

    /// Write the format header into an empty file
    pub fn write_header(file: &mut File) -> Result<u64> {
        let header = header_bytes();
        file.seek(SeekFrom::Start(0))?;
        file.write_all(&header)?;
        file.sync_data()?;
        Ok(header.len() as u64)
    }

    /// Append one record, honouring the sync strategy
    ///
    /// Returns the new log length. On error the file is back at its previous
    /// length and the record is not part of the log.
    pub fn append(&mut self, record: &LogRecord) -> Result<u64> {
        if self.poisoned {
            return Err(StoreError::Poisoned(
                "an earlier append could not be rolled back".into(),
            ));
        }
        let frame = record.encode()?;

        if let Err(e) = self.write_frame(&frame) {
            return Err(self.roll_back(e));
        }

        let due = match self.sync_strategy {
            SyncStrategy::EveryCommit => true,
            SyncStrategy::EveryNCommits { count } => self.unsynced + 1 >= count,
        };
        if due {
            if let Err(e) = self.sync_file() {
                return Err(self.roll_back(e));
            }
            self.unsynced = 0;
        } else {
            self.unsynced += 1;
        }

        self.len += frame.len() as u64;
        Ok(self.len)
    }

    fn write_frame(&mut self, frame: &[u8]) -> io::Result<()> {
        self.file.seek(SeekFrom::Start(self.len))?;
        self.file.write_all(frame)
    }

    /// Cut the file back to the last accepted record
    fn roll_back(&mut self, cause: io::Error) -> StoreError {
        if let Err(e) = self.file.set_len(self.len).and_then(|()| self.file.sync_data()) {
            self.poisoned = true;
            tracing::error!(
                len = self.len,
                cause = %cause,
                error = %e,
                "failed to roll back commit log"
            );
        }
        StoreError::Io(cause)
    }

    fn sync_file(&mut self) -> io::Result<()> {
        if self.take_injected_failure() {
            return Err(io::Error::new(io::ErrorKind::Other, "injected sync failure"));
        }
        self.file.sync_data()
    }

    #[cfg(test)]
    fn take_injected_failure(&mut self) -> bool {
        std::mem::take(&mut self.fail_next_sync)
    }

    #[cfg(not(test))]
    fn take_injected_failure(&mut self) -> bool {
        false
    }

    /// Force sync to disk
    pub fn sync(&mut self) -> Result<()> {
        self.sync_file()?;
        self.unsynced = 0;
        Ok(())
    }

    /// Length of the valid log in bytes
    pub fn valid_len(&self) -> u64 {
        self.len
    }

    /// Commits appended since the last fsync
    pub fn unsynced(&self) -> usize {
        self.unsynced
    }

    /// Whether a failed rollback left the writer unusable
    pub fn is_poisoned(&self) -> bool {
        self.poisoned
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::log::{LogRecovery, Operation};
    use std::fs::OpenOptions;
    use tempfile::TempDir;

    fn record(seq: u64, key: &str) -> LogRecord {
        LogRecord::new(
            seq,
            vec![Operation::Put {
                key: key.as_bytes().to_vec(),
                value: b"v".to_vec(),
            }],
        )
    }

    fn open(path: &std::path::Path) -> File {
        OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)
            .unwrap()
    }

    #[test]
    fn failed_sync_rolls_back_the_frame() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("log.db");

        let mut file = open(&path);
        let header_len = LogWriter::write_header(&mut file).unwrap();
        let mut writer = LogWriter::new(file, header_len, SyncStrategy::EveryCommit);

        let after_first = writer.append(&record(1, "a")).unwrap();

        writer.fail_next_sync = true;
        assert!(matches!(writer.append(&record(2, "b")), Err(StoreError::Io(_))));
        assert_eq!(writer.valid_len(), after_first);
        assert_eq!(std::fs::metadata(&path).unwrap().len(), after_first);
        assert!(!writer.is_poisoned());

        // The retried commit reuses the sequence number without a clash
        writer.append(&record(2, "c")).unwrap();
        drop(writer);

        let mut keys = Vec::new();
        let result = LogRecovery::replay(&mut open(&path), |r| {
            for op in r.ops {
                if let Operation::Put { key, .. } = op {
                    keys.push(key);
                }
            }
        })
        .unwrap();
        assert_eq!(result.records_replayed, 2);
        assert_eq!(result.last_seq, 2);
        assert_eq!(keys, vec![b"a".to_vec(), b"c".to_vec()]);
    }

    #[test]
    fn failed_write_without_rollback_poisons() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("log.db");
        let mut file = open(&path);
        let header_len = LogWriter::write_header(&mut file).unwrap();
        drop(file);

        // Writes and set_len both fail on a read-only handle
        let read_only = OpenOptions::new().read(true).open(&path).unwrap();
        let mut writer = LogWriter::new(read_only, header_len, SyncStrategy::EveryCommit);

        assert!(matches!(writer.append(&record(1, "a")), Err(StoreError::Io(_))));
        assert!(writer.is_poisoned());
        assert!(matches!(writer.append(&record(1, "a")), Err(StoreError::Poisoned(_))));
        assert_eq!(writer.valid_len(), header_len);
    }

    #[test]
    fn batched_sync_counts_commits() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("log.db");
        let mut file = open(&path);
        let header_len = LogWriter::write_header(&mut file).unwrap();
        let mut writer =
            LogWriter::new(file, header_len, SyncStrategy::EveryNCommits { count: 3 });

        writer.append(&record(1, "a")).unwrap();
        writer.append(&record(2, "b")).unwrap();
        assert_eq!(writer.unsynced(), 2);
        writer.append(&record(3, "c")).unwrap();
        assert_eq!(writer.unsynced(), 0);
    }
}
