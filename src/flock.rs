//! Exclusive advisory locks on store files
//!
//! A store file is owned by exactly one open engine. The lock is taken on the
//! open file description, so a second open of the same path fails even within
//! one process, and it is released when the file handle is dropped.

use std::fs::File;
use std::io;
use std::path::Path;

use crate::error::{Result, StoreError};

/// Take a non-blocking exclusive lock on `file`, opened from `path`
pub(crate) fn lock_exclusive(file: &File, path: &Path) -> Result<()> {
    match try_lock(file) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::WouldBlock => {
            Err(StoreError::Locked(path.display().to_string()))
        }
        Err(e) => Err(e.into()),
    }
}

#[cfg(unix)]
fn try_lock(file: &File) -> io::Result<()> {
    use libc::{flock, LOCK_EX, LOCK_NB};
    use std::os::unix::io::AsRawFd;

    let fd = file.as_raw_fd();
    // SAFETY: `fd` is a valid descriptor owned by `file` for the whole call
    let result = unsafe { flock(fd, LOCK_EX | LOCK_NB) };
    if result != 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(())
}

#[cfg(not(unix))]
fn try_lock(_file: &File) -> io::Result<()> {
    // No advisory locking on this platform
    Ok(())
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::fs::OpenOptions;
    use tempfile::TempDir;

    fn open(path: &Path) -> File {
        OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)
            .unwrap()
    }

    #[test]
    fn second_lock_fails() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("locked.db");

        let first = open(&path);
        lock_exclusive(&first, &path).unwrap();

        let second = open(&path);
        let err = lock_exclusive(&second, &path).unwrap_err();
        assert!(matches!(err, StoreError::Locked(_)), "{err}");
    }

    #[test]
    fn lock_released_on_drop() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("locked.db");

        {
            let first = open(&path);
            lock_exclusive(&first, &path).unwrap();
        }

        let again = open(&path);
        lock_exclusive(&again, &path).unwrap();
    }
}
