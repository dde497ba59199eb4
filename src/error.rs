//! Error types for CursorKV
//!
//! Provides a unified error type for all operations. A missing key is not an
//! error: point reads return `Ok(None)`.

use thiserror::Error;

/// Result type alias using StoreError
pub type Result<T> = std::result::Result<T, StoreError>;

/// Unified error type for CursorKV operations
#[derive(Debug, Error)]
pub enum StoreError {
    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Malformed key template: {0}")]
    Template(String),

    // -------------------------------------------------------------------------
    // Engine Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Store corruption detected: {0}")]
    Corruption(String),

    #[error("Incompatible store file: {0}")]
    Incompatible(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Store is closed")]
    Closed,

    #[error("Store file is locked by another handle: {0}")]
    Locked(String),

    #[error("Commit log unusable after a failed write: {0}")]
    Poisoned(String),

    // -------------------------------------------------------------------------
    // Cancellation Errors
    // -------------------------------------------------------------------------
    #[error("Operation cancelled")]
    Cancelled,

    #[error("Operation deadline exceeded")]
    DeadlineExceeded,

    // -------------------------------------------------------------------------
    // Conversion Errors
    // -------------------------------------------------------------------------
    #[error("Cannot convert stored value to {target}: {reason}")]
    Conversion { target: &'static str, reason: String },
}

impl StoreError {
    /// True for `Cancelled` and `DeadlineExceeded`
    pub fn is_cancellation(&self) -> bool {
        matches!(self, StoreError::Cancelled | StoreError::DeadlineExceeded)
    }

    /// True when a typed accessor could not interpret the stored bytes
    pub fn is_conversion(&self) -> bool {
        matches!(self, StoreError::Conversion { .. })
    }

    pub(crate) fn conversion(target: &'static str, reason: impl ToString) -> Self {
        StoreError::Conversion {
            target,
            reason: reason.to_string(),
        }
    }
}

impl From<bincode::Error> for StoreError {
    fn from(e: bincode::Error) -> Self {
        StoreError::Serialization(e.to_string())
    }
}
