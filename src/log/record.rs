//! Commit record definitions
//!
//! Defines the structure of a single commit record and its on-disk frame.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::error::{Result, StoreError};

use super::MAX_RECORD_SIZE;

/// Frame header: payload length (4) + payload CRC32 (4)
pub const FRAME_HEADER_SIZE: usize = 8;

/// One committed write transaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogRecord {
    /// Commit sequence number - strictly increasing within a file
    pub seq: u64,

    /// Timestamp (unix millis) when the commit was written
    pub timestamp: u64,

    /// Mutations applied by the commit, in key order
    pub ops: Vec<Operation>,
}

/// Mutations that can be logged
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Operation {
    /// Put a key-value pair
    Put { key: Vec<u8>, value: Vec<u8> },

    /// Delete a key
    Delete { key: Vec<u8> },
}

impl LogRecord {
    pub fn new(seq: u64, ops: Vec<Operation>) -> Self {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);
        Self { seq, timestamp, ops }
    }

    /// Serialize into a complete frame: `[len][crc][payload]`
    pub fn encode(&self) -> Result<Vec<u8>> {
        let payload = bincode::serialize(self)?;
        if payload.len() > MAX_RECORD_SIZE as usize {
            return Err(StoreError::Serialization(format!(
                "commit record of {} bytes exceeds the {} byte limit",
                payload.len(),
                MAX_RECORD_SIZE
            )));
        }

        let mut frame = Vec::with_capacity(FRAME_HEADER_SIZE + payload.len());
        frame.extend_from_slice(&(payload.len() as u32).to_le_bytes());
        frame.extend_from_slice(&crc32fast::hash(&payload).to_le_bytes());
        frame.extend_from_slice(&payload);
        Ok(frame)
    }

    /// Deserialize a payload whose checksum was already verified
    pub fn decode(payload: &[u8]) -> Result<Self> {
        bincode::deserialize(payload)
            .map_err(|e| StoreError::Corruption(format!("undecodable commit record: {}", e)))
    }
}
