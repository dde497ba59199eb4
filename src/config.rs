//! Configuration for CursorKV
//!
//! Centralized configuration with sensible defaults.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::{Result, StoreError};

/// Main configuration for a CursorKV store
#[derive(Debug, Clone)]
pub struct StoreConfig {
    // -------------------------------------------------------------------------
    // Identity
    // -------------------------------------------------------------------------
    /// Logical store name (used in logs only)
    pub name: String,

    // -------------------------------------------------------------------------
    // Storage Configuration
    // -------------------------------------------------------------------------
    /// Path of the single backing file
    pub path: PathBuf,

    /// Permission bits applied when the file is created (unix only)
    pub mode: u32,

    /// Rewrite the commit log into a single record right after opening
    pub compact_on_open: bool,

    // -------------------------------------------------------------------------
    // Commit Configuration
    // -------------------------------------------------------------------------
    /// How often commits are fsynced
    pub sync_strategy: SyncStrategy,

    /// Slice length used while waiting for the writer lock; the context is
    /// re-checked between slices
    pub lock_poll_interval: Duration,
}

/// Commit sync strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncStrategy {
    /// fsync after every commit (safest, slowest)
    EveryCommit,

    /// fsync after N commits (balanced durability/performance)
    EveryNCommits { count: usize },
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            name: "default".to_string(),
            path: PathBuf::from("./cursorkv.db"),
            mode: 0o600,
            compact_on_open: false,
            sync_strategy: SyncStrategy::EveryCommit,
            lock_poll_interval: Duration::from_millis(10),
        }
    }
}

impl StoreConfig {
    /// Create a new config builder
    pub fn builder() -> StoreConfigBuilder {
        StoreConfigBuilder::default()
    }

    /// Reject values that can never produce a working store
    pub fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(StoreError::Config("store name must not be empty".into()));
        }
        if self.path.as_os_str().is_empty() {
            return Err(StoreError::Config("store path must not be empty".into()));
        }
        if self.mode & !0o7777 != 0 {
            return Err(StoreError::Config(format!(
                "invalid permission mode {:o}",
                self.mode
            )));
        }
        if let SyncStrategy::EveryNCommits { count: 0 } = self.sync_strategy {
            return Err(StoreError::Config("sync count must be at least 1".into()));
        }
        if self.lock_poll_interval.is_zero() {
            return Err(StoreError::Config(
                "lock poll interval must be non-zero".into(),
            ));
        }
        Ok(())
    }
}

/// Builder for StoreConfig
#[derive(Default)]
pub struct StoreConfigBuilder {
    config: StoreConfig,
}

impl StoreConfigBuilder {
    /// Set the store name
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.config.name = name.into();
        self
    }

    /// Set the backing file path
    pub fn path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.path = path.into();
        self
    }

    /// Set the permission bits used when creating the file
    pub fn mode(mut self, mode: u32) -> Self {
        self.config.mode = mode;
        self
    }

    /// Compact the log once the store is opened
    pub fn compact_on_open(mut self, enabled: bool) -> Self {
        self.config.compact_on_open = enabled;
        self
    }

    /// Set the commit sync strategy
    pub fn sync_strategy(mut self, strategy: SyncStrategy) -> Self {
        self.config.sync_strategy = strategy;
        self
    }

    /// Set the writer lock polling slice
    pub fn lock_poll_interval(mut self, interval: Duration) -> Self {
        self.config.lock_poll_interval = interval;
        self
    }

    pub fn build(self) -> StoreConfig {
        self.config
    }
}
