//! Configuration for atlascoord
//!
//! Centralized configuration with sensible defaults.

use std::path::PathBuf;

use crate::error::{CoordError, Result};

/// Main configuration for a coordinator
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Journal Configuration
    // -------------------------------------------------------------------------
    /// Root directory for coordinator files
    /// Internal structure:
    ///   {data_dir}/
    ///     └── decisions.log    (decision journal)
    pub data_dir: PathBuf,

    /// Sync strategy: how often to fsync the journal
    pub log_sync_strategy: LogSyncStrategy,

    // -------------------------------------------------------------------------
    // Applier Configuration
    // -------------------------------------------------------------------------
    /// Capacity of the ack/reject event queue
    pub event_queue_capacity: usize,

    /// How often unconfirmed configurations are resent (milliseconds)
    pub redelivery_interval_ms: u64,

    /// Pending configurations per instance above which it is reported lagging
    pub pending_warn_threshold: usize,
}

/// Journal sync strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogSyncStrategy {
    /// fsync after every append (safest, slowest)
    EveryWrite,

    /// fsync after N unsynced appends
    EveryNEntries { count: usize },
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./atlascoord_data"),
            log_sync_strategy: LogSyncStrategy::EveryWrite,
            event_queue_capacity: 4096,
            redelivery_interval_ms: 1000,
            pending_warn_threshold: 64,
        }
    }
}

impl Config {
    const JOURNAL_FILENAME: &'static str = "decisions.log";

    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Path of the decision journal
    pub fn journal_path(&self) -> PathBuf {
        self.data_dir.join(Self::JOURNAL_FILENAME)
    }

    /// Reject settings the applier cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.event_queue_capacity == 0 {
            return Err(CoordError::Config(
                "event_queue_capacity must be at least 1".to_string(),
            ));
        }
        if self.redelivery_interval_ms == 0 {
            return Err(CoordError::Config(
                "redelivery_interval_ms must be positive".to_string(),
            ));
        }
        if let LogSyncStrategy::EveryNEntries { count: 0 } = self.log_sync_strategy {
            return Err(CoordError::Config(
                "log sync count must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the data directory
    pub fn data_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.data_dir = path.into();
        self
    }

    /// Set the journal sync strategy
    pub fn log_sync_strategy(mut self, strategy: LogSyncStrategy) -> Self {
        self.config.log_sync_strategy = strategy;
        self
    }

    /// Set the event queue capacity
    pub fn event_queue_capacity(mut self, capacity: usize) -> Self {
        self.config.event_queue_capacity = capacity;
        self
    }

    /// Set the redelivery interval (in milliseconds)
    pub fn redelivery_interval_ms(mut self, ms: u64) -> Self {
        self.config.redelivery_interval_ms = ms;
        self
    }

    /// Set the lagging-instance warning threshold
    pub fn pending_warn_threshold(mut self, count: usize) -> Self {
        self.config.pending_warn_threshold = count;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
