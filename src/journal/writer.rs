//! Journal Writer
//!
//! Appends decisions to the journal file.

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::config::LogSyncStrategy;
use crate::decision::Decision;
use crate::error::{CoordError, Result};
use super::{encode_entry, JournalRecovery};

/// Writes decisions to the journal file
pub struct JournalWriter {
    path: PathBuf,
    writer: BufWriter<File>,

    /// Sequence the next append receives
    next_seq: u64,

    sync_strategy: LogSyncStrategy,

    /// Entries written since the last fsync
    unsynced: usize,
}

impl JournalWriter {
    /// Open or create a journal file
    ///
    /// An existing file is recovered first; a torn tail is cut off so new
    /// entries follow the last valid one.
    pub fn open(path: &Path, sync_strategy: LogSyncStrategy) -> Result<Self> {
        let mut next_seq = 1;

        if path.exists() {
            let result = JournalRecovery::verify(path)?;
            if result.needs_truncation() {
                tracing::warn!(
                    "Truncating {} trailing bytes from journal {} (last seq {})",
                    result.trailing_bytes,
                    path.display(),
                    result.last_seq
                );
                let file = OpenOptions::new().write(true).open(path)?;
                file.set_len(result.valid_len)?;
                file.sync_all()?;
            }
            next_seq = result.last_seq + 1;
        }

        let file = OpenOptions::new().create(true).append(true).open(path)?;

        Ok(Self {
            path: path.to_path_buf(),
            writer: BufWriter::new(file),
            next_seq,
            sync_strategy,
            unsynced: 0,
        })
    }

    /// Append a decision, returning its sequence number
    pub fn append(&mut self, decision: &Decision) -> Result<u64> {
        let seq = self.next_seq;
        let bytes = encode_entry(seq, decision)?;

        self.writer
            .write_all(&bytes)
            .map_err(|e| CoordError::LogWrite(format!("append {}: {}", seq, e)))?;
        self.next_seq += 1;
        self.unsynced += 1;

        let due = match self.sync_strategy {
            LogSyncStrategy::EveryWrite => true,
            LogSyncStrategy::EveryNEntries { count } => self.unsynced >= count,
        };
        if due {
            self.sync()?;
        }

        tracing::trace!("Journal append seq={} kind={}", seq, decision.kind());
        Ok(seq)
    }

    /// Flush buffers and fsync
    pub fn sync(&mut self) -> Result<()> {
        self.writer.flush()?;
        self.writer.get_ref().sync_data()?;
        self.unsynced = 0;
        Ok(())
    }

    /// Sequence the next append will receive
    pub fn next_seq(&self) -> u64 {
        self.next_seq
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for JournalWriter {
    fn drop(&mut self) {
        if self.unsynced > 0 {
            if let Err(e) = self.sync() {
                tracing::warn!("Journal sync on close failed: {}", e);
            }
        }
    }
}
