//! Journal Recovery
//!
//! Scans a journal after a crash and decides how much of it is trustworthy.

use std::fs;
use std::path::Path;

use crate::decision::LoggedDecision;
use crate::error::{CoordError, Result};
use super::reader::{JournalReader, ReadOutcome};

/// Handles journal recovery after a crash
pub struct JournalRecovery;

/// Result of a recovery scan
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecoveryResult {
    /// Number of valid entries
    pub entries_recovered: u64,

    /// Sequence of the last valid entry (0 if none)
    pub last_seq: u64,

    /// Length of the valid prefix in bytes
    pub valid_len: u64,

    /// Bytes after the valid prefix (a torn or corrupt final entry)
    pub trailing_bytes: u64,
}

impl RecoveryResult {
    /// True if the file has a tail that must be cut off
    pub fn needs_truncation(&self) -> bool {
        self.trailing_bytes > 0
    }
}

impl JournalRecovery {
    /// Read every valid entry of a journal
    ///
    /// Stops at a torn final entry, or at a corrupt entry that is the last
    /// one in the file; both are crash leftovers. Corruption followed by more
    /// data is an error: later decisions cannot be trusted without it.
    pub fn recover(path: &Path) -> Result<(Vec<LoggedDecision>, RecoveryResult)> {
        let file_len = fs::metadata(path)?.len();
        let mut reader = JournalReader::open(path)?;
        let mut entries = Vec::new();

        loop {
            match reader.read_next()? {
                ReadOutcome::Entry(entry) => entries.push(entry),
                ReadOutcome::End | ReadOutcome::Torn => break,
                ReadOutcome::Corrupt { reason, end } => {
                    if end < file_len {
                        return Err(CoordError::LogCorruption(format!(
                            "{} ({} bytes follow)",
                            reason,
                            file_len - end
                        )));
                    }
                    tracing::warn!("Discarding corrupt final journal entry: {}", reason);
                    break;
                }
            }
        }

        let result = RecoveryResult {
            entries_recovered: entries.len() as u64,
            last_seq: reader.last_seq(),
            valid_len: reader.position(),
            trailing_bytes: file_len - reader.position(),
        };
        Ok((entries, result))
    }

    /// Scan without keeping the entries
    pub fn verify(path: &Path) -> Result<RecoveryResult> {
        Self::recover(path).map(|(_, result)| result)
    }
}
