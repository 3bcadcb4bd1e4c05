//! Journal Reader
//!
//! Reads entries back in order, and serves them to the applier.

use std::fs::File;
use std::io::{BufReader, ErrorKind, Read, Seek, SeekFrom};
use std::path::Path;

use crate::decision::{DecisionSource, LoggedDecision};
use crate::error::{CoordError, Result};
use super::entry::decode_payload;
use super::{decode_header, HEADER_SIZE, MAX_ENTRY_SIZE};

/// What the next read found
#[derive(Debug)]
pub(crate) enum ReadOutcome {
    /// A complete, valid entry
    Entry(LoggedDecision),

    /// Clean end of file
    End,

    /// The file ends inside an entry
    Torn,

    /// A complete entry that fails validation; `end` is the offset after it
    Corrupt { reason: String, end: u64 },
}

/// Sequential reader over a journal file
pub struct JournalReader {
    reader: BufReader<File>,

    /// Offset just past the last valid entry
    position: u64,

    /// Sequence of the last valid entry (0 if none)
    last_seq: u64,
}

impl JournalReader {
    /// Open a journal file for reading
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        Ok(Self {
            reader: BufReader::new(file),
            position: 0,
            last_seq: 0,
        })
    }

    /// Read the next entry
    ///
    /// Returns `Ok(None)` at a clean end of file. A torn or corrupt entry is
    /// an error.
    pub fn next_entry(&mut self) -> Result<Option<LoggedDecision>> {
        match self.read_next()? {
            ReadOutcome::Entry(entry) => Ok(Some(entry)),
            ReadOutcome::End => Ok(None),
            ReadOutcome::Torn => Err(CoordError::LogCorruption(format!(
                "torn entry at offset {}",
                self.position
            ))),
            ReadOutcome::Corrupt { reason, .. } => Err(CoordError::LogCorruption(reason)),
        }
    }

    /// Offset just past the last valid entry
    pub fn position(&self) -> u64 {
        self.position
    }

    pub fn last_seq(&self) -> u64 {
        self.last_seq
    }

    pub(crate) fn read_next(&mut self) -> Result<ReadOutcome> {
        let mut header = [0u8; HEADER_SIZE];
        let got = read_full(&mut self.reader, &mut header)?;
        if got == 0 {
            return Ok(ReadOutcome::End);
        }
        if got < HEADER_SIZE {
            return Ok(ReadOutcome::Torn);
        }

        let (seq, crc, len) = decode_header(&header);
        let end = self.position + (HEADER_SIZE as u64) + len as u64;

        if len > MAX_ENTRY_SIZE {
            return Ok(ReadOutcome::Corrupt {
                reason: format!("entry at offset {}: length {} exceeds maximum", self.position, len),
                end,
            });
        }

        let mut data = vec![0u8; len as usize];
        if read_full(&mut self.reader, &mut data)? < data.len() {
            return Ok(ReadOutcome::Torn);
        }

        if seq <= self.last_seq {
            return Ok(ReadOutcome::Corrupt {
                reason: format!("entry {} follows entry {}", seq, self.last_seq),
                end,
            });
        }

        match decode_payload(seq, crc, &data) {
            Ok(entry) => {
                self.position = end;
                self.last_seq = seq;
                Ok(ReadOutcome::Entry(entry))
            }
            Err(e) => Ok(ReadOutcome::Corrupt {
                reason: e.to_string(),
                end,
            }),
        }
    }

    /// Go back to the end of the last valid entry
    fn rewind(&mut self) -> Result<()> {
        self.reader.seek(SeekFrom::Start(self.position))?;
        Ok(())
    }
}

/// Read until `buf` is full or EOF. Returns bytes read.
fn read_full<R: Read>(reader: &mut R, buf: &mut [u8]) -> Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }
    Ok(filled)
}

/// A journal file consumed as a [`DecisionSource`]
///
/// Follows the file as it grows: an entry still being written is reported
/// as "nothing ready" and re-read on the next call.
pub struct FileDecisionLog {
    reader: JournalReader,
}

impl FileDecisionLog {
    pub fn open(path: &Path) -> Result<Self> {
        Ok(Self {
            reader: JournalReader::open(path)?,
        })
    }
}

impl DecisionSource for FileDecisionLog {
    fn next_decision(&mut self) -> Result<Option<LoggedDecision>> {
        match self.reader.read_next()? {
            ReadOutcome::Entry(entry) => Ok(Some(entry)),
            ReadOutcome::End => Ok(None),
            ReadOutcome::Torn => {
                self.reader.rewind()?;
                Ok(None)
            }
            ReadOutcome::Corrupt { reason, .. } => {
                self.reader.rewind()?;
                Err(CoordError::LogCorruption(reason))
            }
        }
    }
}
