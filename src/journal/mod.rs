//! Decision Journal Module
//!
//! A single-node, append-only decision log on local disk.
//!
//! ## Responsibilities
//! - Append decisions with monotonically increasing sequence numbers
//! - CRC32 checksums for corruption detection
//! - Recovery that stops at (and trims) a torn tail
//! - Feed the applier through [`crate::decision::DecisionSource`]
//!
//! ## File Format
//! ```text
//! ┌─────────────────────────────────────────┐
//! │ Entry 1                                 │
//! │ ┌─────────┬─────────┬────────┬────────┐ │
//! │ │ Seq (8) │ CRC (4) │Len (4) │ Data   │ │
//! │ └─────────┴─────────┴────────┴────────┘ │
//! ├─────────────────────────────────────────┤
//! │ Entry 2                                 │
//! │ ┌─────────┬─────────┬────────┬────────┐ │
//! │ │ Seq (8) │ CRC (4) │Len (4) │ Data   │ │
//! │ └─────────┴─────────┴────────┴────────┘ │
//! └─────────────────────────────────────────┘
//! ```
//! Header fields are big-endian. `Data` is the bincode-encoded decision and
//! the CRC covers it.

mod entry;
mod writer;
mod reader;
mod recovery;

pub use entry::{decode_header, encode_entry, HEADER_SIZE, MAX_ENTRY_SIZE};
pub use writer::JournalWriter;
pub use reader::{FileDecisionLog, JournalReader};
pub use recovery::{JournalRecovery, RecoveryResult};
