//! Journal entry encoding

use crate::decision::{Decision, LoggedDecision};
use crate::error::{CoordError, Result};

/// Seq (8) + CRC (4) + Len (4)
pub const HEADER_SIZE: usize = 16;

/// Largest accepted entry payload (16 MB)
pub const MAX_ENTRY_SIZE: u32 = 16 * 1024 * 1024;

/// Encode one entry: header followed by the bincode payload
pub fn encode_entry(seq: u64, decision: &Decision) -> Result<Vec<u8>> {
    let data = bincode::serialize(decision)?;
    if data.len() > MAX_ENTRY_SIZE as usize {
        return Err(CoordError::LogWrite(format!(
            "entry {} is {} bytes (max {})",
            seq,
            data.len(),
            MAX_ENTRY_SIZE
        )));
    }

    let crc = crc32fast::hash(&data);

    let mut bytes = Vec::with_capacity(HEADER_SIZE + data.len());
    bytes.extend_from_slice(&seq.to_be_bytes());
    bytes.extend_from_slice(&crc.to_be_bytes());
    bytes.extend_from_slice(&(data.len() as u32).to_be_bytes());
    bytes.extend_from_slice(&data);
    Ok(bytes)
}

/// Split a header into `(seq, crc, len)`
pub fn decode_header(header: &[u8; HEADER_SIZE]) -> (u64, u32, u32) {
    let mut seq = [0u8; 8];
    seq.copy_from_slice(&header[0..8]);
    let crc = u32::from_be_bytes([header[8], header[9], header[10], header[11]]);
    let len = u32::from_be_bytes([header[12], header[13], header[14], header[15]]);
    (u64::from_be_bytes(seq), crc, len)
}

/// Check the payload against its CRC and decode it
pub(crate) fn decode_payload(seq: u64, crc: u32, data: &[u8]) -> Result<LoggedDecision> {
    let actual = crc32fast::hash(data);
    if actual != crc {
        return Err(CoordError::LogCorruption(format!(
            "entry {}: CRC mismatch (stored {:#010x}, computed {:#010x})",
            seq, crc, actual
        )));
    }
    let decision = bincode::deserialize(data)?;
    Ok(LoggedDecision { seq, decision })
}
