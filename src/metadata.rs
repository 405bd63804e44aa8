//! Side-channel metadata record (`.crc` file) decoding.
//!
//! Alongside each MMKV file sits a small fixed-layout record.  The decoder
//! consumes exactly three of its fields:
//!
//! ```text
//! Offset  Size  Field
//! ------  ----  -----
//! 0x00    4     crc32 of the payload (u32 LE)
//! 0x04    8     (not consumed)
//! 0x0C    16    AES-CFB initialization vector
//! 0x1C    4     actual payload size (u32 LE)
//! ```

use std::io::Read;

use crate::crypto::IV_LEN;
use crate::errors::{MmkvError, Result};

/// Byte offset of the IV inside the record.
const IV_OFFSET: usize = 0x0C;

/// Smallest record the full decode accepts.
const RECORD_LEN: usize = IV_OFFSET + IV_LEN + 4;

/// The three metadata fields the loader cross-validates against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Metadata {
    /// Recorded payload size in bytes.
    pub actual_size: u32,
    /// CRC32 (IEEE) of the payload as stored on disk.
    pub crc32: u32,
    /// Initialization vector for AES-CFB decryption.
    pub iv: [u8; IV_LEN],
}

impl Metadata {
    /// Decode a metadata record from raw bytes.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < RECORD_LEN {
            return Err(MmkvError::TruncatedMetadata {
                len: bytes.len(),
                need: RECORD_LEN,
            });
        }

        let crc32 = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);

        let mut iv = [0u8; IV_LEN];
        iv.copy_from_slice(&bytes[IV_OFFSET..IV_OFFSET + IV_LEN]);

        let size_at = IV_OFFSET + IV_LEN;
        let actual_size = u32::from_le_bytes([
            bytes[size_at],
            bytes[size_at + 1],
            bytes[size_at + 2],
            bytes[size_at + 3],
        ]);

        Ok(Self {
            actual_size,
            crc32,
            iv,
        })
    }

    /// Read and decode a metadata record from a byte source.
    pub fn read_from(src: &mut impl Read) -> Result<Self> {
        let mut buf = [0u8; RECORD_LEN];
        src.read_exact(&mut buf)?;
        Self::decode(&buf)
    }
}

/// Read only the IV from a side-channel record.
///
/// The inline per-record encryption path consumes just the 28-byte prefix
/// of the record (everything up to and including the IV) and ignores the
/// rest.
pub fn read_inline_iv(src: &mut dyn Read) -> Result<[u8; IV_LEN]> {
    let mut buf = [0u8; IV_OFFSET + IV_LEN];
    src.read_exact(&mut buf)?;
    let mut iv = [0u8; IV_LEN];
    iv.copy_from_slice(&buf[IV_OFFSET..]);
    Ok(iv)
}
