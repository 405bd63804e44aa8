//! Length-delimited wire decoding over a flat buffer.
//!
//! MMKV borrows the protobuf length-delimited field shape — a varint byte
//! length followed by that many payload bytes — without being protobuf
//! compatible.  `WireReader` is the single field-decoding primitive; the
//! loader uses it for the entry loop and the vault uses it again to unwrap
//! stored values one level deeper.

use crate::errors::{MmkvError, Result};

/// Cursor over an in-memory buffer of length-delimited fields.
pub struct WireReader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> WireReader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Bytes not yet consumed.
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    pub fn is_empty(&self) -> bool {
        self.pos >= self.buf.len()
    }

    /// Decode an unsigned varint from the buffer.
    pub fn read_varint(&mut self) -> Result<u64> {
        let mut value = 0u64;
        let mut shift = 0u32;

        loop {
            let b = *self.buf.get(self.pos).ok_or(MmkvError::Eof)?;
            self.pos += 1;

            let bits = u64::from(b & 0x7f);
            // Value bits shifted past bit 63 are an overflow, not silence.
            if shift >= 64 || (bits << shift) >> shift != bits {
                return Err(MmkvError::VarintOverflow);
            }
            value |= bits << shift;
            shift += 7;

            if b & 0x80 == 0 {
                return Ok(value);
            }
        }
    }

    /// Decode one length-delimited field and return its payload.
    pub fn read_length_delimited(&mut self) -> Result<&'a [u8]> {
        let len = self.read_varint()?;
        let available = self.remaining() as u64;
        if len > available {
            return Err(MmkvError::TruncatedField {
                wanted: len,
                available,
            });
        }

        let start = self.pos;
        self.pos += len as usize;
        Ok(&self.buf[start..self.pos])
    }
}

/// Decode a buffer of alternating length-delimited key and raw-value
/// fields into entries, in physical order.
///
/// The buffer must start at the first key (the caller strips the 4-byte
/// marker).  A nonzero remainder too short to form another complete pair
/// is a fatal decode error; partial trailing entries are never tolerated.
/// Keys are converted lossily when not valid UTF-8.
pub fn decode_entries(buf: &[u8]) -> Result<Vec<(String, Vec<u8>)>> {
    let mut rd = WireReader::new(buf);
    let mut entries = Vec::new();

    while !rd.is_empty() {
        let key = rd.read_length_delimited()?;
        let value = rd.read_length_delimited()?;
        entries.push((String::from_utf8_lossy(key).into_owned(), value.to_vec()));
    }

    Ok(entries)
}
