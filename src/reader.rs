//! Sequential, offset-tracked reading of the MMKV payload stream.
//!
//! An MMKV file is a 4-byte little-endian payload length followed by the
//! payload itself: a leading non-entry marker field, then alternating
//! length-delimited keys and values.  `SequentialReader` is a cursor over
//! that payload which never reads past the declared length, decodes the
//! varint and length-delimited primitives, and enforces the format's
//! exact-consumption framing rule.

use std::collections::HashMap;
use std::fmt;
use std::io::{self, Read};

use log::debug;

use crate::crypto::CfbReader;
use crate::errors::{MmkvError, Result};
use crate::metadata::read_inline_iv;

/// Size of the little-endian payload-length prefix.
const SIZE_PREFIX_LEN: u64 = 4;

/// A byte-offset-tracked cursor over an MMKV payload.
///
/// The invariant `0 <= offset <= size` holds at all times: any read that
/// would exceed the declared size fails with [`MmkvError::Eof`] before
/// touching the source.
pub struct SequentialReader<R> {
    src: R,
    offset: u64,
    size: u64,
}

// Manual impl: the source is often a trait object and carries no useful
// state to show anyway.
impl<R> fmt::Debug for SequentialReader<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SequentialReader")
            .field("offset", &self.offset)
            .field("size", &self.size)
            .finish_non_exhaustive()
    }
}

/// Open an MMKV file stream and position a reader at the first entry.
///
/// Reads the 4-byte little-endian payload length, then — when both a
/// password and a side-channel record source are supplied — reads the IV
/// out of the record and wraps the source in a [`CfbReader`] so every
/// subsequent read is decrypted inline.  The password must already be
/// exactly the AES-128 key length on this path.  Finally the leading
/// marker field (a varint that is not an entry) is consumed.
pub fn open_stream<'a, R: Read + 'a>(
    mut src: R,
    password: Option<&[u8]>,
    sidecar: Option<&mut dyn Read>,
) -> Result<SequentialReader<Box<dyn Read + 'a>>> {
    let mut len_buf = [0u8; 4];
    src.read_exact(&mut len_buf)?;
    let payload_len = u64::from(u32::from_le_bytes(len_buf));

    let src: Box<dyn Read + 'a> = match (password, sidecar) {
        (Some(password), Some(sidecar)) => {
            let iv = read_inline_iv(sidecar)?;
            Box::new(CfbReader::with_raw_key(src, password, &iv)?)
        }
        _ => Box::new(src),
    };

    debug!("opened mmkv stream, payload of {payload_len} bytes");

    let mut reader = SequentialReader {
        src,
        offset: SIZE_PREFIX_LEN,
        size: payload_len + SIZE_PREFIX_LEN,
    };
    // A non-empty payload opens with a count/type field that is not an
    // entry; an empty one holds nothing at all, not even the marker.
    if payload_len > 0 {
        reader.read_varint()?;
    }
    Ok(reader)
}

impl<R: Read> SequentialReader<R> {
    /// Create a reader over a source whose payload is `size` bytes long,
    /// with the cursor at offset zero.
    pub fn new(src: R, size: u64) -> Self {
        Self {
            src,
            offset: 0,
            size,
        }
    }

    /// Current cursor offset in bytes.
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Bytes left before the declared payload end.
    pub fn bytes_available(&self) -> u64 {
        self.size - self.offset
    }

    /// True once the cursor has reached the declared payload end.
    pub fn is_eof(&self) -> bool {
        self.offset >= self.size
    }

    fn read_byte(&mut self) -> Result<u8> {
        if self.bytes_available() < 1 {
            return Err(MmkvError::Eof);
        }
        let mut buf = [0u8; 1];
        self.src.read_exact(&mut buf)?;
        self.offset += 1;
        Ok(buf[0])
    }

    /// Decode an unsigned varint: 7 value bits per byte, low groups first,
    /// high bit set on every byte but the last.
    ///
    /// A continuation chain running past the declared payload end fails
    /// with [`MmkvError::Eof`]; a chain exceeding 64 value bits fails with
    /// [`MmkvError::VarintOverflow`].
    pub fn read_varint(&mut self) -> Result<u64> {
        let mut value = 0u64;
        let mut shift = 0u32;

        loop {
            let b = self.read_byte()?;
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

    /// Decode a varint consuming at most `max_bytes` bytes.
    ///
    /// Returns the value and the number of bytes consumed.  Fails with
    /// [`MmkvError::VarintTooLong`] when the budget runs out before a
    /// terminating byte (high bit clear) appears.
    pub fn read_varint_bounded(&mut self, max_bytes: u64) -> Result<(u64, u64)> {
        let mut value = 0u64;
        let mut shift = 0u32;
        let mut bytes_read = 0u64;

        while bytes_read < max_bytes {
            let b = self.read_byte()?;
            bytes_read += 1;

            let bits = u64::from(b & 0x7f);
            if shift >= 64 || (bits << shift) >> shift != bits {
                return Err(MmkvError::VarintOverflow);
            }
            value |= bits << shift;
            shift += 7;

            if b & 0x80 == 0 {
                return Ok((value, bytes_read));
            }
        }

        Err(MmkvError::VarintTooLong { max_bytes })
    }

    /// Read exactly `n` bytes.
    ///
    /// Fails with [`MmkvError::Eof`] when the declared payload never had
    /// `n` bytes left to request; a source that accepted the request but
    /// came up short is an IO `UnexpectedEof` instead.
    pub fn read_exact(&mut self, n: u64) -> Result<Vec<u8>> {
        if self.bytes_available() < n {
            return Err(MmkvError::Eof);
        }
        let mut buf = vec![0u8; n as usize];
        self.src.read_exact(&mut buf)?;
        self.offset += n;
        Ok(buf)
    }

    /// Read one length-prefixed string: a varint length, then that many
    /// bytes.  The bytes are not validated as UTF-8; non-UTF-8 content is
    /// converted lossily rather than rejected.
    pub fn read_string(&mut self) -> Result<String> {
        let len = self.read_varint()?;
        let data = self.read_exact(len)?;
        Ok(String::from_utf8_lossy(&data).into_owned())
    }

    /// Bounded variant of [`read_string`](Self::read_string): the length
    /// prefix and the content together consume at most `max_bytes` bytes.
    /// A declared length larger than the remaining budget is clamped to
    /// it, so the read can never escape the enclosing container.
    fn read_string_bounded(&mut self, max_bytes: u64) -> Result<(String, u64)> {
        let (len, prefix_len) = self.read_varint_bounded(max_bytes)?;
        let budget = max_bytes - prefix_len;
        let take = len.min(budget);

        let data = self.read_exact(take)?;
        Ok((
            String::from_utf8_lossy(&data).into_owned(),
            prefix_len + take,
        ))
    }

    /// Read one length-delimited value container.
    ///
    /// The outer varint declares the container length `L`.  Inside it, one
    /// bounded string field is decoded; if it consumes fewer than `L`
    /// bytes the remainder is skipped uninterpreted (the container leaves
    /// room for richer value encodings).  Afterwards the cursor must sit
    /// exactly `L` bytes past the container start — any mismatch is a
    /// fatal framing error.
    pub fn read_length_delimited_value(&mut self) -> Result<String> {
        let container_len = self.read_varint()?;
        if container_len == 0 {
            return Ok(String::new());
        }
        let expected = self
            .offset
            .checked_add(container_len)
            .ok_or(MmkvError::VarintOverflow)?;

        let (value, consumed) = self.read_string_bounded(container_len)?;
        if consumed < container_len {
            self.read_exact(container_len - consumed)?;
        }

        if self.offset != expected {
            return Err(MmkvError::OffsetMismatch {
                expected,
                actual: self.offset,
            });
        }
        Ok(value)
    }

    /// Decode a varint length and discard that many bytes without
    /// requiring them to be available.  Overshooting pins the cursor at
    /// the declared payload end.
    pub fn skip_container(&mut self) -> Result<()> {
        let len = self.read_varint()?;
        io::copy(&mut (&mut self.src).take(len), &mut io::sink())?;
        self.offset = self.offset.saturating_add(len).min(self.size);
        Ok(())
    }

    /// Decode every remaining (key, value) entry into a map.
    ///
    /// Keys repeat in append-only files; the last occurrence wins.
    pub fn read_to_map(&mut self) -> Result<HashMap<String, String>> {
        let mut map = HashMap::new();
        while !self.is_eof() {
            let key = self.read_string()?;
            let value = self.read_length_delimited_value()?;
            map.insert(key, value);
        }
        debug!("stream decode finished with {} live keys", map.len());
        Ok(map)
    }
}
