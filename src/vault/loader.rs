//! The vault load pipeline.
//!
//! Loading runs a fixed sequence of stages and aborts on the first
//! failure — a caller either receives a complete, validated vault or an
//! error, never a partially populated one:
//!
//! ```text
//! read size → read payload → validate size → validate checksum
//!           → decrypt → decode entries → ready
//! ```
//!
//! Size and checksum validation only run when metadata is supplied;
//! decryption only runs when a non-empty password is supplied.  The
//! checksum is computed over the payload exactly as read, before any
//! decryption.

use std::io::Read;

use log::debug;

use crate::crypto::decrypt_in_place;
use crate::errors::{MmkvError, Result};
use crate::metadata::Metadata;

use super::store::MemoryVault;
use super::wire::decode_entries;

/// Length of the non-conformant count/type field at the start of every
/// payload.  Its wire type lies, so it is skipped rather than decoded.
const ENTRY_MARKER_LEN: usize = 4;

/// Optional inputs to [`load_vault`].
///
/// The loader's behavior is a pure function of the payload source and
/// these options.  With no metadata the in-band size prefix is trusted
/// as-is and no integrity validation occurs.
#[derive(Default)]
pub struct LoadOptions<'a> {
    /// Decryption password for whole-payload encrypted files.  `None` or
    /// empty means the payload is plaintext.
    pub password: Option<&'a [u8]>,
    /// Side-channel metadata to validate against, and the IV source when
    /// a password is supplied.
    pub metadata: Option<Metadata>,
}

/// Load a vault from a payload source.
///
/// See the module docs for the stage sequence.  All failures are fatal
/// to the whole load.
pub fn load_vault<R: Read>(mut src: R, opts: &LoadOptions<'_>) -> Result<MemoryVault> {
    // Read size.
    let mut size_buf = [0u8; 4];
    src.read_exact(&mut size_buf)?;
    let declared = u32::from_le_bytes(size_buf);

    // Validate size.
    if let Some(m) = &opts.metadata {
        if declared != m.actual_size {
            return Err(MmkvError::SizeMismatch {
                declared,
                recorded: m.actual_size,
            });
        }
    }

    // Read payload. A short read here is a fatal IO error.
    let mut buf = vec![0u8; declared as usize];
    src.read_exact(&mut buf)?;

    // Validate checksum, over the bytes as stored.
    if let Some(m) = &opts.metadata {
        let computed = crc32fast::hash(&buf);
        if computed != m.crc32 {
            return Err(MmkvError::ChecksumMismatch {
                computed,
                recorded: m.crc32,
            });
        }
    }

    // Decrypt the whole payload in place.
    if let Some(password) = opts.password.filter(|p| !p.is_empty()) {
        let m = opts.metadata.as_ref().ok_or(MmkvError::MissingIv)?;
        decrypt_in_place(password, &m.iv, &mut buf)?;
        debug!("decrypted {declared} byte payload");
    }

    // Decode entries. An empty payload is an empty vault; anything
    // shorter than the marker cannot be a valid file.
    let entries = if buf.is_empty() {
        Vec::new()
    } else if buf.len() < ENTRY_MARKER_LEN {
        return Err(MmkvError::TruncatedPayload { len: buf.len() });
    } else {
        decode_entries(&buf[ENTRY_MARKER_LEN..])?
    };

    debug!("loaded vault with {} entries", entries.len());
    Ok(MemoryVault::from_entries(entries))
}
