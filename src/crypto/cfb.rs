//! AES-128-CFB stream decryption.
//!
//! MMKV encrypts with AES-128 in CFB mode, which behaves as a synchronous
//! stream cipher: keystream bytes are produced in order and each must be
//! consumed exactly once.  `CfbReader` wraps a byte source and decrypts
//! transparently; `decrypt_in_place` handles the whole-payload variant.

use std::fmt;
use std::io::{self, Read};

use aes::Aes128;
use cfb_mode::cipher::KeyIvInit;
use cfb_mode::BufDecryptor;
use zeroize::Zeroizing;

use crate::errors::{MmkvError, Result};

/// AES-128 key length in bytes.
pub const KEY_LEN: usize = 16;

/// CFB initialization vector length (one AES block).
pub const IV_LEN: usize = 16;

type Aes128CfbDec = BufDecryptor<Aes128>;

/// A reader that decrypts AES-128-CFB ciphertext as it is read.
///
/// Keystream state is strictly sequential, so a `CfbReader` must not be
/// shared, seeked, or read out of order.  Every `read` call fills the
/// destination buffer completely; a source that comes up short is an
/// `UnexpectedEof` IO error, never a silently padded buffer, because a
/// partial fill would desynchronize the keystream.
pub struct CfbReader<R> {
    src: R,
    stream: Aes128CfbDec,
}

// Manual impl: neither the cipher state nor the source should be printed.
impl<R> fmt::Debug for CfbReader<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CfbReader").finish_non_exhaustive()
    }
}

impl<R: Read> CfbReader<R> {
    /// Build a decryptor from a raw key that must already be exactly
    /// 16 bytes.  Used by the inline per-record encryption path, where
    /// the caller supplies the cipher key as-is.
    pub fn with_raw_key(src: R, key: &[u8], iv: &[u8]) -> Result<Self> {
        if key.len() != KEY_LEN {
            return Err(MmkvError::InvalidKeyLength(key.len()));
        }
        Self::build(src, key, iv)
    }

    /// Build a decryptor from a password of any length, zero-padded or
    /// truncated to 16 bytes.  Used by the whole-payload encryption path.
    pub fn with_padded_key(src: R, password: &[u8], iv: &[u8]) -> Result<Self> {
        let key = pad_key(password);
        Self::build(src, &key[..], iv)
    }

    fn build(src: R, key: &[u8], iv: &[u8]) -> Result<Self> {
        if iv.len() != IV_LEN {
            return Err(MmkvError::InvalidIvLength(iv.len()));
        }
        let stream = Aes128CfbDec::new_from_slices(key, iv)
            .map_err(|_| MmkvError::InvalidKeyLength(key.len()))?;
        Ok(Self { src, stream })
    }
}

impl<R: Read> Read for CfbReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        // Exact-size read: short reads would desynchronize the keystream.
        self.src.read_exact(buf)?;
        self.stream.decrypt(buf);
        Ok(buf.len())
    }
}

/// Decrypt an entire payload buffer in place with the padded-key policy.
pub fn decrypt_in_place(password: &[u8], iv: &[u8], buf: &mut [u8]) -> Result<()> {
    if iv.len() != IV_LEN {
        return Err(MmkvError::InvalidIvLength(iv.len()));
    }
    let key = pad_key(password);
    let mut stream = Aes128CfbDec::new_from_slices(&key[..], iv)
        .map_err(|_| MmkvError::InvalidKeyLength(key.len()))?;
    stream.decrypt(buf);
    Ok(())
}

/// Copy a password into a zero-initialized 16-byte key buffer.
///
/// Passwords longer than 16 bytes are truncated; shorter ones are
/// zero-padded on the right.  The buffer is zeroized on drop.
pub fn pad_key(password: &[u8]) -> Zeroizing<[u8; KEY_LEN]> {
    let mut key = Zeroizing::new([0u8; KEY_LEN]);
    let n = password.len().min(KEY_LEN);
    key[..n].copy_from_slice(&password[..n]);
    key
}
