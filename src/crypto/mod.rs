//! Cryptographic primitives for MMKV decryption.
//!
//! This module provides:
//! - A transparent AES-128-CFB decrypting reader (`cfb::CfbReader`)
//! - Whole-payload in-place decryption (`cfb::decrypt_in_place`)
//! - The zero-pad/truncate key derivation policy (`cfb::pad_key`)

pub mod cfb;

// Re-export the most commonly used items so callers can write:
//   use crate::crypto::{CfbReader, decrypt_in_place, ...};
pub use cfb::{decrypt_in_place, pad_key, CfbReader, IV_LEN, KEY_LEN};
