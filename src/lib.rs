//! Read-only decoder for MMKV key-value store files.
//!
//! MMKV is an append-only binary key-value format used by mobile
//! applications for fast local persistence.  This crate decodes such a
//! file into an immutable in-memory mapping, optionally decrypting it
//! (AES-128-CFB) and validating it against its side-channel metadata
//! record (payload size + CRC32).
//!
//! Two decode paths are supported, matching the two on-disk variants:
//!
//! - [`vault::load_vault`] reads the whole payload into memory,
//!   validates it, decrypts it as one buffer (zero-padded password key)
//!   and decodes every entry into a [`vault::MemoryVault`].
//! - [`reader::open_stream`] decodes entries sequentially from the
//!   source, decrypting inline per read (raw 16-byte key taken as-is).
//!
//! ```no_run
//! use std::fs::File;
//! use mmkv_reader::{load_vault, LoadOptions, Vault};
//!
//! # fn main() -> mmkv_reader::Result<()> {
//! let file = File::open("userdata")?;
//! let vault = load_vault(file, &LoadOptions::default())?;
//! for key in vault.keys() {
//!     println!("{key} = {:?}", vault.get_string(&key));
//! }
//! # Ok(())
//! # }
//! ```

pub mod crypto;
pub mod errors;
pub mod metadata;
pub mod reader;
pub mod vault;

pub use errors::{MmkvError, Result};
pub use metadata::Metadata;
pub use reader::{open_stream, SequentialReader};
pub use vault::{load_vault, LoadOptions, MemoryVault, Vault};
