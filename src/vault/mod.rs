//! Vault module — decoded key-value storage.
//!
//! This module provides:
//! - The read-only `Vault` trait and its in-memory implementation (`store`)
//! - Length-delimited wire decoding over flat buffers (`wire`)
//! - The validating load pipeline (`loader`)

pub mod loader;
pub mod store;
pub mod wire;

// Re-export the most commonly used items.
pub use loader::{load_vault, LoadOptions};
pub use store::MemoryVault;

use crate::errors::Result;

/// Read access to a loaded vault.
///
/// The one concrete implementation is [`MemoryVault`]; the trait exists
/// so consumers can substitute synthetic vaults in tests.
pub trait Vault {
    /// All live keys, in no particular order.
    fn keys(&self) -> Vec<String>;

    /// The stored raw value exactly as decoded — still one
    /// length-delimited wrapping level deep.
    fn get_raw(&self, key: &str) -> Option<&[u8]>;

    /// The natural value bytes: the raw value with its inner
    /// length-delimited wrapping removed.
    fn get_bytes(&self, key: &str) -> Result<Vec<u8>>;

    /// [`get_bytes`](Self::get_bytes) interpreted as text (lossily when
    /// not valid UTF-8).
    fn get_string(&self, key: &str) -> Result<String>;
}
