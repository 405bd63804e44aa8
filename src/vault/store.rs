//! The immutable in-memory vault produced by a successful load.

use std::collections::HashMap;

use crate::errors::{MmkvError, Result};

use super::wire::WireReader;
use super::Vault;

/// Immutable key → raw-value mapping.
///
/// Built once by the loader and never mutated afterwards, so it is safe
/// to share across threads for read-only access.  Raw values are stored
/// exactly as decoded: still wrapped in one length-delimited level, which
/// [`get_bytes`](Vault::get_bytes) unwraps on demand.
#[derive(Debug)]
pub struct MemoryVault {
    entries: HashMap<String, Vec<u8>>,
}

impl MemoryVault {
    /// Build a vault from decoded entries, in physical file order.
    /// Duplicate keys collapse to the last occurrence.
    pub(crate) fn from_entries(entries: Vec<(String, Vec<u8>)>) -> Self {
        let mut map = HashMap::with_capacity(entries.len());
        for (key, value) in entries {
            map.insert(key, value);
        }
        Self { entries: map }
    }

    /// Number of live keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Vault for MemoryVault {
    fn keys(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }

    fn get_raw(&self, key: &str) -> Option<&[u8]> {
        self.entries.get(key).map(Vec::as_slice)
    }

    fn get_bytes(&self, key: &str) -> Result<Vec<u8>> {
        let raw = self
            .entries
            .get(key)
            .ok_or_else(|| MmkvError::KeyNotFound(key.to_string()))?;

        let mut rd = WireReader::new(raw);
        let value = rd
            .read_length_delimited()
            .map_err(|_| MmkvError::MalformedValue(key.to_string()))?;
        Ok(value.to_vec())
    }

    fn get_string(&self, key: &str) -> Result<String> {
        let bytes = self.get_bytes(key)?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}
