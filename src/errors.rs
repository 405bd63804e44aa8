use thiserror::Error;

/// All errors that can occur while decoding an MMKV file.
#[derive(Debug, Error)]
pub enum MmkvError {
    // --- IO errors ---
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The declared payload size was exhausted before the read could start.
    /// Distinct from a short read out of the source itself, which surfaces
    /// as `Io` with `ErrorKind::UnexpectedEof`.
    #[error("End of payload reached")]
    Eof,

    // --- Format errors ---
    #[error("Varint exceeded its byte budget of {max_bytes}")]
    VarintTooLong { max_bytes: u64 },

    #[error("Varint does not fit in 64 bits")]
    VarintOverflow,

    #[error("Container framing mismatch (expected offset {expected}, actual {actual})")]
    OffsetMismatch { expected: u64, actual: u64 },

    #[error("Length-delimited field wants {wanted} bytes but only {available} remain")]
    TruncatedField { wanted: u64, available: u64 },

    #[error("Payload of {len} bytes is too short to hold the entry marker")]
    TruncatedPayload { len: usize },

    // --- Integrity errors ---
    #[error("Payload size mismatch — file declares {declared} bytes, metadata records {recorded}")]
    SizeMismatch { declared: u32, recorded: u32 },

    #[error("CRC32 mismatch — computed {computed:#010x}, metadata records {recorded:#010x}")]
    ChecksumMismatch { computed: u32, recorded: u32 },

    #[error("Metadata record too short: got {len} bytes, need {need}")]
    TruncatedMetadata { len: usize, need: usize },

    // --- Crypto errors ---
    #[error("IV must be 16 bytes, got {0}")]
    InvalidIvLength(usize),

    #[error("Raw key must be 16 bytes, got {0}")]
    InvalidKeyLength(usize),

    #[error("Password supplied but no metadata to take the IV from")]
    MissingIv,

    // --- Lookup errors (recoverable) ---
    #[error("Key '{0}' not found")]
    KeyNotFound(String),

    #[error("Value for key '{0}' is not a valid length-delimited field")]
    MalformedValue(String),
}

/// Convenience type alias for decoder results.
pub type Result<T> = std::result::Result<T, MmkvError>;
