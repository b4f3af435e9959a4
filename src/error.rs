use thiserror::Error;

/// Errors returned while building, loading or persisting a suffix index.
#[derive(Debug, Error)]
pub enum IndexError {
    /// I/O error other than a cache miss.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Persisted index is truncated, oversized or internally inconsistent.
    #[error("corrupt index: {0}")]
    Corrupt(String),

    /// Unknown magic, version or element width.
    #[error("unsupported index format: {0}")]
    UnsupportedFormat(String),

    /// Cached index was built from a different reference.
    #[error("stale index: {0}")]
    StaleIndex(String),

    /// Query window `k` does not fit the reference.
    #[error("invalid window k={k} for reference of length {n}")]
    InvalidWindow { k: usize, n: usize },

    #[error("reference sequence is empty")]
    EmptyReference,

    /// Reference longer than the 32-bit in-memory index width.
    #[error("reference of length {0} exceeds the 32-bit index width")]
    TooLarge(usize),

    #[error("header encoding error: {0}")]
    Encode(#[from] bincode::Error),
}

pub type Result<T> = std::result::Result<T, IndexError>;
