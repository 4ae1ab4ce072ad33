use std::io;
use thiserror::Error;

/// Result type for archive operations
pub type Result<T> = std::result::Result<T, AtaError>;

/// Unified error type for all archive operations
#[derive(Debug, Error)]
pub enum AtaError {
    /// The container is not a readable archive (magic, version, truncation, bad names)
    #[error("Invalid archive format: {0}")]
    Format(String),

    #[error("Compression failed: {0}")]
    Compression(String),

    /// Decoded content does not hash to the digest stored for the record
    #[error("Checksum mismatch for {path}: expected {expected}, got {actual}")]
    Integrity {
        path: String,
        expected: String,
        actual: String,
    },

    #[error("Invalid input: {0}")]
    Input(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl From<toml::de::Error> for AtaError {
    fn from(err: toml::de::Error) -> Self {
        AtaError::Config(err.to_string())
    }
}
