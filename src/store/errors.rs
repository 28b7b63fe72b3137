//! # Record Store Errors

use std::io;

use thiserror::Error;

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Record store errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error on table '{table}': {source}")]
    Io {
        table: String,
        #[source]
        source: io::Error,
    },

    #[error("Malformed record on line {line}: {reason}")]
    Malformed { line: usize, reason: String },

    #[error("Checksum mismatch on line {line}: computed {computed:08x}, stored {stored:08x}")]
    ChecksumMismatch {
        line: usize,
        computed: u32,
        stored: u32,
    },

    #[error("Record is missing key column '{0}'")]
    MissingKey(String),

    #[error("Serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl StoreError {
    /// Wrap an I/O failure with the owning table's name.
    pub fn io(table: impl Into<String>, source: io::Error) -> Self {
        StoreError::Io {
            table: table.into(),
            source,
        }
    }
}
