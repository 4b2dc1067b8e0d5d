//! Shared error type for model loading.

use std::io;

/// Errors that can occur when loading a model in either format.
///
/// Every variant is terminal for the load attempt: no partially populated
/// model is ever returned.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// The input ended before a field could be read completely.
    #[error("model truncated while reading {field}: needed {needed} bytes, {available} available")]
    Truncated {
        field: &'static str,
        needed: usize,
        available: usize,
    },

    /// The header is structurally invalid.
    #[error("malformed header: {0}")]
    MalformedHeader(String),

    /// The stored header checksum disagrees with the one computed while reading.
    #[error("checksum mismatch: stored {expected:#010x}, computed {computed:#010x}")]
    ChecksumMismatch { expected: u32, computed: u32 },

    /// The model uses a feature this runtime deliberately does not implement.
    #[error("unsupported model feature: {0}")]
    Unsupported(String),

    /// A header or body value could not be parsed.
    #[error("invalid value for {field}: {message}")]
    InvalidValue {
        field: &'static str,
        message: String,
    },

    /// A weight record addresses a bucket outside the weight table.
    #[error("weight bucket {bucket} out of range for table of {table_size} entries")]
    BucketOutOfRange { bucket: u64, table_size: usize },

    /// I/O error from a reader-based entry point.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl LoadError {
    pub(crate) fn unsupported(what: impl Into<String>) -> Self {
        LoadError::Unsupported(what.into())
    }

    pub(crate) fn invalid(field: &'static str, message: impl Into<String>) -> Self {
        LoadError::InvalidValue {
            field,
            message: message.into(),
        }
    }
}
