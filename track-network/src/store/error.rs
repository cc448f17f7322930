//! Persistence error types.

use std::path::PathBuf;

use crate::domain::NetworkError;

/// Errors that can occur when saving or loading a network.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Writing the document failed
    #[error("failed to serialize network: {0}")]
    Serialize(#[source] serde_json::Error),

    /// The input is not a well-formed network document
    #[error("failed to deserialize network: {0}")]
    Deserialize(#[source] serde_json::Error),

    /// The document parsed but describes an impossible network
    #[error("network document is inconsistent: {0}")]
    Inconsistent(#[from] NetworkError),

    /// Opening or creating a file failed
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl StoreError {
    /// Returns true for failures while writing.
    pub fn is_serialization(&self) -> bool {
        matches!(self, StoreError::Serialize(_))
    }

    /// Returns true for failures while reading, including bad documents.
    pub fn is_deserialization(&self) -> bool {
        matches!(self, StoreError::Deserialize(_) | StoreError::Inconsistent(_))
    }
}
