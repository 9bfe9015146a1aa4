//! Error types for storage operations.

use std::path::Path;

/// Result type for storage operations.
pub type FileResult<T> = Result<T, FileStorageError>;

/// Errors surfaced by the storage contract.
///
/// Best-effort queries (object size, human-readable size) never produce
/// these; they log the underlying failure and return a sentinel instead.
/// Every other operation propagates the specific kind so callers can branch
/// on it.
#[derive(Debug, thiserror::Error)]
pub enum FileStorageError {
    /// No object exists at the given location.
    #[error("file not found: {path}")]
    NotFound { path: String },

    /// Backend-side failure: auth, network, throttling.
    #[error("storage service error for {path}")]
    Service {
        path: String,
        #[source]
        source: anyhow::Error,
    },

    /// Local disk failure, with context naming the side of the transfer
    /// that failed.
    #[error("{context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    /// Extension mismatch or unrecognized extension in a file group.
    #[error("{0}")]
    Validation(String),

    /// Malformed credentials/bucket/container at construction time.
    #[error("invalid storage configuration: {0}")]
    Configuration(String),
}

impl FileStorageError {
    pub(crate) fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Map an `object_store` failure onto the taxonomy, keeping the vendor
    /// error as the source chain.
    pub(crate) fn from_object_store(path: &Path, err: object_store::Error) -> Self {
        match err {
            object_store::Error::NotFound { .. } => Self::NotFound {
                path: path.display().to_string(),
            },
            other => Self::Service {
                path: path.display().to_string(),
                source: anyhow::Error::from(other),
            },
        }
    }
}
