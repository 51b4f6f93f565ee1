use thiserror::Error;

use mural_shared::error::ModelError;

/// Errors produced by backend services.
///
/// `Display` output is what users see when a call fails, so variants carry
/// the service's own message verbatim.
#[derive(Error, Debug)]
pub enum BackendError {
    /// Authentication failure, e.g. `auth/invalid-credential`.
    #[error("{message} ({code})")]
    Auth { code: String, message: String },

    /// The service refused the operation.
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// Nothing stored at the requested location.
    #[error("Not found: {0}")]
    NotFound(String),

    /// A record or blob path that violates the service's naming rules.
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("Blob too large: {size} bytes (max {max})")]
    BlobTooLarge { size: usize, max: usize },

    /// Blob storage failure (I/O, directory creation, ...).
    #[error("Storage error: {0}")]
    Storage(String),

    /// A record could not be encoded or decoded.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// SQLite error from the preference store.
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to determine a platform data directory.
    #[error("Could not determine application data directory")]
    NoDataDir,

    #[error("Migration error: {0}")]
    Migration(String),
}

impl BackendError {
    pub fn auth(code: &str, message: &str) -> Self {
        Self::Auth {
            code: code.to_string(),
            message: message.to_string(),
        }
    }
}

impl From<ModelError> for BackendError {
    fn from(e: ModelError) -> Self {
        match e {
            ModelError::InvalidPath(p) => Self::InvalidPath(p),
            other => Self::Storage(other.to_string()),
        }
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, BackendError>;
