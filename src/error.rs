//! Error types for resumable-upload
//!
//! Most protocol outcomes are reported as a [`ChunkStatus`](crate::types::ChunkStatus),
//! not an error: a rejected chunk or a missing chunk file on a probe is normal
//! protocol traffic. The variants here cover the failures that are NOT part of
//! the protocol — deployment misconfiguration and filesystem trouble during
//! assembly.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for resumable-upload operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for resumable-upload
#[derive(Debug, Error)]
pub enum Error {
    /// The upload destination directory does not exist at assembly time.
    ///
    /// This is a deployment misconfiguration, not a client-retryable
    /// condition: the engine refuses to create the destination directory
    /// itself and propagates this instead of a protocol status.
    #[error("upload directory does not exist: {path}")]
    UploadDirMissing {
        /// The configured upload directory that was not found
        path: PathBuf,
    },

    /// The assembled file could not be written.
    ///
    /// Recoverable: the engine leaves all chunk files in place and the
    /// session incomplete, so a later request can re-attempt assembly.
    #[error("assembly failed for {path}: {reason}")]
    Assembly {
        /// The destination path that could not be written
        path: PathBuf,
        /// The reason assembly failed
        reason: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// API server error
    #[error("API server error: {0}")]
    ApiServer(String),
}

impl Error {
    /// Whether the failure leaves the chunk directory intact for a retry.
    ///
    /// `Assembly` failures are retryable by design; everything else either
    /// happened before any destructive step or signals misconfiguration.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::Assembly { .. })
    }
}
