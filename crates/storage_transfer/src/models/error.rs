//! Error types for the transfer workflow

use thiserror::Error;

/// Failures produced by the transfer workflow. Read and write failures are
/// separate variants on purpose: the orchestrator only proceeds to archival
/// on a genuine upload success, and a failed archive copy must be told apart
/// from a failed delete when deciding whether data is at risk.
#[derive(Debug, Error)]
pub enum TransferError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Failed to read '{name}' from source store: {message}")]
    SourceRead { name: String, message: String },

    #[error("Failed to write '{name}' to destination store: {message}")]
    DestinationWrite { name: String, message: String },

    #[error("Failed to copy '{name}' to archive container: {message}")]
    ArchiveCopy { name: String, message: String },

    #[error("Failed to delete '{name}' from scheduled container: {message}")]
    ArchiveDelete { name: String, message: String },

    #[error("Failed to list container '{container}': {message}")]
    Listing { container: String, message: String },
}

impl TransferError {
    /// Metric label for the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            TransferError::ConfigError(_) => "config",
            TransferError::SourceRead { .. } => "source_read",
            TransferError::DestinationWrite { .. } => "destination_write",
            TransferError::ArchiveCopy { .. } => "archive_copy",
            TransferError::ArchiveDelete { .. } => "archive_delete",
            TransferError::Listing { .. } => "listing",
        }
    }
}
