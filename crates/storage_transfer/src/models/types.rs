//! Core data types for the transfer workflow

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Coordinates of one object inside the source store. Container and key are
/// kept as a value type rather than interpolated strings so prefix and
/// extension matching always operate on the bare key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlobLocation {
    pub container: String,
    pub key: String,
}

impl BlobLocation {
    pub fn new(container: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            container: container.into(),
            key: key.into(),
        }
    }
}

impl std::fmt::Display for BlobLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.container, self.key)
    }
}

/// One object under consideration for transfer. Built from an object-created
/// event or from a container listing entry, and discarded once its outcome
/// has been produced.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TransferItem {
    /// Object key inside its container.
    pub name: String,
    /// Size in bytes, as reported by the event or listing.
    pub size: u64,
}

impl TransferItem {
    pub fn new(name: impl Into<String>, size: u64) -> Self {
        Self {
            name: name.into(),
            size,
        }
    }
}

/// Listing entry returned by the source store.
#[derive(Debug, Clone)]
pub struct ObjectInfo {
    pub key: String,
    pub size: u64,
}

/// Stage of the per-item workflow at which a failure occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum TransferStage {
    Upload,
    ArchiveCopy,
    ArchiveDelete,
}

impl TransferStage {
    pub fn as_str(self) -> &'static str {
        match self {
            TransferStage::Upload => "upload",
            TransferStage::ArchiveCopy => "archive_copy",
            TransferStage::ArchiveDelete => "archive_delete",
        }
    }
}

/// Per-item result of the workflow. Consumed only for logging and metrics;
/// the authoritative state lives in the two storage backends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum TransferOutcome {
    /// The extension filter rejected the object; nothing was written.
    Skipped { reason: String },
    /// Uploaded to the destination bucket (single-item mode never archives).
    Uploaded,
    /// Uploaded, copied to the archive container and removed from the
    /// scheduled container.
    ArchivedAndDeleted,
    /// The item failed partway through; `stage` says how far it got.
    PartialFailure {
        stage: TransferStage,
        message: String,
    },
}

impl TransferOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            TransferOutcome::Skipped { .. } => "skipped",
            TransferOutcome::Uploaded => "uploaded",
            TransferOutcome::ArchivedAndDeleted => "archived_and_deleted",
            TransferOutcome::PartialFailure { .. } => "partial_failure",
        }
    }
}

/// Counters for one batch sweep, logged at the end of the run.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SweepSummary {
    pub run_id: Uuid,
    pub listed: usize,
    pub skipped: usize,
    pub archived: usize,
    pub failed: usize,
    pub cancelled: bool,
}

impl SweepSummary {
    pub fn new(run_id: Uuid) -> Self {
        Self {
            run_id,
            listed: 0,
            skipped: 0,
            archived: 0,
            failed: 0,
            cancelled: false,
        }
    }

    pub fn record(&mut self, outcome: &TransferOutcome) {
        match outcome {
            TransferOutcome::Skipped { .. } => self.skipped += 1,
            TransferOutcome::ArchivedAndDeleted => self.archived += 1,
            TransferOutcome::PartialFailure { .. } => self.failed += 1,
            // Produced by single-item mode only.
            TransferOutcome::Uploaded => {}
        }
    }
}

/// Payload of an object-created notification for the live container.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BlobCreatedEvent {
    /// Object key inside the live container.
    pub name: String,
    /// Size in bytes.
    #[serde(default)]
    pub size: u64,
}
