//! Relocation of transferred objects into the archive container

use std::sync::Arc;
use std::time::Duration;

use tokio::time::timeout;
use tracing::info;

use crate::models::error::TransferError;
use crate::models::types::BlobLocation;
use crate::stores::source_trait::SourceStore;

/// Approximates an atomic move inside the source store: server-side copy
/// from the scheduled container to the archive container, then delete of
/// the original.
///
/// Ordering invariant: the delete is never attempted until the copy has
/// been observed to succeed. A failed copy short-circuits, leaving the
/// object in the scheduled container; a failed delete after a successful
/// copy leaves a recoverable duplicate. Over-retention is preferred to
/// loss.
pub struct ArchiveRelocator {
    source: Arc<dyn SourceStore>,
    scheduled_container: String,
    archive_container: String,
    request_timeout: Duration,
}

impl ArchiveRelocator {
    pub fn new(
        source: Arc<dyn SourceStore>,
        scheduled_container: impl Into<String>,
        archive_container: impl Into<String>,
        request_timeout: Duration,
    ) -> Self {
        Self {
            source,
            scheduled_container: scheduled_container.into(),
            archive_container: archive_container.into(),
            request_timeout,
        }
    }

    pub async fn relocate(&self, name: &str) -> Result<(), TransferError> {
        let from = BlobLocation::new(&self.scheduled_container, name);
        let to = BlobLocation::new(&self.archive_container, name);

        timeout(self.request_timeout, self.source.copy_object(&from, &to))
            .await
            .map_err(|_| TransferError::ArchiveCopy {
                name: name.to_string(),
                message: format!("copy timed out after {:?}", self.request_timeout),
            })??;
        info!(name = %name, archive = %self.archive_container, "File copied to archive container");

        timeout(
            self.request_timeout,
            self.source.delete_object(&self.scheduled_container, name),
        )
        .await
        .map_err(|_| TransferError::ArchiveDelete {
            name: name.to_string(),
            message: format!("delete timed out after {:?}", self.request_timeout),
        })??;
        info!(name = %name, scheduled = %self.scheduled_container, "File deleted from scheduled container");

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stores::memory::MemorySourceStore;

    fn relocator(source: &Arc<MemorySourceStore>) -> ArchiveRelocator {
        ArchiveRelocator::new(
            Arc::clone(source) as Arc<dyn SourceStore>,
            "scheduled",
            "archive",
            Duration::from_secs(5),
        )
    }

    #[tokio::test]
    async fn relocate_copies_then_deletes() {
        let source = Arc::new(MemorySourceStore::new());
        source.insert("scheduled", "a.csv", b"data".to_vec()).await;

        relocator(&source).relocate("a.csv").await.unwrap();

        assert!(!source.contains("scheduled", "a.csv").await);
        assert!(source.contains("archive", "a.csv").await);
    }

    #[tokio::test]
    async fn failed_copy_skips_delete_and_keeps_the_source() {
        let source = Arc::new(MemorySourceStore::new());
        source.insert("scheduled", "a.csv", b"data".to_vec()).await;
        source.fail_copy_for("a.csv").await;

        let err = relocator(&source).relocate("a.csv").await.unwrap_err();

        assert!(matches!(err, TransferError::ArchiveCopy { .. }));
        // The object must still exist somewhere: present in scheduled,
        // absent from archive.
        assert!(source.contains("scheduled", "a.csv").await);
        assert!(!source.contains("archive", "a.csv").await);
    }

    #[tokio::test]
    async fn failed_delete_leaves_a_recoverable_duplicate() {
        let source = Arc::new(MemorySourceStore::new());
        source.insert("scheduled", "a.csv", b"data".to_vec()).await;
        source.fail_delete_for("a.csv").await;

        let err = relocator(&source).relocate("a.csv").await.unwrap_err();

        assert!(matches!(err, TransferError::ArchiveDelete { .. }));
        assert!(source.contains("scheduled", "a.csv").await);
        assert!(source.contains("archive", "a.csv").await);
    }
}
