//! End-to-end transfer workflow: filter, copy, relocate

use std::sync::Arc;
use std::time::Duration;

use tokio::time::timeout;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::config::Config;
use crate::models::error::TransferError;
use crate::models::types::{SweepSummary, TransferItem, TransferOutcome, TransferStage};
use crate::services::archiver::ArchiveRelocator;
use crate::services::copier::StreamingCopier;
use crate::services::filter::ExtensionFilter;
use crate::stores::destination_trait::DestinationStore;
use crate::stores::source_trait::SourceStore;
use crate::utils::metrics::Metrics;

const SKIP_EXTENSION_MISMATCH: &str = "extension mismatch";

/// Composes the per-item workflow and runs it in one of two modes: once for
/// a newly arrived object in the live container, or over every object found
/// by sweeping the scheduled container.
///
/// Known limitation: two invocations racing on the same object name are not
/// guarded against; the last writer wins in the destination bucket and the
/// loser of the archive delete sees a not-found error.
pub struct TransferOrchestrator {
    filter: ExtensionFilter,
    copier: StreamingCopier,
    archiver: ArchiveRelocator,
    source: Arc<dyn SourceStore>,
    live_container: String,
    scheduled_container: String,
    prefix: Option<String>,
    request_timeout: Duration,
}

impl TransferOrchestrator {
    pub fn new(
        config: &Config,
        source: Arc<dyn SourceStore>,
        destination: Arc<dyn DestinationStore>,
    ) -> Result<Self, TransferError> {
        let filter = ExtensionFilter::new(&config.source.file_ext)?;
        let copier = StreamingCopier::new(
            Arc::clone(&source),
            destination,
            config.destination.upload_retries,
            config.sweep.request_timeout_secs,
        );
        let archiver = ArchiveRelocator::new(
            Arc::clone(&source),
            config.source.scheduled_container.clone(),
            config.source.archive_container.clone(),
            config.sweep.request_timeout_secs,
        );

        Ok(Self {
            filter,
            copier,
            archiver,
            source,
            live_container: config.source.live_container.clone(),
            scheduled_container: config.source.scheduled_container.clone(),
            prefix: config.source.prefix.clone(),
            request_timeout: config.sweep.request_timeout_secs,
        })
    }

    /// Event-driven path: one object that just appeared in the live
    /// container. Uploads once, never archives. Errors propagate so the
    /// trigger adapter surfaces them as an unhandled failure.
    pub async fn transfer_single(
        &self,
        item: &TransferItem,
    ) -> Result<TransferOutcome, TransferError> {
        if !self.filter.matches(&item.name) {
            info!(name = %item.name, "Not going to transfer this object");
            let outcome = TransferOutcome::Skipped {
                reason: SKIP_EXTENSION_MISMATCH.to_string(),
            };
            Metrics::init().record_outcome(&outcome);
            return Ok(outcome);
        }

        self.copier.copy(&self.live_container, item).await?;
        let outcome = TransferOutcome::Uploaded;
        Metrics::init().record_outcome(&outcome);
        Ok(outcome)
    }

    /// Scheduled/on-demand path: sweep the scheduled container and process
    /// every matching object. Items are handled sequentially in listing
    /// order; one item's failure never aborts the rest of the batch.
    pub async fn sweep(&self, cancel: &CancellationToken) -> Result<SweepSummary, TransferError> {
        let run_id = Uuid::new_v4();
        let timer = Metrics::init().sweep_duration.start_timer();

        let items = timeout(
            self.request_timeout,
            self.source
                .list_objects(&self.scheduled_container, self.prefix.as_deref()),
        )
        .await
        .map_err(|_| TransferError::Listing {
            container: self.scheduled_container.clone(),
            message: format!("listing timed out after {:?}", self.request_timeout),
        })??;

        let mut summary = SweepSummary::new(run_id);
        summary.listed = items.len();
        info!(run_id = %run_id, listed = items.len(), "Sweep started");

        for object in items {
            if cancel.is_cancelled() {
                warn!(run_id = %run_id, "Sweep cancelled between items");
                summary.cancelled = true;
                break;
            }

            let item = TransferItem::new(object.key, object.size);
            let outcome = self.process_scheduled_item(&item).await;
            match &outcome {
                TransferOutcome::PartialFailure { stage, message } => {
                    error!(
                        run_id = %run_id,
                        name = %item.name,
                        stage = stage.as_str(),
                        error = %message,
                        "Item failed, continuing with the rest of the batch"
                    );
                }
                TransferOutcome::Skipped { .. } => {
                    info!(run_id = %run_id, name = %item.name, "Not going to transfer and archive this object");
                }
                _ => {}
            }
            Metrics::init().record_outcome(&outcome);
            summary.record(&outcome);
        }

        timer.observe_duration();
        info!(
            run_id = %run_id,
            listed = summary.listed,
            archived = summary.archived,
            skipped = summary.skipped,
            failed = summary.failed,
            "Sweep finished"
        );
        Ok(summary)
    }

    /// Full workflow for one item of a batch. Failures are folded into the
    /// outcome at the item boundary.
    async fn process_scheduled_item(&self, item: &TransferItem) -> TransferOutcome {
        if !self.filter.matches(&item.name) {
            return TransferOutcome::Skipped {
                reason: SKIP_EXTENSION_MISMATCH.to_string(),
            };
        }

        if let Err(e) = self.copier.copy(&self.scheduled_container, item).await {
            return TransferOutcome::PartialFailure {
                stage: TransferStage::Upload,
                message: e.to_string(),
            };
        }

        // Archival only after a genuine upload success.
        match self.archiver.relocate(&item.name).await {
            Ok(()) => TransferOutcome::ArchivedAndDeleted,
            Err(e) => {
                let stage = match &e {
                    TransferError::ArchiveDelete { .. } => TransferStage::ArchiveDelete,
                    _ => TransferStage::ArchiveCopy,
                };
                TransferOutcome::PartialFailure {
                    stage,
                    message: e.to_string(),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{
        AuthConfig, DestinationConfig, ServerConfig, SourceConfig, SweepConfig,
    };
    use crate::stores::memory::{MemoryDestinationStore, MemorySourceStore};

    fn test_config(prefix: Option<&str>) -> Config {
        Config {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
            },
            source: SourceConfig {
                connection_string: "UseDevelopmentStorage=true".to_string(),
                live_container: "live".to_string(),
                scheduled_container: "scheduled".to_string(),
                archive_container: "archive".to_string(),
                prefix: prefix.map(str::to_string),
                file_ext: "csv".to_string(),
            },
            destination: DestinationConfig {
                access_key: "ak".to_string(),
                secret_key: "sk".to_string(),
                bucket: "transfers".to_string(),
                region: "eu-central-1".to_string(),
                endpoint: None,
                path_style: false,
                upload_retries: 0,
            },
            sweep: SweepConfig::default(),
            auth: AuthConfig::default(),
        }
    }

    fn orchestrator(
        source: &Arc<MemorySourceStore>,
        destination: &Arc<MemoryDestinationStore>,
        prefix: Option<&str>,
    ) -> TransferOrchestrator {
        TransferOrchestrator::new(
            &test_config(prefix),
            Arc::clone(source) as Arc<dyn SourceStore>,
            Arc::clone(destination) as Arc<dyn DestinationStore>,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn single_item_uploads_matching_object() {
        let source = Arc::new(MemorySourceStore::new());
        let destination = Arc::new(MemoryDestinationStore::new());
        source.insert("live", "report.csv", b"1,2,3".to_vec()).await;

        let outcome = orchestrator(&source, &destination, None)
            .transfer_single(&TransferItem::new("report.csv", 5))
            .await
            .unwrap();

        assert_eq!(outcome, TransferOutcome::Uploaded);
        assert_eq!(destination.get("report.csv").await.unwrap(), b"1,2,3");
        // Single-item mode never archives or deletes.
        assert!(source.contains("live", "report.csv").await);
        assert!(!source.contains("archive", "report.csv").await);
    }

    #[tokio::test]
    async fn single_item_skips_mismatched_extension_without_side_effects() {
        let source = Arc::new(MemorySourceStore::new());
        let destination = Arc::new(MemoryDestinationStore::new());
        source.insert("live", "notes.txt", b"hello".to_vec()).await;

        let outcome = orchestrator(&source, &destination, None)
            .transfer_single(&TransferItem::new("notes.txt", 5))
            .await
            .unwrap();

        assert!(matches!(outcome, TransferOutcome::Skipped { .. }));
        assert!(destination.is_empty().await);
        assert!(source.contains("live", "notes.txt").await);
    }

    #[tokio::test]
    async fn single_item_propagates_upload_failure() {
        let source = Arc::new(MemorySourceStore::new());
        let destination = Arc::new(MemoryDestinationStore::new());
        source.insert("live", "report.csv", b"x".to_vec()).await;
        destination.fail_put_for("report.csv", u32::MAX).await;

        let err = orchestrator(&source, &destination, None)
            .transfer_single(&TransferItem::new("report.csv", 1))
            .await
            .unwrap_err();

        assert!(matches!(err, TransferError::DestinationWrite { .. }));
    }

    #[tokio::test]
    async fn sweep_transfers_and_archives_matching_objects() {
        let source = Arc::new(MemorySourceStore::new());
        let destination = Arc::new(MemoryDestinationStore::new());
        source.insert("scheduled", "a.csv", b"a".to_vec()).await;
        source.insert("scheduled", "b.csv", b"b".to_vec()).await;
        source.insert("scheduled", "notes.txt", b"n".to_vec()).await;

        let summary = orchestrator(&source, &destination, None)
            .sweep(&CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(summary.listed, 3);
        assert_eq!(summary.archived, 2);
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.failed, 0);

        assert!(destination.contains("a.csv").await);
        assert!(destination.contains("b.csv").await);
        assert!(!destination.contains("notes.txt").await);

        assert!(source.contains("archive", "a.csv").await);
        assert!(source.contains("archive", "b.csv").await);
        assert!(!source.contains("scheduled", "a.csv").await);
        assert!(!source.contains("scheduled", "b.csv").await);
        // Non-matching objects stay in place.
        assert!(source.contains("scheduled", "notes.txt").await);
    }

    #[tokio::test]
    async fn one_failed_upload_does_not_abort_the_batch() {
        let source = Arc::new(MemorySourceStore::new());
        let destination = Arc::new(MemoryDestinationStore::new());
        source.insert("scheduled", "a.csv", b"a".to_vec()).await;
        source.insert("scheduled", "b.csv", b"b".to_vec()).await;
        destination.fail_put_for("a.csv", u32::MAX).await;

        let summary = orchestrator(&source, &destination, None)
            .sweep(&CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(summary.failed, 1);
        assert_eq!(summary.archived, 1);
        // b.csv received its own independent outcome after a.csv failed.
        assert!(destination.contains("b.csv").await);
        assert!(source.contains("archive", "b.csv").await);
        // a.csv failed at upload, so it was neither archived nor deleted.
        assert!(source.contains("scheduled", "a.csv").await);
        assert!(!source.contains("archive", "a.csv").await);
    }

    #[tokio::test]
    async fn failed_archive_copy_keeps_source_but_upload_stands() {
        let source = Arc::new(MemorySourceStore::new());
        let destination = Arc::new(MemoryDestinationStore::new());
        source.insert("scheduled", "a.csv", b"a".to_vec()).await;
        source.insert("scheduled", "b.csv", b"b".to_vec()).await;
        source.fail_copy_for("a.csv").await;

        let summary = orchestrator(&source, &destination, None)
            .sweep(&CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(summary.failed, 1);
        assert_eq!(summary.archived, 1);

        // Both uploads happened before archival.
        assert!(destination.contains("a.csv").await);
        assert!(destination.contains("b.csv").await);

        // a.csv: copy failed, so it was not deleted and is not archived.
        assert!(source.contains("scheduled", "a.csv").await);
        assert!(!source.contains("archive", "a.csv").await);

        // b.csv: present only in the archive container.
        assert!(source.contains("archive", "b.csv").await);
        assert!(!source.contains("scheduled", "b.csv").await);
    }

    #[tokio::test]
    async fn sweep_respects_prefix() {
        let source = Arc::new(MemorySourceStore::new());
        let destination = Arc::new(MemoryDestinationStore::new());
        source
            .insert("scheduled", "reports/a.csv", b"a".to_vec())
            .await;
        source.insert("scheduled", "other/b.csv", b"b".to_vec()).await;

        let summary = orchestrator(&source, &destination, Some("reports/"))
            .sweep(&CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(summary.listed, 1);
        assert!(destination.contains("reports/a.csv").await);
        assert!(!destination.contains("other/b.csv").await);
    }

    #[tokio::test]
    async fn listing_failure_aborts_the_sweep() {
        let source = Arc::new(MemorySourceStore::new());
        let destination = Arc::new(MemoryDestinationStore::new());
        source.fail_listing_for("scheduled").await;

        let err = orchestrator(&source, &destination, None)
            .sweep(&CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(err, TransferError::Listing { .. }));
    }

    #[tokio::test]
    async fn cancelled_token_stops_the_sweep_between_items() {
        let source = Arc::new(MemorySourceStore::new());
        let destination = Arc::new(MemoryDestinationStore::new());
        source.insert("scheduled", "a.csv", b"a".to_vec()).await;
        source.insert("scheduled", "b.csv", b"b".to_vec()).await;

        let cancel = CancellationToken::new();
        cancel.cancel();

        let summary = orchestrator(&source, &destination, None)
            .sweep(&cancel)
            .await
            .unwrap();

        assert!(summary.cancelled);
        assert_eq!(summary.archived, 0);
        assert!(destination.is_empty().await);
    }
}
