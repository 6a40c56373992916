//! Streamed copy from a source container to the destination bucket

use std::collections::HashMap;
use std::io::Cursor;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::timeout;
use tracing::{info, warn};

use crate::models::error::TransferError;
use crate::models::types::TransferItem;
use crate::stores::destination_trait::DestinationStore;
use crate::stores::source_trait::SourceStore;
use crate::utils::metrics::Metrics;

/// Copies one object at a time: full download into a transient buffer, then
/// an upload of that buffer under the same key. The source object is never
/// touched.
pub struct StreamingCopier {
    source: Arc<dyn SourceStore>,
    destination: Arc<dyn DestinationStore>,
    upload_retries: u32,
    request_timeout: Duration,
}

impl StreamingCopier {
    pub fn new(
        source: Arc<dyn SourceStore>,
        destination: Arc<dyn DestinationStore>,
        upload_retries: u32,
        request_timeout: Duration,
    ) -> Self {
        Self {
            source,
            destination,
            upload_retries,
            request_timeout,
        }
    }

    pub async fn copy(&self, container: &str, item: &TransferItem) -> Result<(), TransferError> {
        let data = timeout(
            self.request_timeout,
            self.source.get_object(container, &item.name),
        )
        .await
        .map_err(|_| TransferError::SourceRead {
            name: item.name.clone(),
            message: format!("download timed out after {:?}", self.request_timeout),
        })??;

        // Rewind the transient buffer before the upload phase; the write
        // must start from the first byte that was downloaded.
        let mut buffer = Cursor::new(data);
        buffer.set_position(0);
        let payload = buffer.into_inner();
        let size = payload.len() as u64;

        let mut attempt: u32 = 0;
        loop {
            let result = timeout(
                self.request_timeout,
                self.destination
                    .put_object(&item.name, payload.clone(), HashMap::new()),
            )
            .await
            .unwrap_or_else(|_| {
                Err(TransferError::DestinationWrite {
                    name: item.name.clone(),
                    message: format!("upload timed out after {:?}", self.request_timeout),
                })
            });

            match result {
                Ok(()) => {
                    Metrics::init().bytes_uploaded.inc_by(size as f64);
                    info!(name = %item.name, size = size, "File uploaded to destination bucket");
                    return Ok(());
                }
                Err(e) if attempt < self.upload_retries => {
                    attempt += 1;
                    warn!(
                        name = %item.name,
                        attempt = attempt,
                        error = %e,
                        "Upload failed, retrying"
                    );
                }
                Err(e) => return Err(e),
            }
        }
    }
}
