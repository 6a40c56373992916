//! Trait for the destination store (a single bucket)

use std::collections::HashMap;

use crate::models::error::TransferError;

/// Write-side of the transfer: one bucket, keyed by object name.
#[async_trait::async_trait]
pub trait DestinationStore: Send + Sync {
    /// Create or overwrite an object under `key`.
    async fn put_object(
        &self,
        key: &str,
        data: Vec<u8>,
        metadata: HashMap<String, String>,
    ) -> Result<(), TransferError>;
}
