//! Azure Blob Storage implementation of the source store

use azure_storage::ConnectionString;
use azure_storage_blobs::prelude::*;
use futures::StreamExt;
use tracing::info;

use crate::models::error::TransferError;
use crate::models::types::{BlobLocation, ObjectInfo};
use crate::stores::source_trait::SourceStore;

/// Source store backed by one Azure Storage account. The live, scheduled
/// and archive containers all live in this account, which is what makes the
/// archive step a server-side copy.
pub struct AzureBlobStore {
    service: BlobServiceClient,
}

impl AzureBlobStore {
    pub fn from_connection_string(connection_string: &str) -> Result<Self, TransferError> {
        let parsed = ConnectionString::new(connection_string)
            .map_err(|e| TransferError::ConfigError(format!("invalid connection string: {}", e)))?;
        let account = parsed
            .account_name
            .ok_or_else(|| {
                TransferError::ConfigError("connection string has no account name".to_string())
            })?
            .to_string();
        let credentials = parsed.storage_credentials().map_err(|e| {
            TransferError::ConfigError(format!("invalid storage credentials: {}", e))
        })?;

        info!(account = %account, "Azure blob source store initialized");

        Ok(Self {
            service: BlobServiceClient::new(account, credentials),
        })
    }

    fn blob_client(&self, container: &str, key: &str) -> BlobClient {
        self.service.container_client(container).blob_client(key)
    }
}

#[async_trait::async_trait]
impl SourceStore for AzureBlobStore {
    async fn list_objects(
        &self,
        container: &str,
        prefix: Option<&str>,
    ) -> Result<Vec<ObjectInfo>, TransferError> {
        let container_client = self.service.container_client(container);
        let mut builder = container_client.list_blobs();
        if let Some(p) = prefix {
            builder = builder.prefix(p.to_string());
        }

        let mut objects = Vec::new();
        let mut pages = builder.into_stream();
        while let Some(page) = pages.next().await {
            let page = page.map_err(|e| TransferError::Listing {
                container: container.to_string(),
                message: e.to_string(),
            })?;
            for blob in page.blobs.blobs() {
                objects.push(ObjectInfo {
                    key: blob.name.clone(),
                    size: blob.properties.content_length,
                });
            }
        }
        Ok(objects)
    }

    async fn get_object(&self, container: &str, key: &str) -> Result<Vec<u8>, TransferError> {
        self.blob_client(container, key)
            .get_content()
            .await
            .map_err(|e| TransferError::SourceRead {
                name: key.to_string(),
                message: e.to_string(),
            })
    }

    async fn copy_object(
        &self,
        from: &BlobLocation,
        to: &BlobLocation,
    ) -> Result<(), TransferError> {
        let source_url = self
            .blob_client(&from.container, &from.key)
            .url()
            .map_err(|e| TransferError::ArchiveCopy {
                name: from.key.clone(),
                message: e.to_string(),
            })?;

        self.blob_client(&to.container, &to.key)
            .copy(source_url)
            .await
            .map_err(|e| TransferError::ArchiveCopy {
                name: from.key.clone(),
                message: e.to_string(),
            })?;
        Ok(())
    }

    async fn delete_object(&self, container: &str, key: &str) -> Result<(), TransferError> {
        self.blob_client(container, key)
            .delete()
            .await
            .map_err(|e| TransferError::ArchiveDelete {
                name: key.to_string(),
                message: e.to_string(),
            })?;
        Ok(())
    }
}
