//! Trait for the source store (containers of pending and archived objects)

use crate::models::error::TransferError;
use crate::models::types::{BlobLocation, ObjectInfo};

/// Operations against the origin storage backend. Containers are flat
/// namespaces; listing order is whatever the backend returns and is
/// preserved downstream.
#[async_trait::async_trait]
pub trait SourceStore: Send + Sync {
    /// Flat listing of a container, optionally restricted to a key prefix.
    async fn list_objects(
        &self,
        container: &str,
        prefix: Option<&str>,
    ) -> Result<Vec<ObjectInfo>, TransferError>;

    /// Read the full content of one object.
    async fn get_object(&self, container: &str, key: &str) -> Result<Vec<u8>, TransferError>;

    /// Server-side copy between two containers of the same store. No
    /// download/upload round trip.
    async fn copy_object(
        &self,
        from: &BlobLocation,
        to: &BlobLocation,
    ) -> Result<(), TransferError>;

    /// Remove one object.
    async fn delete_object(&self, container: &str, key: &str) -> Result<(), TransferError>;
}
