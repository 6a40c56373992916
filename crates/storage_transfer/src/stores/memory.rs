//! In-memory store implementations
//!
//! Used by the test suite in place of the real backends. Fault injection is
//! per key, so tests can fail exactly one stage of one item and watch the
//! rest of a batch proceed.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::models::error::TransferError;
use crate::models::types::{BlobLocation, ObjectInfo};
use crate::stores::destination_trait::DestinationStore;
use crate::stores::source_trait::SourceStore;

/// Source store holding containers as ordered maps, so listings come back
/// in lexicographic key order like a flat blob listing does.
#[derive(Default)]
pub struct MemorySourceStore {
    containers: Arc<RwLock<HashMap<String, BTreeMap<String, Vec<u8>>>>>,
    fail_reads: Arc<RwLock<HashSet<String>>>,
    fail_copies: Arc<RwLock<HashSet<String>>>,
    fail_deletes: Arc<RwLock<HashSet<String>>>,
    fail_listing: Arc<RwLock<HashSet<String>>>,
}

impl MemorySourceStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, container: &str, key: &str, data: Vec<u8>) {
        let mut containers = self.containers.write().await;
        containers
            .entry(container.to_string())
            .or_default()
            .insert(key.to_string(), data);
    }

    pub async fn contains(&self, container: &str, key: &str) -> bool {
        let containers = self.containers.read().await;
        containers
            .get(container)
            .is_some_and(|c| c.contains_key(key))
    }

    pub async fn fail_read_for(&self, key: &str) {
        self.fail_reads.write().await.insert(key.to_string());
    }

    pub async fn fail_copy_for(&self, key: &str) {
        self.fail_copies.write().await.insert(key.to_string());
    }

    pub async fn fail_delete_for(&self, key: &str) {
        self.fail_deletes.write().await.insert(key.to_string());
    }

    pub async fn fail_listing_for(&self, container: &str) {
        self.fail_listing.write().await.insert(container.to_string());
    }
}

#[async_trait::async_trait]
impl SourceStore for MemorySourceStore {
    async fn list_objects(
        &self,
        container: &str,
        prefix: Option<&str>,
    ) -> Result<Vec<ObjectInfo>, TransferError> {
        if self.fail_listing.read().await.contains(container) {
            return Err(TransferError::Listing {
                container: container.to_string(),
                message: "injected listing failure".to_string(),
            });
        }

        let containers = self.containers.read().await;
        let objects = containers
            .get(container)
            .map(|entries| {
                entries
                    .iter()
                    .filter(|(key, _)| prefix.is_none_or(|p| key.starts_with(p)))
                    .map(|(key, data)| ObjectInfo {
                        key: key.clone(),
                        size: data.len() as u64,
                    })
                    .collect()
            })
            .unwrap_or_default();
        Ok(objects)
    }

    async fn get_object(&self, container: &str, key: &str) -> Result<Vec<u8>, TransferError> {
        if self.fail_reads.read().await.contains(key) {
            return Err(TransferError::SourceRead {
                name: key.to_string(),
                message: "injected read failure".to_string(),
            });
        }

        let containers = self.containers.read().await;
        containers
            .get(container)
            .and_then(|c| c.get(key))
            .cloned()
            .ok_or_else(|| TransferError::SourceRead {
                name: key.to_string(),
                message: format!("object not found in container '{}'", container),
            })
    }

    async fn copy_object(
        &self,
        from: &BlobLocation,
        to: &BlobLocation,
    ) -> Result<(), TransferError> {
        if self.fail_copies.read().await.contains(from.key.as_str()) {
            return Err(TransferError::ArchiveCopy {
                name: from.key.clone(),
                message: "injected copy failure".to_string(),
            });
        }

        let mut containers = self.containers.write().await;
        let data = containers
            .get(&from.container)
            .and_then(|c| c.get(&from.key))
            .cloned()
            .ok_or_else(|| TransferError::ArchiveCopy {
                name: from.key.clone(),
                message: format!("object not found in container '{}'", from.container),
            })?;
        containers
            .entry(to.container.clone())
            .or_default()
            .insert(to.key.clone(), data);
        Ok(())
    }

    async fn delete_object(&self, container: &str, key: &str) -> Result<(), TransferError> {
        if self.fail_deletes.read().await.contains(key) {
            return Err(TransferError::ArchiveDelete {
                name: key.to_string(),
                message: "injected delete failure".to_string(),
            });
        }

        let mut containers = self.containers.write().await;
        let removed = containers
            .get_mut(container)
            .and_then(|c| c.remove(key))
            .is_some();
        if removed {
            Ok(())
        } else {
            Err(TransferError::ArchiveDelete {
                name: key.to_string(),
                message: format!("object not found in container '{}'", container),
            })
        }
    }
}

/// Destination store holding one bucket. Put failures can be injected with
/// a remaining-failure count to exercise the retry policy.
#[derive(Default)]
pub struct MemoryDestinationStore {
    objects: Arc<RwLock<HashMap<String, Vec<u8>>>>,
    fail_puts: Arc<RwLock<HashMap<String, u32>>>,
}

impl MemoryDestinationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, key: &str) -> Option<Vec<u8>> {
        self.objects.read().await.get(key).cloned()
    }

    pub async fn contains(&self, key: &str) -> bool {
        self.objects.read().await.contains_key(key)
    }

    pub async fn len(&self) -> usize {
        self.objects.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.objects.read().await.is_empty()
    }

    /// Fail the next `count` puts for `key`, then let them succeed.
    pub async fn fail_put_for(&self, key: &str, count: u32) {
        self.fail_puts.write().await.insert(key.to_string(), count);
    }
}

#[async_trait::async_trait]
impl DestinationStore for MemoryDestinationStore {
    async fn put_object(
        &self,
        key: &str,
        data: Vec<u8>,
        _metadata: HashMap<String, String>,
    ) -> Result<(), TransferError> {
        {
            let mut fail_puts = self.fail_puts.write().await;
            if let Some(remaining) = fail_puts.get_mut(key) {
                if *remaining > 0 {
                    *remaining -= 1;
                    return Err(TransferError::DestinationWrite {
                        name: key.to_string(),
                        message: "injected write failure".to_string(),
                    });
                }
            }
        }

        self.objects.write().await.insert(key.to_string(), data);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn listing_is_lexicographic_and_prefix_filtered() {
        let store = MemorySourceStore::new();
        store.insert("scheduled", "b.csv", b"b".to_vec()).await;
        store.insert("scheduled", "a.csv", b"a".to_vec()).await;
        store
            .insert("scheduled", "reports/c.csv", b"c".to_vec())
            .await;

        let all = store.list_objects("scheduled", None).await.unwrap();
        let keys: Vec<_> = all.iter().map(|o| o.key.as_str()).collect();
        assert_eq!(keys, vec!["a.csv", "b.csv", "reports/c.csv"]);

        let filtered = store
            .list_objects("scheduled", Some("reports/"))
            .await
            .unwrap();
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].key, "reports/c.csv");
        assert_eq!(filtered[0].size, 1);
    }

    #[tokio::test]
    async fn copy_then_delete_moves_an_object() {
        let store = MemorySourceStore::new();
        store.insert("scheduled", "a.csv", b"data".to_vec()).await;

        store
            .copy_object(
                &BlobLocation::new("scheduled", "a.csv"),
                &BlobLocation::new("archive", "a.csv"),
            )
            .await
            .unwrap();
        store.delete_object("scheduled", "a.csv").await.unwrap();

        assert!(!store.contains("scheduled", "a.csv").await);
        assert!(store.contains("archive", "a.csv").await);
    }

    #[tokio::test]
    async fn injected_put_failures_run_out() {
        let dest = MemoryDestinationStore::new();
        dest.fail_put_for("a.csv", 1).await;

        let first = dest
            .put_object("a.csv", b"x".to_vec(), HashMap::new())
            .await;
        assert!(matches!(
            first,
            Err(TransferError::DestinationWrite { .. })
        ));

        let second = dest
            .put_object("a.csv", b"x".to_vec(), HashMap::new())
            .await;
        assert!(second.is_ok());
    }
}
