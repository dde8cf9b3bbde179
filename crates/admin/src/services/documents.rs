//! Document storage collaborator.
//!
//! Storage mechanics live outside the workflow. The workflow hands over a
//! category, a file name and the raw bytes, and only keeps the returned
//! storage key and size.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, instrument};

use urbanplan_core::{DocumentCategory, DocumentId};

/// Receipt returned by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredDocument {
    pub key: String,
    pub size: u64,
}

/// Errors from the document store.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StorageError {
    /// The upload carried no bytes.
    #[error("document '{0}' is empty")]
    Empty(String),

    /// The backend refused or lost the upload.
    #[error("storage backend error: {0}")]
    Backend(String),
}

/// Contract of the document storage service.
pub trait DocumentStore: Send + Sync + 'static {
    /// Store the bytes of one document.
    fn store(
        &self,
        id: DocumentId,
        category: DocumentCategory,
        name: &str,
        content: Vec<u8>,
    ) -> impl Future<Output = Result<StoredDocument, StorageError>> + Send;

    /// Delete a stored document. Unknown keys are not an error.
    fn remove(&self, key: &str) -> impl Future<Output = Result<(), StorageError>> + Send;
}

struct Blob {
    category: DocumentCategory,
    name: String,
    content: Vec<u8>,
}

/// Keeps documents in process memory.
#[derive(Clone, Default)]
pub struct MemoryDocumentStore {
    blobs: Arc<RwLock<HashMap<String, Blob>>>,
}

impl MemoryDocumentStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub(crate) async fn len(&self) -> usize {
        self.blobs.read().await.len()
    }
}

impl DocumentStore for MemoryDocumentStore {
    #[instrument(skip(self, content), fields(%id, %category, bytes = content.len()))]
    async fn store(
        &self,
        id: DocumentId,
        category: DocumentCategory,
        name: &str,
        content: Vec<u8>,
    ) -> Result<StoredDocument, StorageError> {
        if content.is_empty() {
            return Err(StorageError::Empty(name.to_string()));
        }

        let key = format!("{category}/{id}");
        let size = content.len() as u64;
        self.blobs.write().await.insert(
            key.clone(),
            Blob {
                category,
                name: name.to_string(),
                content,
            },
        );
        debug!(%key, "Document stored");

        Ok(StoredDocument { key, size })
    }

    #[instrument(skip(self))]
    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        if let Some(blob) = self.blobs.write().await.remove(key) {
            debug!(
                category = %blob.category,
                name = %blob.name,
                bytes = blob.content.len(),
                "Document released"
            );
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_store_returns_key_and_size() {
        let store = MemoryDocumentStore::new();
        let id = DocumentId::generate();
        let receipt = store
            .store(id, DocumentCategory::SitePlan, "planta.pdf", vec![1, 2, 3])
            .await
            .unwrap();

        assert_eq!(receipt.size, 3);
        assert_eq!(receipt.key, format!("site-plan/{id}"));
        assert_eq!(store.len().await, 1);

        let blobs = store.blobs.read().await;
        let blob = blobs.get(&receipt.key).unwrap();
        assert_eq!(blob.category, DocumentCategory::SitePlan);
        assert_eq!(blob.name, "planta.pdf");
    }

    #[tokio::test]
    async fn test_remove_releases_bytes() {
        let store = MemoryDocumentStore::new();
        let receipt = store
            .store(
                DocumentId::generate(),
                DocumentCategory::SitePlan,
                "planta.pdf",
                vec![1],
            )
            .await
            .unwrap();

        store.remove(&receipt.key).await.unwrap();
        assert_eq!(store.len().await, 0);

        // Already gone
        store.remove(&receipt.key).await.unwrap();
    }

    #[tokio::test]
    async fn test_empty_upload_is_rejected() {
        let store = MemoryDocumentStore::new();
        let err = store
            .store(
                DocumentId::generate(),
                DocumentCategory::MeasurementSheet,
                "metragens.xlsx",
                Vec::new(),
            )
            .await
            .unwrap_err();

        assert_eq!(err, StorageError::Empty("metragens.xlsx".to_string()));
        assert_eq!(store.len().await, 0);
    }
}
