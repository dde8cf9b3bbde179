//! Identity persistence backends.
//!
//! A store only moves the raw record around. Decoding, version checks and
//! corrupt-record handling happen in [`super::SessionAuthority`].

use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::Mutex;
use tower_sessions::Session;

use super::error::StoreError;
use crate::models::session::keys;

/// Where the serialized current identity lives.
pub trait IdentityStore: Send + Sync {
    /// The raw record, if one exists.
    fn read(&self) -> impl Future<Output = Result<Option<String>, StoreError>> + Send;

    /// Replace the record.
    fn write(&self, record: String) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Delete the record. Deleting a missing record succeeds.
    fn clear(&self) -> impl Future<Output = Result<(), StoreError>> + Send;
}

/// Record kept in memory. Clones share the record.
#[derive(Debug, Clone, Default)]
pub struct MemoryIdentityStore {
    record: Arc<Mutex<Option<String>>>,
}

impl MemoryIdentityStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl IdentityStore for MemoryIdentityStore {
    async fn read(&self) -> Result<Option<String>, StoreError> {
        Ok(self.record.lock().await.clone())
    }

    async fn write(&self, record: String) -> Result<(), StoreError> {
        *self.record.lock().await = Some(record);
        Ok(())
    }

    async fn clear(&self) -> Result<(), StoreError> {
        self.record.lock().await.take();
        Ok(())
    }
}

/// Record kept in a JSON file, readable only by the owner.
#[derive(Debug, Clone)]
pub struct FileIdentityStore {
    path: PathBuf,
}

impl FileIdentityStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl IdentityStore for FileIdentityStore {
    async fn read(&self) -> Result<Option<String>, StoreError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(content) if content.trim().is_empty() => Ok(None),
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn write(&self, record: String) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
            #[cfg(unix)]
            {
                use std::os::unix::fs::PermissionsExt;
                if let Err(e) =
                    tokio::fs::set_permissions(parent, std::fs::Permissions::from_mode(0o700))
                        .await
                {
                    tracing::warn!("failed to chmod 0700 {}: {e}", parent.display());
                }
            }
        }

        tokio::fs::write(&self.path, record).await?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            tokio::fs::set_permissions(&self.path, std::fs::Permissions::from_mode(0o600)).await?;
        }

        Ok(())
    }

    async fn clear(&self) -> Result<(), StoreError> {
        match tokio::fs::remove_file(&self.path).await {
            Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }
}

/// Record kept in the browser's tower-sessions session.
#[derive(Debug, Clone)]
pub struct SessionIdentityStore {
    session: Session,
}

impl SessionIdentityStore {
    #[must_use]
    pub const fn new(session: Session) -> Self {
        Self { session }
    }
}

impl IdentityStore for SessionIdentityStore {
    async fn read(&self) -> Result<Option<String>, StoreError> {
        // A value of the wrong JSON type is corrupt too; surface it as a
        // string so the authority sees and clears it.
        let value = self
            .session
            .get::<serde_json::Value>(keys::CURRENT_IDENTITY)
            .await?;
        Ok(value.map(|value| match value {
            serde_json::Value::String(record) => record,
            other => other.to_string(),
        }))
    }

    async fn write(&self, record: String) -> Result<(), StoreError> {
        self.session.insert(keys::CURRENT_IDENTITY, record).await?;
        Ok(())
    }

    async fn clear(&self) -> Result<(), StoreError> {
        self.session
            .remove::<serde_json::Value>(keys::CURRENT_IDENTITY)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_store_cycle() {
        let store = MemoryIdentityStore::new();
        assert!(store.read().await.unwrap().is_none());
        store.write("{}".to_string()).await.unwrap();
        assert_eq!(store.clone().read().await.unwrap().as_deref(), Some("{}"));
        store.clear().await.unwrap();
        store.clear().await.unwrap();
        assert!(store.read().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_file_store_cycle() {
        let tmp = tempfile::TempDir::new().unwrap();
        let store = FileIdentityStore::new(tmp.path().join("nested").join("identity.json"));

        assert!(store.read().await.unwrap().is_none());
        store.write("{\"a\":1}".to_string()).await.unwrap();
        assert_eq!(store.read().await.unwrap().as_deref(), Some("{\"a\":1}"));

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = std::fs::metadata(store.path())
                .unwrap()
                .permissions()
                .mode()
                & 0o777;
            assert_eq!(mode, 0o600, "identity file should be 0600");
        }

        store.clear().await.unwrap();
        store.clear().await.unwrap();
        assert!(!store.path().exists());
    }

    #[tokio::test]
    async fn test_file_store_ignores_blank_file() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("identity.json");
        std::fs::write(&path, "  \n").unwrap();
        let store = FileIdentityStore::new(path);
        assert!(store.read().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_session_store_cycle() {
        use tower_sessions::MemoryStore;

        let session = Session::new(None, Arc::new(MemoryStore::default()), None);
        let store = SessionIdentityStore::new(session);
        assert!(store.read().await.unwrap().is_none());
        store.write("record".to_string()).await.unwrap();
        assert_eq!(store.read().await.unwrap().as_deref(), Some("record"));
        store.clear().await.unwrap();
        assert!(store.read().await.unwrap().is_none());
    }
}
