/// In-memory blob storage backend
///
/// Keeps blobs in a process-local map. Suited to tests and ephemeral
/// deployments; nothing survives a restart. Failure injection makes the
/// repository's partial-failure paths reachable without a misbehaving
/// real store.
use crate::{
    blob_store::BlobBackend,
    error::{ArchiveError, ArchiveResult},
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;

/// Memory storage backend
#[derive(Default)]
pub struct MemoryBlobBackend {
    blobs: RwLock<HashMap<String, Vec<u8>>>,
    fail_puts: AtomicBool,
    suppress_public_urls: AtomicBool,
}

impl MemoryBlobBackend {
    /// Create a new memory storage backend
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent `put` fail
    pub fn set_fail_puts(&self, fail: bool) {
        self.fail_puts.store(fail, Ordering::SeqCst);
    }

    /// Make `public_url` report no URL for any path
    pub fn set_suppress_public_urls(&self, suppress: bool) {
        self.suppress_public_urls.store(suppress, Ordering::SeqCst);
    }

    /// Number of stored blobs
    pub async fn len(&self) -> usize {
        self.blobs.read().await.len()
    }

    /// Whether no blobs are stored
    pub async fn is_empty(&self) -> bool {
        self.blobs.read().await.is_empty()
    }
}

#[async_trait]
impl BlobBackend for MemoryBlobBackend {
    async fn put(&self, path: &str, data: Vec<u8>, _mime_type: &str) -> ArchiveResult<()> {
        if self.fail_puts.load(Ordering::SeqCst) {
            return Err(ArchiveError::BlobStorage(
                "injected put failure".to_string(),
            ));
        }

        let mut blobs = self.blobs.write().await;
        if blobs.contains_key(path) {
            return Err(ArchiveError::BlobStorage(format!(
                "Object already exists at {}",
                path
            )));
        }
        blobs.insert(path.to_string(), data);

        Ok(())
    }

    async fn get(&self, path: &str) -> ArchiveResult<Option<Vec<u8>>> {
        Ok(self.blobs.read().await.get(path).cloned())
    }

    async fn delete(&self, path: &str) -> ArchiveResult<()> {
        self.blobs.write().await.remove(path);
        Ok(())
    }

    async fn exists(&self, path: &str) -> ArchiveResult<bool> {
        Ok(self.blobs.read().await.contains_key(path))
    }

    fn public_url(&self, path: &str) -> Option<String> {
        if self.suppress_public_urls.load(Ordering::SeqCst) {
            None
        } else {
            Some(format!("memory://{}", path))
        }
    }
}
