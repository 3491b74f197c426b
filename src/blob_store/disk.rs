/// Disk-based blob storage backend
use crate::{
    blob_store::BlobBackend,
    error::{ArchiveError, ArchiveResult},
};
use async_trait::async_trait;
use std::path::PathBuf;
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// Disk storage backend
///
/// Stores uploaded files on the local filesystem under a single root
/// directory, keyed by the storage path the repository generated.
/// Public URLs are the configured base joined with that path; actually
/// serving the directory is the embedding application's job.
#[derive(Clone)]
pub struct DiskBlobBackend {
    base_path: PathBuf,
    public_url_base: String,
}

impl DiskBlobBackend {
    /// Create a new disk storage backend
    pub fn new(base_path: PathBuf, public_url_base: String) -> Self {
        Self {
            base_path,
            public_url_base: public_url_base.trim_end_matches('/').to_string(),
        }
    }

    /// Get the file path for a storage path
    fn file_path(&self, path: &str) -> PathBuf {
        self.base_path.join(path)
    }
}

#[async_trait]
impl BlobBackend for DiskBlobBackend {
    async fn put(&self, path: &str, data: Vec<u8>, _mime_type: &str) -> ArchiveResult<()> {
        let file_path = self.file_path(path);
        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent).await.map_err(|e| {
                ArchiveError::BlobStorage(format!("Failed to create blob directory: {}", e))
            })?;
        }

        // create_new gives the no-overwrite guarantee
        let mut file = fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&file_path)
            .await
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::AlreadyExists => {
                    ArchiveError::BlobStorage(format!("Object already exists at {}", path))
                }
                _ => ArchiveError::BlobStorage(format!("Failed to create blob {}: {}", path, e)),
            })?;

        file.write_all(&data)
            .await
            .map_err(|e| ArchiveError::BlobStorage(format!("Failed to write blob {}: {}", path, e)))?;
        file.flush()
            .await
            .map_err(|e| ArchiveError::BlobStorage(format!("Failed to write blob {}: {}", path, e)))?;

        Ok(())
    }

    async fn get(&self, path: &str) -> ArchiveResult<Option<Vec<u8>>> {
        let file_path = self.file_path(path);

        match fs::read(&file_path).await {
            Ok(data) => Ok(Some(data)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(ArchiveError::BlobStorage(format!(
                "Failed to read blob {}: {}",
                path, e
            ))),
        }
    }

    async fn delete(&self, path: &str) -> ArchiveResult<()> {
        let file_path = self.file_path(path);

        match fs::remove_file(&file_path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(ArchiveError::BlobStorage(format!(
                "Failed to delete blob {}: {}",
                path, e
            ))),
        }
    }

    async fn exists(&self, path: &str) -> ArchiveResult<bool> {
        Ok(self.file_path(path).exists())
    }

    fn public_url(&self, path: &str) -> Option<String> {
        Some(format!("{}/{}", self.public_url_base, path))
    }
}
