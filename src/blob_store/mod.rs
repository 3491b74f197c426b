/// Blob Storage System
///
/// Handles the file bytes behind print records: images and PDFs keyed
/// by the storage path the repository generated at upload time.
/// Supports multiple backend implementations (disk, S3); an in-memory
/// backend exists for tests.

pub mod disk;
pub mod memory;
pub mod s3;

pub use disk::DiskBlobBackend;
pub use memory::MemoryBlobBackend;
pub use s3::{S3BlobBackend, S3Config};

use crate::config::BlobstoreConfig;
use crate::error::ArchiveResult;
use async_trait::async_trait;
use std::sync::Arc;

/// Blob storage backend trait
///
/// Implementations handle the actual storage and retrieval of file data.
#[async_trait]
pub trait BlobBackend: Send + Sync {
    /// Store a file under `path`. An object already present at `path`
    /// is an error (no-overwrite semantics).
    async fn put(&self, path: &str, data: Vec<u8>, mime_type: &str) -> ArchiveResult<()>;

    /// Retrieve a file by path
    async fn get(&self, path: &str) -> ArchiveResult<Option<Vec<u8>>>;

    /// Delete a file by path; deleting an absent file is not an error
    async fn delete(&self, path: &str) -> ArchiveResult<()>;

    /// Check if a file exists
    async fn exists(&self, path: &str) -> ArchiveResult<bool>;

    /// Public URL the file is served under, if the backend can serve it
    fn public_url(&self, path: &str) -> Option<String>;
}

/// Build the backend the configuration names
pub async fn build_backend(config: &BlobstoreConfig) -> ArchiveResult<Arc<dyn BlobBackend>> {
    match config {
        BlobstoreConfig::Disk {
            location,
            public_url_base,
        } => Ok(Arc::new(DiskBlobBackend::new(
            location.clone(),
            public_url_base.clone(),
        ))),
        BlobstoreConfig::S3 {
            bucket,
            region,
            access_key_id,
            secret_access_key,
            endpoint,
            public_url_base,
        } => {
            let backend = S3BlobBackend::new(S3Config {
                bucket: bucket.clone(),
                region: region.clone(),
                endpoint: endpoint.clone(),
                access_key_id: access_key_id.clone(),
                secret_access_key: secret_access_key.clone(),
                public_url_base: public_url_base.clone(),
            })
            .await?;
            Ok(Arc::new(backend))
        }
    }
}
