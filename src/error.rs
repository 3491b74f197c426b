/// Unified error types for the FamiPrint archive core
use thiserror::Error;

/// Main error type for archive operations
#[derive(Error, Debug)]
pub enum ArchiveError {
    /// Relational store errors (passthrough)
    #[error("Store error: {0}")]
    Store(#[from] sqlx::Error),

    /// Input rejected before any I/O (file type/size, empty names)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Blob backend errors
    #[error("Blob storage error: {0}")]
    BlobStorage(String),

    /// Blob store failure during upload, or no public URL after a
    /// successful upload
    #[error("Upload failed: {0}")]
    Upload(String),

    /// Database insert failed after the blob was already stored; the
    /// compensating blob delete has been attempted and the original
    /// insert error is carried here
    #[error("Metadata save failed after upload: {0}")]
    MetadataSave(#[source] sqlx::Error),

    /// Category name collision on explicit create or rename
    #[error("Category name already in use: {0}")]
    DuplicateName(String),

    /// Operation targeted an id with no matching row
    #[error("Not found: {0}")]
    NotFound(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for archive operations
pub type ArchiveResult<T> = Result<T, ArchiveError>;
