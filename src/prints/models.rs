/// Print data models
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Largest accepted upload: 10 MiB
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Whether a media type is accepted for upload (any image, or PDF)
pub fn accepted_media_type(mime_type: &str) -> bool {
    mime_type.starts_with("image/") || mime_type == "application/pdf"
}

/// A stored print: one uploaded image or PDF with its tags
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Print {
    pub id: String,
    /// Public, permanent locator for the stored file
    pub url: String,
    /// Blob-store object key the file lives under
    pub storage_path: String,
    /// Original client-side file name (display only, not unique)
    pub filename: String,
    pub family_member: Option<String>,
    pub category_id: Option<String>,
    /// Joined from the categories table on read paths; not a column
    pub category_name: Option<String>,
    pub metadata: Option<PrintMetadata>,
    pub uploaded_at: DateTime<Utc>,
}

/// Structured metadata captured at upload time
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrintMetadata {
    pub size: i64,
    pub mime_type: String,
    /// Reserved; not populated yet
    pub width: Option<i64>,
    /// Reserved; not populated yet
    pub height: Option<i64>,
}

/// An incoming file for upload
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub filename: String,
    pub mime_type: String,
    pub data: Vec<u8>,
}

impl UploadFile {
    /// Create a new upload
    pub fn new(filename: String, mime_type: String, data: Vec<u8>) -> Self {
        Self {
            filename,
            mime_type,
            data,
        }
    }
}
