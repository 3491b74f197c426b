/// Configuration management for the FamiPrint archive core
use crate::error::{ArchiveError, ArchiveResult};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

/// Main archive configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchiveConfig {
    /// SQLite database file holding print and category rows
    pub db_path: PathBuf,
    pub blobstore: BlobstoreConfig,
}

/// Blob storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum BlobstoreConfig {
    Disk {
        location: PathBuf,
        /// Base URL the embedding application serves `location` under
        public_url_base: String,
    },
    S3 {
        bucket: String,
        region: String,
        access_key_id: String,
        secret_access_key: String,
        endpoint: Option<String>,
        /// Overrides the conventional S3 URL (e.g. a CDN in front of the bucket)
        public_url_base: Option<String>,
    },
}

impl ArchiveConfig {
    /// Load configuration from environment variables
    ///
    /// Setting `FAMIPRINT_S3_BUCKET` selects the S3 backend; otherwise
    /// blobs are stored on local disk.
    pub fn from_env() -> ArchiveResult<Self> {
        dotenv::dotenv().ok();

        let db_path: PathBuf = env::var("FAMIPRINT_DB_PATH")
            .unwrap_or_else(|_| "data/famiprint.db".to_string())
            .into();

        let blobstore = if let Ok(bucket) = env::var("FAMIPRINT_S3_BUCKET") {
            BlobstoreConfig::S3 {
                bucket,
                region: env::var("FAMIPRINT_S3_REGION")
                    .unwrap_or_else(|_| "us-east-1".to_string()),
                access_key_id: env::var("FAMIPRINT_S3_ACCESS_KEY_ID")
                    .map_err(|_| ArchiveError::Validation("S3 access key required".to_string()))?,
                secret_access_key: env::var("FAMIPRINT_S3_SECRET_ACCESS_KEY")
                    .map_err(|_| ArchiveError::Validation("S3 secret key required".to_string()))?,
                endpoint: env::var("FAMIPRINT_S3_ENDPOINT").ok(),
                public_url_base: env::var("FAMIPRINT_S3_PUBLIC_URL").ok(),
            }
        } else {
            BlobstoreConfig::Disk {
                location: env::var("FAMIPRINT_BLOBSTORE_LOCATION")
                    .map(PathBuf::from)
                    .unwrap_or_else(|_| PathBuf::from("data/blobs")),
                public_url_base: env::var("FAMIPRINT_PUBLIC_URL")
                    .unwrap_or_else(|_| "http://localhost:3000/files".to_string()),
            }
        };

        Ok(ArchiveConfig { db_path, blobstore })
    }

    /// Validate configuration
    pub fn validate(&self) -> ArchiveResult<()> {
        if self.db_path.as_os_str().is_empty() {
            return Err(ArchiveError::Validation(
                "Database path cannot be empty".to_string(),
            ));
        }

        match &self.blobstore {
            BlobstoreConfig::Disk {
                location,
                public_url_base,
            } => {
                if location.as_os_str().is_empty() {
                    return Err(ArchiveError::Validation(
                        "Blobstore location cannot be empty".to_string(),
                    ));
                }
                if public_url_base.is_empty() {
                    return Err(ArchiveError::Validation(
                        "Public URL base cannot be empty".to_string(),
                    ));
                }
            }
            BlobstoreConfig::S3 {
                bucket,
                region,
                access_key_id,
                secret_access_key,
                ..
            } => {
                if bucket.is_empty() {
                    return Err(ArchiveError::Validation(
                        "S3 bucket cannot be empty".to_string(),
                    ));
                }
                if region.is_empty() {
                    return Err(ArchiveError::Validation(
                        "S3 region cannot be empty".to_string(),
                    ));
                }
                if access_key_id.is_empty() || secret_access_key.is_empty() {
                    return Err(ArchiveError::Validation(
                        "S3 credentials cannot be empty".to_string(),
                    ));
                }
            }
        }

        Ok(())
    }
}
