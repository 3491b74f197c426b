/// S3-compatible blob storage backend
use crate::blob_store::BlobBackend;
use crate::error::{ArchiveError, ArchiveResult};
use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_credential_types::Credentials;
use aws_sdk_s3::config::Builder as S3ConfigBuilder;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// S3 blob storage backend
///
/// Works against AWS itself or anything speaking the S3 API behind a
/// custom endpoint (MinIO, Spaces). Objects are keyed directly by the
/// repository's storage path, so public URLs fall straight out of the
/// bucket layout.
#[derive(Clone)]
pub struct S3BlobBackend {
    client: Arc<Client>,
    bucket: String,
    region: String,
    endpoint: Option<String>,
    public_url_base: Option<String>,
}

/// Configuration for S3 storage
#[derive(Debug, Clone)]
pub struct S3Config {
    pub bucket: String,

    pub region: String,

    /// Endpoint override for S3-compatible servers; also switches the
    /// client to path-style addressing
    pub endpoint: Option<String>,

    pub access_key_id: String,

    pub secret_access_key: String,

    /// Serves objects from here instead of the bucket URL (e.g. a CDN)
    pub public_url_base: Option<String>,
}

impl Default for S3Config {
    fn default() -> Self {
        Self {
            bucket: String::new(),
            region: "us-east-1".to_string(),
            endpoint: None,
            access_key_id: String::new(),
            secret_access_key: String::new(),
            public_url_base: None,
        }
    }
}

/// The SDK's error chain is opaque across operation types; the rendered
/// debug form is the one place the service error code always shows up.
fn error_text(err: &dyn std::fmt::Debug) -> String {
    format!("{:?}", err)
}

impl S3BlobBackend {
    /// Create a new S3 blob backend
    pub async fn new(config: S3Config) -> ArchiveResult<Self> {
        let credentials = Credentials::new(
            &config.access_key_id,
            &config.secret_access_key,
            None,
            None,
            "famiprint",
        );

        let aws_config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .credentials_provider(credentials)
            .load()
            .await;

        let mut builder = S3ConfigBuilder::from(&aws_config);
        if let Some(endpoint) = &config.endpoint {
            // Path-style is what MinIO-style servers expect
            builder = builder.endpoint_url(endpoint).force_path_style(true);
        }

        let client = Client::from_conf(builder.build());

        info!(
            "S3 blob storage ready (bucket: {}, region: {})",
            config.bucket, config.region
        );

        Ok(Self {
            client: Arc::new(client),
            bucket: config.bucket,
            region: config.region,
            endpoint: config.endpoint.map(|e| e.trim_end_matches('/').to_string()),
            public_url_base: config
                .public_url_base
                .map(|b| b.trim_end_matches('/').to_string()),
        })
    }
}

#[async_trait]
impl BlobBackend for S3BlobBackend {
    async fn put(&self, path: &str, data: Vec<u8>, mime_type: &str) -> ArchiveResult<()> {
        debug!("S3 put {} ({} bytes, {})", path, data.len(), mime_type);

        let result = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(path)
            .body(ByteStream::from(data))
            .content_type(mime_type)
            // No-overwrite semantics
            .if_none_match("*")
            .send()
            .await;

        if let Err(e) = result {
            if error_text(&e).contains("PreconditionFailed") {
                return Err(ArchiveError::BlobStorage(format!(
                    "Object already exists at {}",
                    path
                )));
            }
            warn!("S3 put failed for {}: {}", path, e);
            return Err(ArchiveError::BlobStorage(format!("S3 upload failed: {}", e)));
        }

        Ok(())
    }

    async fn get(&self, path: &str) -> ArchiveResult<Option<Vec<u8>>> {
        let response = match self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(path)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) if error_text(&e).contains("NoSuchKey") => return Ok(None),
            Err(e) if error_text(&e).contains("NotFound") => return Ok(None),
            Err(e) => {
                return Err(ArchiveError::BlobStorage(format!(
                    "S3 download failed: {}",
                    e
                )))
            }
        };

        let bytes = response
            .body
            .collect()
            .await
            .map_err(|e| ArchiveError::BlobStorage(format!("S3 body read failed: {}", e)))?
            .into_bytes();

        debug!("S3 get {} ({} bytes)", path, bytes.len());
        Ok(Some(bytes.to_vec()))
    }

    async fn delete(&self, path: &str) -> ArchiveResult<()> {
        // DeleteObject on a missing key already succeeds, which matches
        // the trait's idempotent-delete contract
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(path)
            .send()
            .await
            .map_err(|e| ArchiveError::BlobStorage(format!("S3 delete failed: {}", e)))?;

        debug!("S3 delete {}", path);
        Ok(())
    }

    async fn exists(&self, path: &str) -> ArchiveResult<bool> {
        let result = self
            .client
            .head_object()
            .bucket(&self.bucket)
            .key(path)
            .send()
            .await;

        match result {
            Ok(_) => Ok(true),
            Err(e) if error_text(&e).contains("NotFound") => Ok(false),
            Err(e) => Err(ArchiveError::BlobStorage(format!(
                "S3 head object failed: {}",
                e
            ))),
        }
    }

    fn public_url(&self, path: &str) -> Option<String> {
        match (&self.public_url_base, &self.endpoint) {
            (Some(base), _) => Some(format!("{}/{}", base, path)),
            (None, Some(endpoint)) => Some(format!("{}/{}/{}", endpoint, self.bucket, path)),
            (None, None) => Some(format!(
                "https://{}.s3.{}.amazonaws.com/{}",
                self.bucket, self.region, path
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> S3Config {
        S3Config {
            bucket: "family-prints".to_string(),
            access_key_id: "test-key".to_string(),
            secret_access_key: "test-secret".to_string(),
            ..S3Config::default()
        }
    }

    #[test]
    fn test_s3_config_default() {
        let config = S3Config::default();
        assert_eq!(config.region, "us-east-1");
        assert!(config.endpoint.is_none());
        assert!(config.public_url_base.is_none());
    }

    #[tokio::test]
    async fn test_public_url_conventional() {
        let backend = S3BlobBackend::new(test_config()).await.unwrap();

        assert_eq!(
            backend.public_url("1700000000000_photo.jpg").unwrap(),
            "https://family-prints.s3.us-east-1.amazonaws.com/1700000000000_photo.jpg"
        );
    }

    #[tokio::test]
    async fn test_public_url_with_custom_endpoint() {
        let backend = S3BlobBackend::new(S3Config {
            endpoint: Some("http://localhost:9000/".to_string()),
            ..test_config()
        })
        .await
        .unwrap();

        assert_eq!(
            backend.public_url("a.jpg").unwrap(),
            "http://localhost:9000/family-prints/a.jpg"
        );
    }

    #[tokio::test]
    async fn test_public_url_override_wins() {
        let backend = S3BlobBackend::new(S3Config {
            endpoint: Some("http://localhost:9000".to_string()),
            public_url_base: Some("https://cdn.example.com/prints/".to_string()),
            ..test_config()
        })
        .await
        .unwrap();

        assert_eq!(
            backend.public_url("a.jpg").unwrap(),
            "https://cdn.example.com/prints/a.jpg"
        );
    }
}
