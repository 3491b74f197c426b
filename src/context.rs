/// Application context and dependency injection
use crate::{
    blob_store::{self, BlobBackend},
    categories::CategoryStore,
    config::{ArchiveConfig, BlobstoreConfig},
    db,
    error::ArchiveResult,
    feed::PrintFeed,
    prints::PrintStore,
};
use sqlx::SqlitePool;
use std::sync::Arc;

/// Application context holding all shared services
#[derive(Clone)]
pub struct ArchiveContext {
    pub config: Arc<ArchiveConfig>,
    pub db: SqlitePool,
    pub backend: Arc<dyn BlobBackend>,
    pub categories: CategoryStore,
    pub prints: PrintStore,
}

impl ArchiveContext {
    /// Create a new application context from configuration
    pub async fn new(config: ArchiveConfig) -> ArchiveResult<Self> {
        // Validate configuration
        config.validate()?;

        // Create data directories if they don't exist
        Self::ensure_directories(&config).await?;

        // Initialize database
        let db = db::create_pool(&config.db_path, db::DatabaseOptions::default()).await?;
        db::init_schema(&db).await?;

        // Test connection
        db::test_connection(&db).await?;

        // Initialize blob storage backend
        let backend = blob_store::build_backend(&config.blobstore).await?;

        // Initialize repositories
        let categories = CategoryStore::new(db.clone());
        let prints = PrintStore::new(db.clone(), backend.clone(), categories.clone());

        tracing::info!("Archive ready (database: {})", config.db_path.display());

        Ok(Self {
            config: Arc::new(config),
            db,
            backend,
            categories,
            prints,
        })
    }

    /// Build a feed over this context's repositories
    pub fn feed(&self, family_member: Option<String>) -> PrintFeed {
        PrintFeed::new(self.prints.clone(), self.categories.clone(), family_member)
    }

    /// Ensure required directories exist
    async fn ensure_directories(config: &ArchiveConfig) -> ArchiveResult<()> {
        if let Some(parent) = config.db_path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        if let BlobstoreConfig::Disk { location, .. } = &config.blobstore {
            tokio::fs::create_dir_all(location).await?;
        }

        Ok(())
    }
}
