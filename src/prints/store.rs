/// Print repository
///
/// Coordinates the two-phase write behind an upload (blob bytes, then
/// the relational row) and the read, reassignment, and delete paths for
/// print records.
use crate::{
    blob_store::BlobBackend,
    categories::CategoryStore,
    error::{ArchiveError, ArchiveResult},
    prints::models::{accepted_media_type, Print, PrintMetadata, UploadFile, MAX_UPLOAD_BYTES},
};
use chrono::Utc;
use futures::future::join_all;
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use std::sync::Arc;
use uuid::Uuid;

/// Main print repository
#[derive(Clone)]
pub struct PrintStore {
    db: SqlitePool,
    backend: Arc<dyn BlobBackend>,
    categories: CategoryStore,
}

/// Storage paths are `{unix_millis}_{filename}`: unique enough within
/// one process epoch, and the original name stays visible in the store.
fn generate_storage_path(filename: &str) -> String {
    // Flatten separators so a filename cannot point outside the store root
    let safe_name: String = filename
        .chars()
        .map(|c| match c {
            '/' | '\\' => '_',
            _ => c,
        })
        .collect();

    format!("{}_{}", Utc::now().timestamp_millis(), safe_name)
}

fn print_from_row(row: &SqliteRow) -> ArchiveResult<Print> {
    let metadata: Option<String> = row.try_get("metadata")?;

    Ok(Print {
        id: row.try_get("id")?,
        url: row.try_get("url")?,
        storage_path: row.try_get("storage_path")?,
        filename: row.try_get("filename")?,
        family_member: row.try_get("family_member")?,
        category_id: row.try_get("category_id")?,
        category_name: row.try_get("category_name")?,
        metadata: metadata.and_then(|m| serde_json::from_str(&m).ok()),
        uploaded_at: row.try_get("uploaded_at")?,
    })
}

impl PrintStore {
    /// Create a new print repository
    pub fn new(db: SqlitePool, backend: Arc<dyn BlobBackend>, categories: CategoryStore) -> Self {
        Self {
            db,
            backend,
            categories,
        }
    }

    /// Upload a print
    ///
    /// Stores the file bytes first, then the metadata row. If the row
    /// insert fails, the just-stored blob is deleted again (best effort)
    /// so a print's URL and its object exist together or not at all; the
    /// insert error is what reaches the caller.
    pub async fn upload(
        &self,
        file: UploadFile,
        family_member: Option<&str>,
        category_name: Option<&str>,
    ) -> ArchiveResult<Print> {
        self.validate(&file)?;

        let UploadFile {
            filename,
            mime_type,
            data,
        } = file;
        let size = data.len() as i64;
        let storage_path = generate_storage_path(&filename);

        self.backend
            .put(&storage_path, data, &mime_type)
            .await
            .map_err(|e| ArchiveError::Upload(e.to_string()))?;

        let url = self
            .backend
            .public_url(&storage_path)
            .ok_or_else(|| ArchiveError::Upload(format!("No public URL for {}", storage_path)))?;

        let category = match category_name {
            Some(name) => self.categories.resolve_or_create(name).await?,
            None => None,
        };

        let print = Print {
            id: Uuid::new_v4().to_string(),
            url,
            storage_path: storage_path.clone(),
            filename,
            family_member: family_member.map(String::from),
            category_id: category.as_ref().map(|c| c.id.clone()),
            category_name: category.map(|c| c.name),
            metadata: Some(PrintMetadata {
                size,
                mime_type,
                width: None,
                height: None,
            }),
            uploaded_at: Utc::now(),
        };

        if let Err(e) = self.insert(&print).await {
            // Compensating delete; its own failure must not mask the
            // insert error
            if let Err(cleanup_err) = self.backend.delete(&storage_path).await {
                tracing::warn!(
                    "Failed to clean up blob {} after insert failure: {}",
                    storage_path,
                    cleanup_err
                );
            }
            return Err(ArchiveError::MetadataSave(e));
        }

        tracing::info!("Uploaded print {} ({})", print.id, print.storage_path);

        Ok(print)
    }

    /// Upload a batch of prints concurrently
    ///
    /// Items are independent: one failure neither cancels nor rolls back
    /// the others. Failed items are logged and dropped from the result.
    pub async fn upload_many(
        &self,
        files: Vec<UploadFile>,
        family_member: Option<&str>,
        category_name: Option<&str>,
    ) -> Vec<Print> {
        let uploads = files
            .into_iter()
            .map(|file| self.upload(file, family_member, category_name));

        let mut prints = Vec::new();
        for result in join_all(uploads).await {
            match result {
                Ok(print) => prints.push(print),
                Err(e) => tracing::warn!("Upload failed in batch: {}", e),
            }
        }

        prints
    }

    /// List prints, newest first
    ///
    /// `family_member` filters by exact tag match when given. Ordering
    /// is owned here; view layers take the list as is.
    pub async fn list(&self, family_member: Option<&str>) -> ArchiveResult<Vec<Print>> {
        let rows = match family_member {
            Some(member) => {
                sqlx::query(
                    r#"
                    SELECT p.id, p.url, p.storage_path, p.filename, p.family_member,
                           p.category_id, p.metadata, p.uploaded_at, c.name AS category_name
                    FROM prints p
                    LEFT JOIN categories c ON c.id = p.category_id
                    WHERE p.family_member = ?1
                    ORDER BY p.uploaded_at DESC
                    "#,
                )
                .bind(member)
                .fetch_all(&self.db)
                .await?
            }
            None => {
                sqlx::query(
                    r#"
                    SELECT p.id, p.url, p.storage_path, p.filename, p.family_member,
                           p.category_id, p.metadata, p.uploaded_at, c.name AS category_name
                    FROM prints p
                    LEFT JOIN categories c ON c.id = p.category_id
                    ORDER BY p.uploaded_at DESC
                    "#,
                )
                .fetch_all(&self.db)
                .await?
            }
        };

        let mut prints = Vec::new();
        for row in rows {
            prints.push(print_from_row(&row)?);
        }

        Ok(prints)
    }

    /// Get a single print by id; absent id reads as `None`, not an error
    pub async fn get_by_id(&self, id: &str) -> ArchiveResult<Option<Print>> {
        let row = sqlx::query(
            r#"
            SELECT p.id, p.url, p.storage_path, p.filename, p.family_member,
                   p.category_id, p.metadata, p.uploaded_at, c.name AS category_name
            FROM prints p
            LEFT JOIN categories c ON c.id = p.category_id
            WHERE p.id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;

        match row {
            Some(row) => Ok(Some(print_from_row(&row)?)),
            None => Ok(None),
        }
    }

    /// Reassign a print's category
    ///
    /// A name resolves (or creates) a category first; `None` clears the
    /// assignment. Returns whether a print row was actually updated.
    pub async fn update_category(
        &self,
        print_id: &str,
        category_name: Option<&str>,
    ) -> ArchiveResult<bool> {
        let category_id = match category_name {
            Some(name) => self
                .categories
                .resolve_or_create(name)
                .await?
                .map(|c| c.id),
            None => None,
        };

        let result = sqlx::query("UPDATE prints SET category_id = ?1 WHERE id = ?2")
            .bind(&category_id)
            .bind(print_id)
            .execute(&self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Delete a print
    ///
    /// The blob is removed first, best effort: its failure is logged and
    /// the row is still deleted. The row deletion itself is fatal on
    /// error. Returns false when no such print exists.
    pub async fn delete(&self, id: &str) -> ArchiveResult<bool> {
        let print = match self.get_by_id(id).await? {
            Some(print) => print,
            None => return Ok(false),
        };

        if let Err(e) = self.backend.delete(&print.storage_path).await {
            tracing::warn!("Failed to delete blob {}: {}", print.storage_path, e);
        }

        let result = sqlx::query("DELETE FROM prints WHERE id = ?1")
            .bind(id)
            .execute(&self.db)
            .await?;

        let deleted = result.rows_affected() > 0;
        if deleted {
            tracing::info!("Deleted print {}", id);
        }

        Ok(deleted)
    }

    /// Validate an upload before any I/O happens
    fn validate(&self, file: &UploadFile) -> ArchiveResult<()> {
        if !accepted_media_type(&file.mime_type) {
            return Err(ArchiveError::Validation(format!(
                "Unsupported media type: {}",
                file.mime_type
            )));
        }

        if file.data.len() > MAX_UPLOAD_BYTES {
            return Err(ArchiveError::Validation(format!(
                "File exceeds maximum size of {} bytes",
                MAX_UPLOAD_BYTES
            )));
        }

        Ok(())
    }

    async fn insert(&self, print: &Print) -> Result<(), sqlx::Error> {
        let metadata_json = print
            .metadata
            .as_ref()
            .and_then(|m| serde_json::to_string(m).ok());

        sqlx::query(
            r#"
            INSERT INTO prints (id, url, storage_path, filename, family_member, category_id, metadata, uploaded_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&print.id)
        .bind(&print.url)
        .bind(&print.storage_path)
        .bind(&print.filename)
        .bind(&print.family_member)
        .bind(&print.category_id)
        .bind(metadata_json)
        .bind(print.uploaded_at)
        .execute(&self.db)
        .await?;

        Ok(())
    }
}
