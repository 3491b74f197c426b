/// Database layer for the FamiPrint archive
///
/// Manages the SQLite connection pool and creates the print/category
/// schema at startup. The schema is two tables; idempotent CREATE
/// statements stand in for a migration framework.
use crate::error::ArchiveResult;
use sqlx::sqlite::SqlitePool;
use std::path::Path;

/// Database connection options
#[derive(Debug, Clone)]
pub struct DatabaseOptions {
    pub max_connections: u32,
    pub enable_wal: bool,
}

impl Default for DatabaseOptions {
    fn default() -> Self {
        Self {
            max_connections: 10,
            enable_wal: true,
        }
    }
}

/// Create a SQLite connection pool
pub async fn create_pool(path: &Path, options: DatabaseOptions) -> ArchiveResult<SqlitePool> {
    // Ensure parent directory exists
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }

    let pool = sqlx::sqlite::SqlitePoolOptions::new()
        .max_connections(options.max_connections)
        .connect_with(
            sqlx::sqlite::SqliteConnectOptions::new()
                .filename(path)
                .create_if_missing(true)
                .journal_mode(if options.enable_wal {
                    sqlx::sqlite::SqliteJournalMode::Wal
                } else {
                    sqlx::sqlite::SqliteJournalMode::Delete
                })
                .foreign_keys(true)
                .busy_timeout(std::time::Duration::from_secs(5)),
        )
        .await?;

    Ok(pool)
}

/// Create the print and category schema if it does not exist
pub async fn init_schema(pool: &SqlitePool) -> ArchiveResult<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS categories (
            id TEXT PRIMARY KEY NOT NULL,
            name TEXT NOT NULL UNIQUE,
            created_at DATETIME NOT NULL
        );

        CREATE TABLE IF NOT EXISTS prints (
            id TEXT PRIMARY KEY NOT NULL,
            url TEXT NOT NULL,
            storage_path TEXT NOT NULL,
            filename TEXT NOT NULL,
            family_member TEXT,
            category_id TEXT REFERENCES categories(id),
            metadata TEXT,
            uploaded_at DATETIME NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_prints_family_member ON prints(family_member);
        CREATE INDEX IF NOT EXISTS idx_prints_category_id ON prints(category_id);
        CREATE INDEX IF NOT EXISTS idx_prints_uploaded_at ON prints(uploaded_at DESC);
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Test database connection
pub async fn test_connection(pool: &SqlitePool) -> ArchiveResult<()> {
    sqlx::query("SELECT 1").execute(pool).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_init_schema_idempotent() {
        let pool = SqlitePool::connect(":memory:").await.unwrap();

        init_schema(&pool).await.unwrap();
        init_schema(&pool).await.unwrap();

        test_connection(&pool).await.unwrap();
    }
}
