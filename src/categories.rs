/// Category storage and name resolution
///
/// Categories are shared tags across the whole archive. Names are
/// unique; the resolver turns the free-form name a user typed into a
/// stable row, creating it on first use.
use crate::error::{ArchiveError, ArchiveResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

/// A named tag applied to prints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// Category store and resolver
#[derive(Clone)]
pub struct CategoryStore {
    db: SqlitePool,
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .map(|db| db.is_unique_violation())
        .unwrap_or(false)
}

impl CategoryStore {
    /// Create a new category store
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Resolve a user-entered name to a category, creating it on first use
    ///
    /// Empty (or whitespace-only) names resolve to no category, which
    /// callers treat as "uncategorized". An insert that loses the race
    /// against a concurrent creator falls back to reading the winner's
    /// row instead of surfacing the constraint violation.
    pub async fn resolve_or_create(&self, name: &str) -> ArchiveResult<Option<Category>> {
        let name = name.trim();
        if name.is_empty() {
            return Ok(None);
        }

        if let Some(existing) = self.find_by_name(name).await? {
            return Ok(Some(existing));
        }

        match self.insert(name).await {
            Ok(category) => Ok(Some(category)),
            Err(ArchiveError::Store(e)) if is_unique_violation(&e) => {
                // Lost the creation race; the winner's row is the one we want
                let existing = self
                    .find_by_name(name)
                    .await?
                    .ok_or(ArchiveError::Store(e))?;
                Ok(Some(existing))
            }
            Err(e) => Err(e),
        }
    }

    /// Explicitly create a category with the given name
    ///
    /// Unlike `resolve_or_create`, a taken name is an error here: the
    /// caller asked for a new category and must learn the name is in use.
    pub async fn create(&self, name: &str) -> ArchiveResult<Category> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ArchiveError::Validation(
                "Category name cannot be empty".to_string(),
            ));
        }

        match self.insert(name).await {
            Ok(category) => Ok(category),
            Err(ArchiveError::Store(e)) if is_unique_violation(&e) => {
                Err(ArchiveError::DuplicateName(name.to_string()))
            }
            Err(e) => Err(e),
        }
    }

    /// Rename a category
    pub async fn rename(&self, id: &str, new_name: &str) -> ArchiveResult<Category> {
        let new_name = new_name.trim();
        if new_name.is_empty() {
            return Err(ArchiveError::Validation(
                "Category name cannot be empty".to_string(),
            ));
        }

        let result = sqlx::query("UPDATE categories SET name = ?1 WHERE id = ?2")
            .bind(new_name)
            .bind(id)
            .execute(&self.db)
            .await;

        match result {
            Ok(r) if r.rows_affected() == 0 => {
                Err(ArchiveError::NotFound(format!("Category not found: {}", id)))
            }
            Ok(_) => self
                .get(id)
                .await?
                .ok_or_else(|| ArchiveError::NotFound(format!("Category not found: {}", id))),
            Err(e) if is_unique_violation(&e) => {
                Err(ArchiveError::DuplicateName(new_name.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Delete a category
    ///
    /// Prints referencing the category are detached first; the category
    /// row is only removed once no print can hold a dangling reference.
    /// If the detach step fails the row stays in place.
    pub async fn delete(&self, id: &str) -> ArchiveResult<()> {
        sqlx::query("UPDATE prints SET category_id = NULL WHERE category_id = ?1")
            .bind(id)
            .execute(&self.db)
            .await?;

        let result = sqlx::query("DELETE FROM categories WHERE id = ?1")
            .bind(id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(ArchiveError::NotFound(format!("Category not found: {}", id)));
        }

        Ok(())
    }

    /// All categories ordered by name
    pub async fn list(&self) -> ArchiveResult<Vec<Category>> {
        let rows = sqlx::query("SELECT id, name, created_at FROM categories ORDER BY name ASC")
            .fetch_all(&self.db)
            .await?;

        let mut categories = Vec::new();
        for row in rows {
            categories.push(Category {
                id: row.try_get("id")?,
                name: row.try_get("name")?,
                created_at: row.try_get("created_at")?,
            });
        }

        Ok(categories)
    }

    /// Get a category by id
    pub async fn get(&self, id: &str) -> ArchiveResult<Option<Category>> {
        let row = sqlx::query("SELECT id, name, created_at FROM categories WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.db)
            .await?;

        if let Some(row) = row {
            Ok(Some(Category {
                id: row.try_get("id")?,
                name: row.try_get("name")?,
                created_at: row.try_get("created_at")?,
            }))
        } else {
            Ok(None)
        }
    }

    /// Look up a category by exact name
    pub async fn find_by_name(&self, name: &str) -> ArchiveResult<Option<Category>> {
        let row = sqlx::query("SELECT id, name, created_at FROM categories WHERE name = ?1")
            .bind(name)
            .fetch_optional(&self.db)
            .await?;

        if let Some(row) = row {
            Ok(Some(Category {
                id: row.try_get("id")?,
                name: row.try_get("name")?,
                created_at: row.try_get("created_at")?,
            }))
        } else {
            Ok(None)
        }
    }

    async fn insert(&self, name: &str) -> ArchiveResult<Category> {
        let category = Category {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            created_at: Utc::now(),
        };

        sqlx::query("INSERT INTO categories (id, name, created_at) VALUES (?1, ?2, ?3)")
            .bind(&category.id)
            .bind(&category.name)
            .bind(category.created_at)
            .execute(&self.db)
            .await?;

        Ok(category)
    }
}
