/// Print feed view model
///
/// Holds the in-memory list state a UI renders from and keeps it in
/// step with the repositories. Loads replace the state wholesale;
/// mutations patch it in place without a re-fetch. Ordering comes from
/// the print repository (newest first) and is passed through untouched.
use crate::{
    categories::{Category, CategoryStore},
    error::ArchiveResult,
    prints::{Print, PrintStore},
};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Renderable state of the feed
#[derive(Debug, Clone, Default)]
pub struct FeedState {
    /// Prints visible to this feed, newest first
    pub prints: Vec<Print>,
    /// All categories, sorted by name
    pub categories: Vec<Category>,
    /// Whether a load is in flight
    pub is_loading: bool,
    /// Message from the last failed load, if any
    pub error: Option<String>,
}

/// Feed over the print and category repositories
#[derive(Clone)]
pub struct PrintFeed {
    prints: PrintStore,
    categories: CategoryStore,
    family_member: Option<String>,
    state: Arc<RwLock<FeedState>>,
    load_seq: Arc<AtomicU64>,
}

impl PrintFeed {
    /// Create a new feed, optionally scoped to one family member
    pub fn new(
        prints: PrintStore,
        categories: CategoryStore,
        family_member: Option<String>,
    ) -> Self {
        Self {
            prints,
            categories,
            family_member,
            state: Arc::new(RwLock::new(FeedState::default())),
            load_seq: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Current state, cloned
    pub async fn snapshot(&self) -> FeedState {
        self.state.read().await.clone()
    }

    /// Load prints and categories, replacing the current state
    ///
    /// Overlapping loads follow last call wins: each call takes a fresh
    /// token, and a call whose token has been superseded by the time its
    /// reads finish discards its result instead of overwriting newer
    /// data. A failed load records the error and leaves both lists
    /// empty rather than keeping a stale partial state.
    pub async fn load(&self) {
        let token = self.load_seq.fetch_add(1, Ordering::SeqCst) + 1;
        self.run_load(token).await;
    }

    /// Re-run a full load after mutations this feed cannot patch itself
    pub async fn refresh(&self) {
        self.load().await;
    }

    /// Reassign one print's category and patch it in place
    ///
    /// The patched name is normalized the way the resolver normalizes
    /// it (trimmed, empty treated as none), so the snapshot shows what
    /// a reload would show. Returns whether a print was updated; on
    /// failure the state is left untouched.
    pub async fn update_category(&self, print_id: &str, category_name: Option<&str>) -> bool {
        let stored_name = category_name
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(String::from);

        let updated = match self
            .prints
            .update_category(print_id, stored_name.as_deref())
            .await
        {
            Ok(updated) => updated,
            Err(e) => {
                tracing::warn!("Category update failed for print {}: {}", print_id, e);
                false
            }
        };

        if updated {
            let mut state = self.state.write().await;
            if let Some(print) = state.prints.iter_mut().find(|p| p.id == print_id) {
                print.category_name = stored_name;
            }
        }

        updated
    }

    /// Delete one print and drop it from the in-memory list
    ///
    /// Returns whether a print was deleted. On failure the state is
    /// left untouched.
    pub async fn remove_print(&self, print_id: &str) -> bool {
        let removed = match self.prints.delete(print_id).await {
            Ok(removed) => removed,
            Err(e) => {
                tracing::warn!("Print removal failed for {}: {}", print_id, e);
                false
            }
        };

        if removed {
            let mut state = self.state.write().await;
            state.prints.retain(|p| p.id != print_id);
        }

        removed
    }

    async fn run_load(&self, token: u64) {
        {
            let mut state = self.state.write().await;
            state.is_loading = true;
        }

        let loaded = self.fetch().await;

        let mut state = self.state.write().await;
        if self.load_seq.load(Ordering::SeqCst) != token {
            // Superseded while in flight; a newer call owns the state now
            return;
        }

        match loaded {
            Ok((prints, categories)) => {
                state.prints = prints;
                state.categories = categories;
                state.error = None;
            }
            Err(e) => {
                tracing::warn!("Feed load failed: {}", e);
                state.prints = Vec::new();
                state.categories = Vec::new();
                state.error = Some(e.to_string());
            }
        }
        state.is_loading = false;
    }

    /// Two independent reads; no transactional relationship between them
    async fn fetch(&self) -> ArchiveResult<(Vec<Print>, Vec<Category>)> {
        let prints = self.prints.list(self.family_member.as_deref()).await?;
        let categories = self.categories.list().await?;
        Ok((prints, categories))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blob_store::MemoryBlobBackend;
    use crate::db;
    use crate::prints::UploadFile;
    use sqlx::SqlitePool;

    async fn create_test_feed(family_member: Option<&str>) -> (PrintFeed, PrintStore, SqlitePool) {
        let pool = SqlitePool::connect(":memory:").await.unwrap();
        db::init_schema(&pool).await.unwrap();

        let backend = Arc::new(MemoryBlobBackend::new());
        let categories = CategoryStore::new(pool.clone());
        let store = PrintStore::new(pool.clone(), backend, categories.clone());
        let feed = PrintFeed::new(store.clone(), categories, family_member.map(String::from));
        (feed, store, pool)
    }

    fn jpeg(name: &str) -> UploadFile {
        UploadFile::new(name.to_string(), "image/jpeg".to_string(), vec![0u8; 1024])
    }

    #[tokio::test]
    async fn test_load_populates_state() {
        let (feed, store, _pool) = create_test_feed(None).await;

        store
            .upload(jpeg("a.jpg"), Some("Mom"), Some("Trip"))
            .await
            .unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        store
            .upload(jpeg("b.jpg"), Some("Dad"), Some("School"))
            .await
            .unwrap();

        feed.load().await;

        let state = feed.snapshot().await;
        assert_eq!(state.prints.len(), 2);
        assert_eq!(state.prints[0].filename, "b.jpg");
        assert_eq!(state.prints[1].filename, "a.jpg");
        assert_eq!(state.categories.len(), 2);
        assert!(!state.is_loading);
        assert!(state.error.is_none());
    }

    #[tokio::test]
    async fn test_load_failure_clears_state() {
        let (feed, store, pool) = create_test_feed(None).await;

        store.upload(jpeg("a.jpg"), None, None).await.unwrap();
        feed.load().await;
        assert_eq!(feed.snapshot().await.prints.len(), 1);

        // Break the next read; the failed load must not keep stale lists
        sqlx::query("DROP TABLE prints")
            .execute(&pool)
            .await
            .unwrap();
        feed.load().await;

        let state = feed.snapshot().await;
        assert!(state.prints.is_empty());
        assert!(state.categories.is_empty());
        assert!(state.error.is_some());
        assert!(!state.is_loading);
    }

    #[tokio::test]
    async fn test_stale_load_is_discarded() {
        let (feed, store, _pool) = create_test_feed(None).await;

        let old = store.upload(jpeg("old.jpg"), None, None).await.unwrap();
        feed.load().await;
        let new = store.upload(jpeg("new.jpg"), None, None).await.unwrap();
        feed.load().await;
        assert_eq!(feed.snapshot().await.prints.len(), 2);

        // The database moves on, then a load holding an already
        // superseded token resolves; its result must not land
        store.delete(&new.id).await.unwrap();
        feed.run_load(1).await;

        let state = feed.snapshot().await;
        assert_eq!(state.prints.len(), 2);

        // A load with the current token still applies
        feed.load().await;
        let state = feed.snapshot().await;
        assert_eq!(state.prints.len(), 1);
        assert_eq!(state.prints[0].id, old.id);
    }

    #[tokio::test]
    async fn test_update_category_patches_in_place() {
        let (feed, store, _pool) = create_test_feed(None).await;

        let print = store
            .upload(jpeg("a.jpg"), None, Some("Trip"))
            .await
            .unwrap();
        feed.load().await;

        assert!(feed.update_category(&print.id, Some("School")).await);

        let state = feed.snapshot().await;
        assert_eq!(state.prints[0].category_name.as_deref(), Some("School"));

        // The repository row moved too
        let row = store.get_by_id(&print.id).await.unwrap().unwrap();
        assert_eq!(row.category_name.as_deref(), Some("School"));
    }

    #[tokio::test]
    async fn test_update_category_patch_survives_reload() {
        let (feed, store, _pool) = create_test_feed(None).await;

        let print = store.upload(jpeg("a.jpg"), None, None).await.unwrap();
        feed.load().await;

        // The patched name matches the stored (trimmed) one
        assert!(feed.update_category(&print.id, Some("  Trip  ")).await);
        assert_eq!(
            feed.snapshot().await.prints[0].category_name.as_deref(),
            Some("Trip")
        );
        feed.refresh().await;
        assert_eq!(
            feed.snapshot().await.prints[0].category_name.as_deref(),
            Some("Trip")
        );

        // A whitespace-only name clears the category, in the patch too
        assert!(feed.update_category(&print.id, Some("   ")).await);
        assert_eq!(feed.snapshot().await.prints[0].category_name, None);
        feed.refresh().await;
        assert_eq!(feed.snapshot().await.prints[0].category_name, None);
    }

    #[tokio::test]
    async fn test_update_category_missing_print_leaves_state() {
        let (feed, store, _pool) = create_test_feed(None).await;

        store
            .upload(jpeg("a.jpg"), None, Some("Trip"))
            .await
            .unwrap();
        feed.load().await;

        assert!(!feed.update_category("no-such-id", Some("School")).await);

        let state = feed.snapshot().await;
        assert_eq!(state.prints[0].category_name.as_deref(), Some("Trip"));
    }

    #[tokio::test]
    async fn test_remove_print_filters_state() {
        let (feed, store, _pool) = create_test_feed(None).await;

        let a = store.upload(jpeg("a.jpg"), None, None).await.unwrap();
        store.upload(jpeg("b.jpg"), None, None).await.unwrap();
        feed.load().await;

        assert!(feed.remove_print(&a.id).await);

        let state = feed.snapshot().await;
        assert_eq!(state.prints.len(), 1);
        assert_eq!(state.prints[0].filename, "b.jpg");
        assert!(store.get_by_id(&a.id).await.unwrap().is_none());

        // Already gone; state stays as is
        assert!(!feed.remove_print(&a.id).await);
        assert_eq!(feed.snapshot().await.prints.len(), 1);
    }

    #[tokio::test]
    async fn test_refresh_picks_up_external_changes() {
        let (feed, store, _pool) = create_test_feed(None).await;

        store.upload(jpeg("a.jpg"), None, None).await.unwrap();
        feed.load().await;
        assert_eq!(feed.snapshot().await.prints.len(), 1);

        store.upload(jpeg("b.jpg"), None, None).await.unwrap();
        feed.refresh().await;
        assert_eq!(feed.snapshot().await.prints.len(), 2);
    }

    #[tokio::test]
    async fn test_feed_scoped_to_family_member() {
        let (feed, store, _pool) = create_test_feed(Some("Mom")).await;

        store
            .upload(jpeg("mom.jpg"), Some("Mom"), None)
            .await
            .unwrap();
        store
            .upload(jpeg("dad.jpg"), Some("Dad"), None)
            .await
            .unwrap();

        feed.load().await;

        let state = feed.snapshot().await;
        assert_eq!(state.prints.len(), 1);
        assert_eq!(state.prints[0].filename, "mom.jpg");
    }
}
