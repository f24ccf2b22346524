// crates/index/src/lib.rs
//! SQLite-backed document index: full-text, metadata, tags, and locations.
//!
//! One database file holds four sub-stores — an FTS5 table over title/body,
//! an R*Tree of point locations, a metadata key/value table, and a tag
//! membership table. Writes touch all four inside a single transaction, so
//! readers never observe a document half-updated (an old full-text record
//! paired with a new spatial entry, or vice versa).
//!
//! Access goes through a small connection pool rather than a per-thread
//! connection cache: bounded, explicitly acquired, no hidden global state.

mod migrations;
pub mod query;
pub mod synonyms;

pub use query::QueryPlan;

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::info;
use wikidex_types::{BoundingBox, GeoFilter, IndexDocument};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("SQLite error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("Failed to create database directory: {0}")]
    CreateDir(#[from] std::io::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Handle to the on-disk (or in-memory) index, wrapping a SQLite pool.
#[derive(Debug, Clone)]
pub struct Store {
    pool: SqlitePool,
    db_path: PathBuf,
}

impl Store {
    /// Open (or create) the index at the given path and run migrations.
    pub async fn open(path: &Path) -> StoreResult<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let options = SqliteConnectOptions::from_str(&format!("sqlite:{}", path.display()))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(std::time::Duration::from_secs(30));

        let pool = SqlitePoolOptions::new()
            .max_connections(4)
            .connect_with(options)
            .await?;

        let store = Self {
            pool,
            db_path: path.to_owned(),
        };
        store.run_migrations().await?;

        info!("Index store opened at {}", path.display());
        Ok(store)
    }

    /// Create an in-memory index (for testing).
    ///
    /// Capped at one connection so every handle in the pool sees the same
    /// in-memory database; a second connection would get its own empty one.
    pub async fn open_in_memory() -> StoreResult<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?
            .busy_timeout(std::time::Duration::from_secs(5));
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;
        let store = Self {
            pool,
            db_path: PathBuf::new(),
        };
        store.run_migrations().await?;
        Ok(store)
    }

    /// Path of the backing database file (empty for in-memory stores).
    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    /// Run all inline migrations, tracking applied versions in `_migrations`.
    async fn run_migrations(&self) -> StoreResult<()> {
        sqlx::query("CREATE TABLE IF NOT EXISTS _migrations (version INTEGER PRIMARY KEY)")
            .execute(&self.pool)
            .await?;

        let row: (i64,) = sqlx::query_as("SELECT COALESCE(MAX(version), 0) FROM _migrations")
            .fetch_one(&self.pool)
            .await?;
        let current_version = row.0 as usize;

        for (i, migration) in migrations::MIGRATIONS.iter().enumerate() {
            let version = i + 1; // 1-based
            if version > current_version {
                sqlx::query(migration).execute(&self.pool).await?;
                sqlx::query("INSERT INTO _migrations (version) VALUES (?)")
                    .bind(version as i64)
                    .execute(&self.pool)
                    .await?;
            }
        }

        Ok(())
    }

    /// Index a document, replacing any prior entry for its id wholesale.
    ///
    /// Delete-then-insert across all four sub-stores within one transaction:
    /// a stale spatial entry from an earlier revision can never survive a
    /// re-index without coordinates, and partial failure leaves no orphans.
    pub async fn upsert(&self, doc: &IndexDocument) -> StoreResult<()> {
        let mut tx = self.pool.begin().await?;

        clear_document(&mut tx, doc.id).await?;

        sqlx::query("INSERT INTO documents (doc_id, title, body) VALUES (?, ?, ?)")
            .bind(doc.id.to_string())
            .bind(&doc.title)
            .bind(&doc.body)
            .execute(&mut *tx)
            .await?;

        for (key, value) in &doc.metadata {
            sqlx::query("INSERT INTO metadata (doc_id, key, value) VALUES (?, ?, ?)")
                .bind(doc.id)
                .bind(key)
                .bind(value)
                .execute(&mut *tx)
                .await?;
        }

        for tag in &doc.tags {
            sqlx::query("INSERT INTO tags (doc_id, tag) VALUES (?, ?)")
                .bind(doc.id)
                .bind(tag)
                .execute(&mut *tx)
                .await?;
        }

        if let Some(location) = doc.location {
            sqlx::query(
                "INSERT INTO locations (doc_id, min_lat, max_lat, min_lon, max_lon) \
                 VALUES (?, ?, ?, ?, ?)",
            )
            .bind(doc.id)
            .bind(location.lat)
            .bind(location.lat)
            .bind(location.lon)
            .bind(location.lon)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        tracing::debug!(doc_id = doc.id, "document indexed");
        Ok(())
    }

    /// Remove a document from all four sub-stores. Idempotent: deleting an
    /// id that was never indexed is a no-op, not an error.
    pub async fn delete(&self, id: i64) -> StoreResult<()> {
        let mut tx = self.pool.begin().await?;
        clear_document(&mut tx, id).await?;
        tx.commit().await?;
        tracing::debug!(doc_id = id, "document removed from index");
        Ok(())
    }

    /// Full-text search over title and body, after synonym expansion.
    ///
    /// `query` uses FTS5 `MATCH` syntax; invalid syntax surfaces as a
    /// `StoreError` for the caller to map (a 500 at the API boundary).
    pub async fn search_text(&self, query: &str) -> StoreResult<HashSet<i64>> {
        let expanded = synonyms::expand(query);
        let ids = sqlx::query_scalar::<_, i64>(
            "SELECT CAST(doc_id AS INTEGER) FROM documents WHERE documents MATCH ?",
        )
        .bind(expanded)
        .fetch_all(&self.pool)
        .await?;
        Ok(ids.into_iter().collect())
    }

    /// Every id currently present in the full-text store.
    pub async fn all_ids(&self) -> StoreResult<HashSet<i64>> {
        let ids = sqlx::query_scalar::<_, i64>("SELECT CAST(doc_id AS INTEGER) FROM documents")
            .fetch_all(&self.pool)
            .await?;
        Ok(ids.into_iter().collect())
    }

    /// Ids whose metadata has `key` exactly equal to `value` (string compare).
    pub async fn search_metadata(&self, key: &str, value: &str) -> StoreResult<HashSet<i64>> {
        let ids = sqlx::query_scalar::<_, i64>(
            "SELECT doc_id FROM metadata WHERE key = ? AND value = ?",
        )
        .bind(key)
        .bind(value)
        .fetch_all(&self.pool)
        .await?;
        Ok(ids.into_iter().collect())
    }

    /// Ids whose stored point falls inside the bounding box enclosing the
    /// radius — a conservative superset of the true great-circle circle.
    /// Exact refinement (haversine) is the caller's responsibility.
    ///
    /// The comparison is box *overlap*, not containment. R*Tree stores
    /// coordinates as 32-bit floats rounded outward, so the stored
    /// degenerate box is a hair larger than the point whenever the
    /// coordinate is not exactly representable in f32; strict containment
    /// would miss a zero-radius query centered on the point itself.
    pub async fn search_bbox(&self, filter: &GeoFilter) -> StoreResult<HashSet<i64>> {
        let bbox = BoundingBox::around(filter.center(), filter.radius_km);
        let ids = sqlx::query_scalar::<_, i64>(
            "SELECT doc_id FROM locations \
             WHERE max_lat >= ? AND min_lat <= ? AND max_lon >= ? AND min_lon <= ?",
        )
        .bind(bbox.min_lat)
        .bind(bbox.max_lat)
        .bind(bbox.min_lon)
        .bind(bbox.max_lon)
        .fetch_all(&self.pool)
        .await?;
        Ok(ids.into_iter().collect())
    }

    /// Tags stored for a document, sorted. Storage-only: the planner never
    /// consults tags.
    pub async fn tags_for(&self, id: i64) -> StoreResult<Vec<String>> {
        let tags =
            sqlx::query_scalar::<_, String>("SELECT tag FROM tags WHERE doc_id = ? ORDER BY tag")
                .bind(id)
                .fetch_all(&self.pool)
                .await?;
        Ok(tags)
    }

    /// Metadata stored for a document.
    pub async fn metadata_for(&self, id: i64) -> StoreResult<BTreeMap<String, String>> {
        let rows: Vec<(String, String)> =
            sqlx::query_as("SELECT key, value FROM metadata WHERE doc_id = ?")
                .bind(id)
                .fetch_all(&self.pool)
                .await?;
        Ok(rows.into_iter().collect())
    }
}

/// Delete every record for `id` across all four sub-stores, inside the
/// caller's transaction.
async fn clear_document(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    id: i64,
) -> StoreResult<()> {
    // The FTS5 table stores doc_id as text
    sqlx::query("DELETE FROM documents WHERE doc_id = ?")
        .bind(id.to_string())
        .execute(&mut **tx)
        .await?;
    sqlx::query("DELETE FROM locations WHERE doc_id = ?")
        .bind(id)
        .execute(&mut **tx)
        .await?;
    sqlx::query("DELETE FROM metadata WHERE doc_id = ?")
        .bind(id)
        .execute(&mut **tx)
        .await?;
    sqlx::query("DELETE FROM tags WHERE doc_id = ?")
        .bind(id)
        .execute(&mut **tx)
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use wikidex_types::GeoFilter;

    fn sorted(ids: HashSet<i64>) -> Vec<i64> {
        let mut v: Vec<i64> = ids.into_iter().collect();
        v.sort_unstable();
        v
    }

    #[tokio::test]
    async fn test_open_in_memory() {
        let store = Store::open_in_memory().await.expect("in-memory store");
        assert!(store.all_ids().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_open_on_disk_persists() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("search.db");

        let store = Store::open(&path).await.expect("create store");
        store
            .upsert(&IndexDocument::new(1, "Apple", "apple banana"))
            .await
            .unwrap();
        drop(store);

        let reopened = Store::open(&path).await.expect("re-open store");
        assert_eq!(sorted(reopened.search_text("apple").await.unwrap()), vec![1]);
    }

    #[tokio::test]
    async fn test_search_matches_title_and_body() {
        let store = Store::open_in_memory().await.unwrap();
        store
            .upsert(&IndexDocument::new(1, "Orchard", "apple banana"))
            .await
            .unwrap();

        // Body term
        assert_eq!(sorted(store.search_text("banana").await.unwrap()), vec![1]);
        // Title term
        assert_eq!(sorted(store.search_text("orchard").await.unwrap()), vec![1]);
        // Token matching, not substring
        assert!(store.search_text("banan").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_upsert_replaces_previous_content() {
        let store = Store::open_in_memory().await.unwrap();
        store
            .upsert(&IndexDocument::new(1, "Old", "original content about databases"))
            .await
            .unwrap();
        store
            .upsert(&IndexDocument::new(1, "New", "updated content about networking"))
            .await
            .unwrap();

        // Terms unique to the first version no longer match
        assert!(store.search_text("databases").await.unwrap().is_empty());
        assert_eq!(sorted(store.search_text("networking").await.unwrap()), vec![1]);
        // Exactly one record remains
        assert_eq!(sorted(store.all_ids().await.unwrap()), vec![1]);
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let store = Store::open_in_memory().await.unwrap();

        // Never-indexed id
        store.delete(99).await.expect("delete of unknown id succeeds");

        store
            .upsert(&IndexDocument::new(1, "Apple", "apple"))
            .await
            .unwrap();
        store.delete(1).await.unwrap();
        store.delete(1).await.expect("second delete succeeds");

        assert!(store.all_ids().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_clears_every_sub_store() {
        let store = Store::open_in_memory().await.unwrap();
        let doc = IndexDocument::new(1, "Apple", "apple banana")
            .with_metadata("author", "alice")
            .with_tag("news")
            .with_location(10.0, 10.0);
        store.upsert(&doc).await.unwrap();
        store.delete(1).await.unwrap();

        assert!(store.search_text("apple").await.unwrap().is_empty());
        assert!(store.search_metadata("author", "alice").await.unwrap().is_empty());
        assert!(store.tags_for(1).await.unwrap().is_empty());
        let geo = GeoFilter { lat: 10.0, lon: 10.0, radius_km: 50.0 };
        assert!(store.search_bbox(&geo).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_spatial_containment() {
        let store = Store::open_in_memory().await.unwrap();
        store
            .upsert(&IndexDocument::new(1, "Here", "body").with_location(10.0, 10.0))
            .await
            .unwrap();

        // Zero radius centered on the point still contains it
        let at_point = GeoFilter { lat: 10.0, lon: 10.0, radius_km: 0.0 };
        assert_eq!(sorted(store.search_bbox(&at_point).await.unwrap()), vec![1]);

        // A small radius far away excludes it
        let far_away = GeoFilter { lat: -40.0, lon: 120.0, radius_km: 5.0 };
        assert!(store.search_bbox(&far_away).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_zero_radius_at_non_f32_exact_coordinates() {
        // Real-world coordinates rarely round-trip through the R*Tree's
        // 32-bit storage exactly; the stored box is rounded outward and
        // ends up a hair larger than the point. A zero-radius query
        // centered on the indexed point must still find it.
        let store = Store::open_in_memory().await.unwrap();
        store
            .upsert(&IndexDocument::new(1, "Paris", "body").with_location(48.8566, 2.3522))
            .await
            .unwrap();

        let at_point = GeoFilter { lat: 48.8566, lon: 2.3522, radius_km: 0.0 };
        assert_eq!(sorted(store.search_bbox(&at_point).await.unwrap()), vec![1]);
    }

    #[tokio::test]
    async fn test_reindex_without_coordinates_clears_spatial_entry() {
        let store = Store::open_in_memory().await.unwrap();
        store
            .upsert(&IndexDocument::new(1, "Apple", "apple").with_location(10.0, 10.0))
            .await
            .unwrap();

        // Re-index the same id without a location
        store.upsert(&IndexDocument::new(1, "Apple", "apple")).await.unwrap();

        // Even a query covering the original point finds nothing
        let covering = GeoFilter { lat: 10.0, lon: 10.0, radius_km: 500.0 };
        assert!(store.search_bbox(&covering).await.unwrap().is_empty());
        // The full-text record is still there
        assert_eq!(sorted(store.search_text("apple").await.unwrap()), vec![1]);
    }

    #[tokio::test]
    async fn test_metadata_equality_is_string_compare() {
        let store = Store::open_in_memory().await.unwrap();
        store
            .upsert(&IndexDocument::new(1, "A", "a").with_metadata("year", "2024"))
            .await
            .unwrap();
        store
            .upsert(&IndexDocument::new(2, "B", "b").with_metadata("year", "2025"))
            .await
            .unwrap();

        assert_eq!(sorted(store.search_metadata("year", "2024").await.unwrap()), vec![1]);
        assert!(store.search_metadata("year", "1999").await.unwrap().is_empty());
        assert!(store.search_metadata("month", "2024").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_upsert_replaces_metadata_and_tags() {
        let store = Store::open_in_memory().await.unwrap();
        store
            .upsert(
                &IndexDocument::new(1, "A", "a")
                    .with_metadata("author", "alice")
                    .with_tag("news"),
            )
            .await
            .unwrap();
        store
            .upsert(
                &IndexDocument::new(1, "A", "a")
                    .with_metadata("author", "bob")
                    .with_tag("science"),
            )
            .await
            .unwrap();

        assert!(store.search_metadata("author", "alice").await.unwrap().is_empty());
        assert_eq!(sorted(store.search_metadata("author", "bob").await.unwrap()), vec![1]);
        assert_eq!(store.tags_for(1).await.unwrap(), vec!["science".to_string()]);
    }

    #[tokio::test]
    async fn test_metadata_round_trip() {
        let store = Store::open_in_memory().await.unwrap();
        let doc = IndexDocument::new(1, "A", "a")
            .with_metadata("author", "alice")
            .with_metadata("year", "2024");
        store.upsert(&doc).await.unwrap();

        assert_eq!(store.metadata_for(1).await.unwrap(), doc.metadata);
        assert!(store.metadata_for(2).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_fts_syntax_is_an_error() {
        let store = Store::open_in_memory().await.unwrap();
        store
            .upsert(&IndexDocument::new(1, "Apple", "apple"))
            .await
            .unwrap();

        let result = store.search_text("\"unterminated").await;
        assert!(result.is_err(), "unbalanced quote should fail FTS parsing");
    }

    #[tokio::test]
    async fn test_synonym_expansion_reaches_the_index() {
        let store = Store::open_in_memory().await.unwrap();
        store
            .upsert(&IndexDocument::new(1, "Cheetah", "a quick animal"))
            .await
            .unwrap();

        // "fast" expands to an OR group including "quick"
        assert_eq!(sorted(store.search_text("fast").await.unwrap()), vec![1]);
    }
}
