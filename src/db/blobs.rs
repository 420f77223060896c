//! The blob store: typed JSON payloads in the shared `blobs` table.
//!
//! Reads go through the pool; writes take a connection so the reconciler can
//! run them inside one transaction per composite write. Handles are stable:
//! updating a blob never changes its id.

use chrono::Utc;
use serde::{de::DeserializeOwned, Serialize};
use sqlx::{Row, SqliteConnection, SqlitePool};

use crate::errors::AppError;
use crate::models::{BlobKind, BlobRecord};

/// Read-side access to the blob store.
#[derive(Clone)]
pub struct BlobStore {
    pool: SqlitePool,
}

impl BlobStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Fetch a raw blob record.
    pub async fn get(&self, handle: i64) -> Result<Option<BlobRecord>, AppError> {
        let row = sqlx::query("SELECT id, kind, data, updated_at FROM blobs WHERE id = ?")
            .bind(handle)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|r| BlobRecord {
            id: r.get("id"),
            kind: r.get("kind"),
            data: r.get("data"),
            updated_at: r.get("updated_at"),
        }))
    }

    /// Read a typed payload. Returns `None` when the record is missing, the
    /// stored kind does not match, or the payload fails to parse. Those cases
    /// are logged and absorbed; only connection-level failures propagate.
    pub async fn read<T: DeserializeOwned>(
        &self,
        handle: i64,
        kind: BlobKind,
    ) -> Result<Option<T>, AppError> {
        let Some(record) = self.get(handle).await? else {
            tracing::warn!(handle, kind = kind.as_str(), "blob missing");
            return Ok(None);
        };

        if record.kind != kind.as_str() {
            tracing::warn!(
                handle,
                expected = kind.as_str(),
                stored = %record.kind,
                "blob kind mismatch"
            );
            return Ok(None);
        }

        match serde_json::from_str(&record.data) {
            Ok(value) => Ok(Some(value)),
            Err(err) => {
                tracing::warn!(handle, kind = kind.as_str(), %err, "blob payload unreadable");
                Ok(None)
            }
        }
    }

    /// The per-field degrade combinator: an unset handle or an unreadable
    /// payload yields the type's default value.
    pub async fn read_or_default<T: DeserializeOwned + Default>(
        &self,
        handle: Option<i64>,
        kind: BlobKind,
    ) -> Result<T, AppError> {
        match handle {
            Some(h) => Ok(self.read(h, kind).await?.unwrap_or_default()),
            None => Ok(T::default()),
        }
    }

    /// Find the singleton blob of a kind (used for the homepage).
    pub async fn find_one_by_kind(&self, kind: BlobKind) -> Result<Option<BlobRecord>, AppError> {
        let row = sqlx::query(
            "SELECT id, kind, data, updated_at FROM blobs WHERE kind = ? ORDER BY id LIMIT 1",
        )
        .bind(kind.as_str())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| BlobRecord {
            id: r.get("id"),
            kind: r.get("kind"),
            data: r.get("data"),
            updated_at: r.get("updated_at"),
        }))
    }

    /// Insert a new blob and return its handle.
    pub async fn create<T: Serialize>(
        conn: &mut SqliteConnection,
        kind: BlobKind,
        value: &T,
    ) -> Result<i64, AppError> {
        let data = serde_json::to_string(value)?;
        let now = Utc::now().to_rfc3339();

        let result = sqlx::query("INSERT INTO blobs (kind, data, updated_at) VALUES (?, ?, ?)")
            .bind(kind.as_str())
            .bind(&data)
            .bind(&now)
            .execute(conn)
            .await?;

        Ok(result.last_insert_rowid())
    }

    /// Rewrite a blob in place only when the serialized payload differs.
    /// Returns whether a write happened.
    pub async fn update_if_changed<T: Serialize>(
        conn: &mut SqliteConnection,
        handle: i64,
        kind: BlobKind,
        value: &T,
    ) -> Result<bool, AppError> {
        let data = serde_json::to_string(value)?;

        let existing: Option<String> = sqlx::query("SELECT data FROM blobs WHERE id = ?")
            .bind(handle)
            .fetch_optional(&mut *conn)
            .await?
            .map(|r| r.get("data"));

        if existing.as_deref() == Some(data.as_str()) {
            return Ok(false);
        }

        let now = Utc::now().to_rfc3339();
        sqlx::query("UPDATE blobs SET kind = ?, data = ?, updated_at = ? WHERE id = ?")
            .bind(kind.as_str())
            .bind(&data)
            .bind(&now)
            .bind(handle)
            .execute(conn)
            .await?;

        Ok(true)
    }

    /// Delete one blob (cascade path for composite entity deletes).
    pub async fn delete(conn: &mut SqliteConnection, handle: i64) -> Result<(), AppError> {
        sqlx::query("DELETE FROM blobs WHERE id = ?")
            .bind(handle)
            .execute(conn)
            .await?;
        Ok(())
    }

    /// Delete a batch of blobs.
    pub async fn delete_many(
        conn: &mut SqliteConnection,
        handles: &[i64],
    ) -> Result<(), AppError> {
        for handle in handles {
            Self::delete(conn, *handle).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_database;
    use crate::models::{MetaInfo, TimeInfo};
    use tempfile::TempDir;

    async fn test_store() -> (TempDir, SqlitePool, BlobStore) {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let pool = init_database(&temp_dir.path().join("test.db"))
            .await
            .expect("Failed to init DB");
        let store = BlobStore::new(pool.clone());
        (temp_dir, pool, store)
    }

    #[tokio::test]
    async fn test_update_keeps_handle_stable() {
        let (_temp_dir, pool, store) = test_store().await;
        let mut conn = pool.acquire().await.unwrap();

        let handle = BlobStore::create(&mut conn, BlobKind::Time, &TimeInfo { days: 3, nights: 2 })
            .await
            .unwrap();

        let changed = BlobStore::update_if_changed(
            &mut conn,
            handle,
            BlobKind::Time,
            &TimeInfo { days: 5, nights: 4 },
        )
        .await
        .unwrap();
        assert!(changed);

        let stored: TimeInfo = store.read(handle, BlobKind::Time).await.unwrap().unwrap();
        assert_eq!(stored, TimeInfo { days: 5, nights: 4 });

        let changed = BlobStore::update_if_changed(
            &mut conn,
            handle,
            BlobKind::Time,
            &TimeInfo { days: 5, nights: 4 },
        )
        .await
        .unwrap();
        assert!(!changed);
    }

    #[tokio::test]
    async fn test_kind_mismatch_read_degrades() {
        let (_temp_dir, pool, store) = test_store().await;
        let mut conn = pool.acquire().await.unwrap();

        let handle = BlobStore::create(&mut conn, BlobKind::Time, &TimeInfo { days: 3, nights: 2 })
            .await
            .unwrap();

        let wrong: Option<MetaInfo> = store.read(handle, BlobKind::Meta).await.unwrap();
        assert!(wrong.is_none());

        let fallback: MetaInfo = store
            .read_or_default(Some(handle), BlobKind::Meta)
            .await
            .unwrap();
        assert_eq!(fallback, MetaInfo::default());
    }

    #[tokio::test]
    async fn test_dangling_handle_reads_default() {
        let (_temp_dir, _pool, store) = test_store().await;

        let missing: Option<TimeInfo> = store.read(9999, BlobKind::Time).await.unwrap();
        assert!(missing.is_none());

        let fallback: TimeInfo = store
            .read_or_default(Some(9999), BlobKind::Time)
            .await
            .unwrap();
        assert_eq!(fallback, TimeInfo::default());
    }
}
