use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::application::ports::{ClearScope, LocalRecordStore};
use crate::domain::entities::{
    Bookmark, BookmarkDraft, LastRead, LastReadDraft, ReadingPosition,
};
use crate::domain::value_objects::{BookmarkId, BookmarkKind, LastReadKind, RefId};
use crate::shared::error::AppError;

/// Guest-scoped record store over the local SQLite database.
pub struct SqliteGuestStore {
    pool: SqlitePool,
}

impl SqliteGuestStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct BookmarkRow {
    id: String,
    kind: String,
    ref_id: i64,
    summary: Option<String>,
    url: Option<String>,
    created_at: i64,
}

impl BookmarkRow {
    fn into_entity(self) -> Result<Bookmark, AppError> {
        let id = BookmarkId::new(self.id)
            .map_err(|err| AppError::Database(format!("malformed bookmark row: {err}")))?;
        let kind = BookmarkKind::try_from(self.kind.as_str())
            .map_err(|err| AppError::Database(format!("malformed bookmark row: {err}")))?;
        let ref_id = RefId::new(self.ref_id)
            .map_err(|err| AppError::Database(format!("malformed bookmark row: {err}")))?;
        let created_at = timestamp_from_millis(self.created_at)?;
        Ok(Bookmark::from_parts(
            id,
            kind,
            ref_id,
            self.summary,
            self.url,
            created_at,
        ))
    }
}

#[derive(sqlx::FromRow)]
struct LastReadRow {
    kind: String,
    surah_id: Option<i64>,
    ayah_number: Option<i64>,
    dua_id: Option<i64>,
    summary: Option<String>,
    url: Option<String>,
    updated_at: i64,
}

impl LastReadRow {
    fn into_entity(self) -> Result<LastRead, AppError> {
        let kind = LastReadKind::try_from(self.kind.as_str())
            .map_err(|err| AppError::Database(format!("malformed last-read row: {err}")))?;
        let position = match kind {
            LastReadKind::Quran => {
                let surah_id = self
                    .surah_id
                    .ok_or_else(|| AppError::Database("last-read row missing surah_id".into()))?;
                let ayah_number = self.ayah_number.ok_or_else(|| {
                    AppError::Database("last-read row missing ayah_number".into())
                })?;
                let surah_id = RefId::new(surah_id)
                    .map_err(|err| AppError::Database(format!("malformed last-read row: {err}")))?;
                ReadingPosition::quran(surah_id, ayah_number as u32)
                    .map_err(|err| AppError::Database(format!("malformed last-read row: {err}")))?
            }
            LastReadKind::Dua => {
                let dua_id = self
                    .dua_id
                    .ok_or_else(|| AppError::Database("last-read row missing dua_id".into()))?;
                let dua_id = RefId::new(dua_id)
                    .map_err(|err| AppError::Database(format!("malformed last-read row: {err}")))?;
                ReadingPosition::dua(dua_id)
            }
        };
        let updated_at = timestamp_from_millis(self.updated_at)?;
        Ok(LastRead::from_parts(
            position,
            self.summary,
            self.url,
            updated_at,
        ))
    }
}

fn timestamp_from_millis(millis: i64) -> Result<DateTime<Utc>, AppError> {
    DateTime::from_timestamp_millis(millis)
        .ok_or_else(|| AppError::Database(format!("timestamp out of range: {millis}")))
}

#[async_trait]
impl LocalRecordStore for SqliteGuestStore {
    async fn add_bookmark(&self, draft: BookmarkDraft) -> Result<(), AppError> {
        let id = Uuid::new_v4().to_string();
        let created_at = Utc::now().timestamp_millis();

        // INSERT OR IGNORE gives the idempotent-insert contract: a second
        // add for the same (kind, ref_id) leaves the first row untouched.
        sqlx::query(
            r#"
            INSERT OR IGNORE INTO guest_bookmarks (id, kind, ref_id, summary, url, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&id)
        .bind(draft.kind.as_str())
        .bind(draft.ref_id.value())
        .bind(&draft.summary)
        .bind(&draft.url)
        .bind(created_at)
        .execute(&self.pool)
        .await?;

        debug!("guest bookmark added: {}:{}", draft.kind, draft.ref_id);
        Ok(())
    }

    async fn remove_bookmark(&self, kind: BookmarkKind, ref_id: RefId) -> Result<(), AppError> {
        sqlx::query(
            r#"
            DELETE FROM guest_bookmarks
            WHERE kind = ?1 AND ref_id = ?2
            "#,
        )
        .bind(kind.as_str())
        .bind(ref_id.value())
        .execute(&self.pool)
        .await?;

        debug!("guest bookmark removed: {kind}:{ref_id}");
        Ok(())
    }

    async fn list_bookmarks(
        &self,
        kind: Option<BookmarkKind>,
    ) -> Result<Vec<Bookmark>, AppError> {
        let rows: Vec<BookmarkRow> = match kind {
            Some(kind) => {
                sqlx::query_as(
                    r#"
                    SELECT id, kind, ref_id, summary, url, created_at
                    FROM guest_bookmarks
                    WHERE kind = ?1
                    ORDER BY created_at ASC, rowid ASC
                    "#,
                )
                .bind(kind.as_str())
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as(
                    r#"
                    SELECT id, kind, ref_id, summary, url, created_at
                    FROM guest_bookmarks
                    ORDER BY created_at ASC, rowid ASC
                    "#,
                )
                .fetch_all(&self.pool)
                .await?
            }
        };

        rows.into_iter().map(BookmarkRow::into_entity).collect()
    }

    async fn set_last_read(&self, draft: LastReadDraft) -> Result<(), AppError> {
        let kind = draft.position.kind();
        let (surah_id, ayah_number, dua_id) = match draft.position {
            ReadingPosition::Quran {
                surah_id,
                ayah_number,
            } => (Some(surah_id.value()), Some(ayah_number as i64), None),
            ReadingPosition::Dua { dua_id } => (None, None, Some(dua_id.value())),
        };
        let updated_at = Utc::now().timestamp_millis();

        sqlx::query(
            r#"
            INSERT INTO guest_last_reads (kind, surah_id, ayah_number, dua_id, summary, url, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            ON CONFLICT(kind) DO UPDATE SET
                surah_id = excluded.surah_id,
                ayah_number = excluded.ayah_number,
                dua_id = excluded.dua_id,
                summary = excluded.summary,
                url = excluded.url,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(kind.as_str())
        .bind(surah_id)
        .bind(ayah_number)
        .bind(dua_id)
        .bind(&draft.summary)
        .bind(&draft.url)
        .bind(updated_at)
        .execute(&self.pool)
        .await?;

        debug!("guest last-read updated for {kind}");
        Ok(())
    }

    async fn get_last_read(&self, kind: LastReadKind) -> Result<Option<LastRead>, AppError> {
        let row: Option<LastReadRow> = sqlx::query_as(
            r#"
            SELECT kind, surah_id, ayah_number, dua_id, summary, url, updated_at
            FROM guest_last_reads
            WHERE kind = ?1
            "#,
        )
        .bind(kind.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(LastReadRow::into_entity).transpose()
    }

    async fn clear(&self, scope: ClearScope) -> Result<(), AppError> {
        match scope {
            ClearScope::Bookmarks => {
                sqlx::query("DELETE FROM guest_bookmarks")
                    .execute(&self.pool)
                    .await?;
            }
            ClearScope::LastReads => {
                sqlx::query("DELETE FROM guest_last_reads")
                    .execute(&self.pool)
                    .await?;
            }
            ClearScope::All => {
                sqlx::query("DELETE FROM guest_bookmarks")
                    .execute(&self.pool)
                    .await?;
                sqlx::query("DELETE FROM guest_last_reads")
                    .execute(&self.pool)
                    .await?;
            }
        }

        debug!("guest records cleared: {scope:?}");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::database::ConnectionPool;
    use tempfile::TempDir;

    async fn setup_store() -> SqliteGuestStore {
        let pool = ConnectionPool::from_memory().await.unwrap();
        pool.initialize_schema().await.unwrap();
        SqliteGuestStore::new(pool.get_pool().clone())
    }

    fn ayah(ref_id: i64) -> BookmarkDraft {
        BookmarkDraft::new(BookmarkKind::Ayah, RefId::new(ref_id).unwrap())
    }

    fn dua(ref_id: i64) -> BookmarkDraft {
        BookmarkDraft::new(BookmarkKind::Dua, RefId::new(ref_id).unwrap())
    }

    #[tokio::test]
    async fn add_bookmark_is_idempotent() {
        let store = setup_store().await;

        store.add_bookmark(ayah(101)).await.unwrap();
        store.add_bookmark(ayah(101)).await.unwrap();

        let bookmarks = store.list_bookmarks(None).await.unwrap();
        assert_eq!(bookmarks.len(), 1);
        assert_eq!(bookmarks[0].ref_id().value(), 101);
    }

    #[tokio::test]
    async fn same_ref_id_across_kinds_is_two_bookmarks() {
        let store = setup_store().await;

        store.add_bookmark(ayah(4)).await.unwrap();
        store.add_bookmark(dua(4)).await.unwrap();

        assert_eq!(store.list_bookmarks(None).await.unwrap().len(), 2);
        let ayahs = store
            .list_bookmarks(Some(BookmarkKind::Ayah))
            .await
            .unwrap();
        assert_eq!(ayahs.len(), 1);
        assert_eq!(ayahs[0].kind(), BookmarkKind::Ayah);
    }

    #[tokio::test]
    async fn remove_missing_bookmark_is_noop() {
        let store = setup_store().await;
        store.add_bookmark(ayah(1)).await.unwrap();

        store
            .remove_bookmark(BookmarkKind::Ayah, RefId::new(999).unwrap())
            .await
            .unwrap();

        assert_eq!(store.list_bookmarks(None).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn list_preserves_insertion_order() {
        let store = setup_store().await;
        for ref_id in [30, 10, 20] {
            store.add_bookmark(ayah(ref_id)).await.unwrap();
        }

        let order: Vec<i64> = store
            .list_bookmarks(None)
            .await
            .unwrap()
            .iter()
            .map(|b| b.ref_id().value())
            .collect();
        assert_eq!(order, vec![30, 10, 20]);
    }

    #[tokio::test]
    async fn bookmark_metadata_round_trips() {
        let store = setup_store().await;
        store
            .add_bookmark(
                ayah(2255)
                    .with_summary(r#"{"surahName":"Al-Baqarah","ayahNumber":255}"#)
                    .with_url("/quran/2#ayah-255"),
            )
            .await
            .unwrap();

        let bookmarks = store.list_bookmarks(None).await.unwrap();
        assert_eq!(
            bookmarks[0].summary(),
            Some(r#"{"surahName":"Al-Baqarah","ayahNumber":255}"#)
        );
        assert_eq!(bookmarks[0].url(), Some("/quran/2#ayah-255"));
    }

    #[tokio::test]
    async fn set_last_read_overwrites_per_kind() {
        let store = setup_store().await;

        let first = ReadingPosition::quran(RefId::new(1).unwrap(), 1).unwrap();
        let second = ReadingPosition::quran(RefId::new(2).unwrap(), 255).unwrap();
        store.set_last_read(LastReadDraft::new(first)).await.unwrap();
        store
            .set_last_read(LastReadDraft::new(second))
            .await
            .unwrap();

        let stored = store
            .get_last_read(LastReadKind::Quran)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.position(), second);

        // The other kind is untouched and independent.
        assert!(store
            .get_last_read(LastReadKind::Dua)
            .await
            .unwrap()
            .is_none());
        let dua_position = ReadingPosition::dua(RefId::new(7).unwrap());
        store
            .set_last_read(LastReadDraft::new(dua_position))
            .await
            .unwrap();
        assert_eq!(
            store
                .get_last_read(LastReadKind::Quran)
                .await
                .unwrap()
                .unwrap()
                .position(),
            second
        );
    }

    #[tokio::test]
    async fn clear_scopes_are_independent() {
        let store = setup_store().await;
        store.add_bookmark(ayah(1)).await.unwrap();
        store
            .set_last_read(LastReadDraft::new(ReadingPosition::dua(
                RefId::new(3).unwrap(),
            )))
            .await
            .unwrap();

        store.clear(ClearScope::Bookmarks).await.unwrap();
        assert!(store.list_bookmarks(None).await.unwrap().is_empty());
        assert!(store
            .get_last_read(LastReadKind::Dua)
            .await
            .unwrap()
            .is_some());

        store.add_bookmark(ayah(2)).await.unwrap();
        store.clear(ClearScope::All).await.unwrap();
        assert!(store.list_bookmarks(None).await.unwrap().is_empty());
        assert!(store
            .get_last_read(LastReadKind::Dua)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn persists_across_reopen_on_disk() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("guest.db");
        let url = format!("sqlite:{}?mode=rwc", db_path.display());

        {
            let pool = ConnectionPool::new(&url, 1).await.unwrap();
            pool.initialize_schema().await.unwrap();
            let store = SqliteGuestStore::new(pool.get_pool().clone());
            store.add_bookmark(ayah(12)).await.unwrap();
            pool.close().await;
        }

        let pool = ConnectionPool::new(&url, 1).await.unwrap();
        pool.initialize_schema().await.unwrap();
        let store = SqliteGuestStore::new(pool.get_pool().clone());
        assert_eq!(store.list_bookmarks(None).await.unwrap().len(), 1);
    }
}
