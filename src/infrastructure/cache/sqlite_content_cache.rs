use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use crate::application::ports::ContentCache;
use crate::domain::entities::{Dua, DuaCategory, OfflineStatus, Surah, SurahSummary};
use crate::domain::value_objects::{ContentKind, OfflineTarget};
use crate::shared::error::AppError;

const META_QURAN_DOWNLOADED: &str = "quran_downloaded";
const META_DUAS_DOWNLOADED: &str = "duas_downloaded";
const META_QURAN_LIST_UPDATED: &str = "quran_list_updated";
const META_QURAN_FULL_UPDATED: &str = "quran_full_updated";
const META_DUAS_UPDATED: &str = "duas_updated";
const META_DUA_CATEGORIES_UPDATED: &str = "dua_categories_updated";
const META_QURAN_PROGRESS: &str = "quran_download_progress";
const META_DUAS_PROGRESS: &str = "duas_download_progress";

/// Content mirror over the local SQLite database. Collection rows are stored
/// as JSON keyed by their provider id; flags and progress live in a
/// key-value metadata table.
pub struct SqliteContentCache {
    pool: SqlitePool,
}

impl SqliteContentCache {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn meta(&self, key: &str) -> Result<Option<String>, AppError> {
        let value: Option<String> =
            sqlx::query_scalar("SELECT value FROM cache_metadata WHERE key = ?1")
                .bind(key)
                .fetch_optional(&self.pool)
                .await?;
        Ok(value)
    }

    async fn set_meta(&self, key: &str, value: &str) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO cache_metadata (key, value, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(key)
        .bind(value)
        .bind(Utc::now().timestamp_millis())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn delete_meta(&self, key: &str) -> Result<(), AppError> {
        sqlx::query("DELETE FROM cache_metadata WHERE key = ?1")
            .bind(key)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn meta_flag(&self, key: &str) -> Result<bool, AppError> {
        Ok(self.meta(key).await?.as_deref() == Some("true"))
    }

    async fn meta_timestamp(&self, key: &str) -> Result<Option<DateTime<Utc>>, AppError> {
        let Some(raw) = self.meta(key).await? else {
            return Ok(None);
        };
        let millis = raw
            .parse::<i64>()
            .map_err(|err| AppError::Database(format!("malformed {key} value: {err}")))?;
        Ok(DateTime::from_timestamp_millis(millis))
    }

    async fn meta_progress(&self, key: &str) -> Result<u8, AppError> {
        let Some(raw) = self.meta(key).await? else {
            return Ok(0);
        };
        raw.parse::<u8>()
            .map_err(|err| AppError::Database(format!("malformed {key} value: {err}")))
    }

    async fn clear_quran(&self) -> Result<(), AppError> {
        sqlx::query("DELETE FROM surah_index")
            .execute(&self.pool)
            .await?;
        sqlx::query("DELETE FROM surah_details")
            .execute(&self.pool)
            .await?;
        self.set_meta(META_QURAN_DOWNLOADED, "false").await?;
        self.set_meta(META_QURAN_PROGRESS, "0").await?;
        self.delete_meta(META_QURAN_LIST_UPDATED).await?;
        self.delete_meta(META_QURAN_FULL_UPDATED).await?;
        Ok(())
    }

    async fn clear_duas(&self) -> Result<(), AppError> {
        sqlx::query("DELETE FROM duas").execute(&self.pool).await?;
        sqlx::query("DELETE FROM dua_categories")
            .execute(&self.pool)
            .await?;
        self.set_meta(META_DUAS_DOWNLOADED, "false").await?;
        self.set_meta(META_DUAS_PROGRESS, "0").await?;
        self.delete_meta(META_DUAS_UPDATED).await?;
        self.delete_meta(META_DUA_CATEGORIES_UPDATED).await?;
        Ok(())
    }
}

#[async_trait]
impl ContentCache for SqliteContentCache {
    async fn save_surah_index(&self, items: &[SurahSummary]) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;
        for summary in items {
            let data = serde_json::to_string(summary)?;
            sqlx::query("INSERT OR REPLACE INTO surah_index (number, data) VALUES (?1, ?2)")
                .bind(summary.number as i64)
                .bind(data)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;
        self.set_meta(
            META_QURAN_LIST_UPDATED,
            &Utc::now().timestamp_millis().to_string(),
        )
        .await?;
        debug!(count = items.len(), "surah index cached");
        Ok(())
    }

    async fn surah_index(&self) -> Result<Vec<SurahSummary>, AppError> {
        let rows: Vec<String> =
            sqlx::query_scalar("SELECT data FROM surah_index ORDER BY number ASC")
                .fetch_all(&self.pool)
                .await?;
        rows.iter()
            .map(|data| serde_json::from_str(data).map_err(AppError::from))
            .collect()
    }

    async fn save_surah_detail(&self, surah: &Surah) -> Result<(), AppError> {
        let data = serde_json::to_string(surah)?;
        sqlx::query("INSERT OR REPLACE INTO surah_details (number, data) VALUES (?1, ?2)")
            .bind(surah.number() as i64)
            .bind(data)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn surah_detail(&self, number: u32) -> Result<Option<Surah>, AppError> {
        let row: Option<String> =
            sqlx::query_scalar("SELECT data FROM surah_details WHERE number = ?1")
                .bind(number as i64)
                .fetch_optional(&self.pool)
                .await?;
        row.map(|data| serde_json::from_str(&data).map_err(AppError::from))
            .transpose()
    }

    async fn save_dua_categories(&self, items: &[DuaCategory]) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;
        for category in items {
            let data = serde_json::to_string(category)?;
            sqlx::query("INSERT OR REPLACE INTO dua_categories (id, data) VALUES (?1, ?2)")
                .bind(category.id)
                .bind(data)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;
        self.set_meta(
            META_DUA_CATEGORIES_UPDATED,
            &Utc::now().timestamp_millis().to_string(),
        )
        .await?;
        Ok(())
    }

    async fn dua_categories(&self) -> Result<Vec<DuaCategory>, AppError> {
        let rows: Vec<String> =
            sqlx::query_scalar("SELECT data FROM dua_categories ORDER BY id ASC")
                .fetch_all(&self.pool)
                .await?;
        rows.iter()
            .map(|data| serde_json::from_str(data).map_err(AppError::from))
            .collect()
    }

    async fn save_duas(&self, items: &[Dua]) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;
        for dua in items {
            let data = serde_json::to_string(dua)?;
            sqlx::query("INSERT OR REPLACE INTO duas (id, data) VALUES (?1, ?2)")
                .bind(dua.id)
                .bind(data)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;
        self.set_meta(
            META_DUAS_UPDATED,
            &Utc::now().timestamp_millis().to_string(),
        )
        .await?;
        debug!(count = items.len(), "duas cached");
        Ok(())
    }

    async fn duas(&self) -> Result<Vec<Dua>, AppError> {
        let rows: Vec<String> = sqlx::query_scalar("SELECT data FROM duas ORDER BY id ASC")
            .fetch_all(&self.pool)
            .await?;
        rows.iter()
            .map(|data| serde_json::from_str(data).map_err(AppError::from))
            .collect()
    }

    async fn set_downloaded(&self, kind: ContentKind, downloaded: bool) -> Result<(), AppError> {
        let (flag_key, updated_key) = match kind {
            ContentKind::Quran => (META_QURAN_DOWNLOADED, META_QURAN_FULL_UPDATED),
            ContentKind::Duas => (META_DUAS_DOWNLOADED, META_DUAS_UPDATED),
        };
        self.set_meta(flag_key, if downloaded { "true" } else { "false" })
            .await?;
        if downloaded {
            self.set_meta(updated_key, &Utc::now().timestamp_millis().to_string())
                .await?;
        }
        Ok(())
    }

    async fn set_progress(&self, kind: ContentKind, percentage: u8) -> Result<(), AppError> {
        let key = match kind {
            ContentKind::Quran => META_QURAN_PROGRESS,
            ContentKind::Duas => META_DUAS_PROGRESS,
        };
        self.set_meta(key, &percentage.to_string()).await
    }

    async fn status(&self) -> Result<OfflineStatus, AppError> {
        Ok(OfflineStatus {
            quran_downloaded: self.meta_flag(META_QURAN_DOWNLOADED).await?,
            duas_downloaded: self.meta_flag(META_DUAS_DOWNLOADED).await?,
            last_quran_update: self.meta_timestamp(META_QURAN_FULL_UPDATED).await?,
            last_duas_update: self.meta_timestamp(META_DUAS_UPDATED).await?,
            quran_progress: self.meta_progress(META_QURAN_PROGRESS).await?,
            duas_progress: self.meta_progress(META_DUAS_PROGRESS).await?,
        })
    }

    async fn clear(&self, target: OfflineTarget) -> Result<(), AppError> {
        match target {
            OfflineTarget::Quran => self.clear_quran().await?,
            OfflineTarget::Duas => self.clear_duas().await?,
            OfflineTarget::All => {
                self.clear_quran().await?;
                self.clear_duas().await?;
                sqlx::query("DELETE FROM cache_metadata")
                    .execute(&self.pool)
                    .await?;
            }
        }
        debug!("content cache cleared: {target:?}");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::database::ConnectionPool;

    async fn setup_cache() -> SqliteContentCache {
        let pool = ConnectionPool::from_memory().await.unwrap();
        pool.initialize_schema().await.unwrap();
        SqliteContentCache::new(pool.get_pool().clone())
    }

    fn summary(number: u32) -> SurahSummary {
        SurahSummary {
            number,
            name: format!("Surah {number}"),
            latin_name: format!("Surah {number}"),
            verse_count: 7,
            revelation: "Mekah".to_string(),
            meaning: "Test".to_string(),
        }
    }

    #[tokio::test]
    async fn empty_cache_reports_default_status() {
        let cache = setup_cache().await;

        let status = cache.status().await.unwrap();
        assert_eq!(status, OfflineStatus::default());
        assert!(cache.surah_index().await.unwrap().is_empty());
        assert!(cache.surah_detail(1).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn index_save_is_an_upsert() {
        let cache = setup_cache().await;

        cache
            .save_surah_index(&[summary(1), summary(2)])
            .await
            .unwrap();
        let mut renamed = summary(2);
        renamed.meaning = "Updated".to_string();
        cache.save_surah_index(&[renamed.clone()]).await.unwrap();

        let index = cache.surah_index().await.unwrap();
        assert_eq!(index.len(), 2);
        assert_eq!(index[1], renamed);
    }

    #[tokio::test]
    async fn downloaded_flag_stamps_update_time() {
        let cache = setup_cache().await;

        cache
            .set_downloaded(ContentKind::Quran, true)
            .await
            .unwrap();
        let status = cache.status().await.unwrap();
        assert!(status.quran_downloaded);
        assert!(status.last_quran_update.is_some());

        cache
            .set_downloaded(ContentKind::Quran, false)
            .await
            .unwrap();
        let status = cache.status().await.unwrap();
        assert!(!status.quran_downloaded);
        // Losing the flag does not rewrite history.
        assert!(status.last_quran_update.is_some());
    }

    #[tokio::test]
    async fn clear_quran_leaves_duas_alone() {
        let cache = setup_cache().await;
        cache.save_surah_index(&[summary(1)]).await.unwrap();
        cache
            .save_duas(&[Dua {
                id: 1,
                category_id: 1,
                title: "Test".to_string(),
                arabic: "dua".to_string(),
                transliteration: None,
                translation: "meaning".to_string(),
                reference: None,
                order: 1,
            }])
            .await
            .unwrap();
        cache.set_downloaded(ContentKind::Duas, true).await.unwrap();

        cache.clear(OfflineTarget::Quran).await.unwrap();

        assert!(cache.surah_index().await.unwrap().is_empty());
        assert_eq!(cache.duas().await.unwrap().len(), 1);
        assert!(cache.status().await.unwrap().duas_downloaded);
    }

    #[tokio::test]
    async fn clear_all_wipes_metadata() {
        let cache = setup_cache().await;
        cache.set_progress(ContentKind::Quran, 40).await.unwrap();
        cache.set_downloaded(ContentKind::Duas, true).await.unwrap();

        cache.clear(OfflineTarget::All).await.unwrap();

        let status = cache.status().await.unwrap();
        assert_eq!(status, OfflineStatus::default());
    }
}
