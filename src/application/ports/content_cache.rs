use async_trait::async_trait;

use crate::domain::entities::{Dua, DuaCategory, OfflineStatus, Surah, SurahSummary};
use crate::domain::value_objects::{ContentKind, OfflineTarget};
use crate::shared::error::AppError;

/// The local mirror of reference content. Collection reads return an empty
/// vec (not an error) when nothing has been cached yet.
#[async_trait]
pub trait ContentCache: Send + Sync {
    async fn save_surah_index(&self, items: &[SurahSummary]) -> Result<(), AppError>;
    async fn surah_index(&self) -> Result<Vec<SurahSummary>, AppError>;

    /// Persists one chapter individually; bulk completion flags are managed
    /// separately via `set_downloaded`.
    async fn save_surah_detail(&self, surah: &Surah) -> Result<(), AppError>;
    async fn surah_detail(&self, number: u32) -> Result<Option<Surah>, AppError>;

    async fn save_dua_categories(&self, items: &[DuaCategory]) -> Result<(), AppError>;
    async fn dua_categories(&self) -> Result<Vec<DuaCategory>, AppError>;

    async fn save_duas(&self, items: &[Dua]) -> Result<(), AppError>;
    async fn duas(&self) -> Result<Vec<Dua>, AppError>;

    /// Marking a collection downloaded also stamps its last-update time.
    async fn set_downloaded(&self, kind: ContentKind, downloaded: bool) -> Result<(), AppError>;

    async fn set_progress(&self, kind: ContentKind, percentage: u8) -> Result<(), AppError>;

    async fn status(&self) -> Result<OfflineStatus, AppError>;

    /// Clears the target's rows and resets its completion flag and progress.
    async fn clear(&self, target: OfflineTarget) -> Result<(), AppError>;
}
