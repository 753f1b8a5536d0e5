use async_trait::async_trait;

use crate::domain::entities::{Dua, DuaCategory, Surah, SurahSummary};
use crate::shared::error::AppError;

/// The opaque read-only reference-content provider.
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// Lightweight chapter index (no verses).
    async fn surah_index(&self) -> Result<Vec<SurahSummary>, AppError>;

    /// Full chapter detail including every verse. `number` is 1..=114.
    async fn surah_detail(&self, number: u32) -> Result<Surah, AppError>;

    async fn dua_categories(&self) -> Result<Vec<DuaCategory>, AppError>;

    async fn duas(&self) -> Result<Vec<Dua>, AppError>;
}
