use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::value_objects::{LastReadKind, RefId};

/// Domain-specific locator for a reading position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReadingPosition {
    Quran { surah_id: RefId, ayah_number: u32 },
    Dua { dua_id: RefId },
}

impl ReadingPosition {
    pub fn quran(surah_id: RefId, ayah_number: u32) -> Result<Self, String> {
        if ayah_number == 0 {
            return Err("Ayah number must be positive".to_string());
        }
        Ok(Self::Quran {
            surah_id,
            ayah_number,
        })
    }

    pub fn dua(dua_id: RefId) -> Self {
        Self::Dua { dua_id }
    }

    pub fn kind(&self) -> LastReadKind {
        match self {
            ReadingPosition::Quran { .. } => LastReadKind::Quran,
            ReadingPosition::Dua { .. } => LastReadKind::Dua,
        }
    }
}

/// The single most-recent reading position for one content domain.
/// Writing a new position for a kind replaces the old one, never appends.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LastRead {
    position: ReadingPosition,
    summary: Option<String>,
    url: Option<String>,
    updated_at: DateTime<Utc>,
}

impl LastRead {
    pub fn new(draft: LastReadDraft) -> Self {
        Self {
            position: draft.position,
            summary: draft.summary,
            url: draft.url,
            updated_at: Utc::now(),
        }
    }

    pub fn from_parts(
        position: ReadingPosition,
        summary: Option<String>,
        url: Option<String>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            position,
            summary,
            url,
            updated_at,
        }
    }

    pub fn kind(&self) -> LastReadKind {
        self.position.kind()
    }

    pub fn position(&self) -> ReadingPosition {
        self.position
    }

    pub fn summary(&self) -> Option<&str> {
        self.summary.as_deref()
    }

    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

/// Caller-supplied fields for a last-read overwrite.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LastReadDraft {
    pub position: ReadingPosition,
    pub summary: Option<String>,
    pub url: Option<String>,
}

impl LastReadDraft {
    pub fn new(position: ReadingPosition) -> Self {
        Self {
            position,
            summary: None,
            url: None,
        }
    }

    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }
}

impl From<&LastRead> for LastReadDraft {
    fn from(record: &LastRead) -> Self {
        Self {
            position: record.position(),
            summary: record.summary().map(str::to_string),
            url: record.url().map(str::to_string),
        }
    }
}
