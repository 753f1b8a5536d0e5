use serde::{Deserialize, Serialize};

/// One chapter row from the provider's lightweight index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurahSummary {
    pub number: u32,
    pub name: String,
    pub latin_name: String,
    pub verse_count: u32,
    pub revelation: String,
    pub meaning: String,
}

/// One verse of a chapter: original text, phonetic rendering, and the fixed
/// translation the provider ships.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ayah {
    pub number: u32,
    pub arabic: String,
    pub transliteration: String,
    pub translation: String,
}

/// Full chapter detail, including every verse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Surah {
    #[serde(flatten)]
    pub summary: SurahSummary,
    pub verses: Vec<Ayah>,
}

impl Surah {
    pub fn number(&self) -> u32 {
        self.summary.number
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dua {
    pub id: i64,
    pub category_id: i64,
    pub title: String,
    pub arabic: String,
    pub transliteration: Option<String>,
    pub translation: String,
    pub reference: Option<String>,
    pub order: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuaCategory {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub order: i64,
    pub dua_count: Option<i64>,
}

/// A reference-content collection plus its provenance: `from_cache` is true
/// when the rows came out of the offline mirror rather than a live fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionPayload<T> {
    pub items: Vec<T>,
    pub from_cache: bool,
}

/// Single-item counterpart of [`CollectionPayload`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemPayload<T> {
    pub item: T,
    pub from_cache: bool,
}
