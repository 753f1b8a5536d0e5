use serde::{Deserialize, Serialize};
use std::fmt;

/// Closed tag for the two bookmarkable content namespaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookmarkKind {
    Ayah,
    Dua,
}

impl BookmarkKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookmarkKind::Ayah => "AYAH",
            BookmarkKind::Dua => "DUA",
        }
    }
}

impl fmt::Display for BookmarkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl TryFrom<&str> for BookmarkKind {
    type Error = String;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "AYAH" => Ok(BookmarkKind::Ayah),
            "DUA" => Ok(BookmarkKind::Dua),
            other => Err(format!("Unknown bookmark kind: {other}")),
        }
    }
}
