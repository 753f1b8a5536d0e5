use serde::{Deserialize, Serialize};
use std::fmt;

/// Closed tag for the two reading-position domains. At most one last-read
/// record exists per owner and kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LastReadKind {
    Quran,
    Dua,
}

impl LastReadKind {
    pub const ALL: [LastReadKind; 2] = [LastReadKind::Quran, LastReadKind::Dua];

    pub fn as_str(&self) -> &'static str {
        match self {
            LastReadKind::Quran => "QURAN",
            LastReadKind::Dua => "DUA",
        }
    }
}

impl fmt::Display for LastReadKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl TryFrom<&str> for LastReadKind {
    type Error = String;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "QURAN" => Ok(LastReadKind::Quran),
            "DUA" => Ok(LastReadKind::Dua),
            other => Err(format!("Unknown last-read kind: {other}")),
        }
    }
}
