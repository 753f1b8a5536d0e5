use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier for a stored bookmark record. Locally created records carry a
/// fresh UUID; records loaded from the account store keep the server id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BookmarkId(String);

impl BookmarkId {
    pub fn new(value: String) -> Result<Self, String> {
        if value.trim().is_empty() {
            return Err("BookmarkId cannot be empty".to_string());
        }
        Ok(Self(value))
    }

    pub fn random() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BookmarkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<BookmarkId> for String {
    fn from(value: BookmarkId) -> Self {
        value.0
    }
}
