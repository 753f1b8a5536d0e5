use serde::{Deserialize, Serialize};
use std::fmt;

/// Positive integer identifying a content item within its kind's namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RefId(i64);

impl RefId {
    pub fn new(value: i64) -> Result<Self, String> {
        if value <= 0 {
            return Err(format!("Reference id must be positive, got {value}"));
        }
        Ok(Self(value))
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for RefId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<RefId> for i64 {
    fn from(value: RefId) -> Self {
        value.0
    }
}
