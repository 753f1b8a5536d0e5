use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::value_objects::{BookmarkId, BookmarkKind, RefId};

/// A saved pointer to one content item, owned by exactly one identity at a
/// time. `(kind, ref_id)` is unique per owner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bookmark {
    id: BookmarkId,
    kind: BookmarkKind,
    ref_id: RefId,
    summary: Option<String>,
    url: Option<String>,
    created_at: DateTime<Utc>,
}

impl Bookmark {
    /// Create a new bookmark at the current time.
    pub fn new(draft: BookmarkDraft) -> Self {
        Self {
            id: BookmarkId::random(),
            kind: draft.kind,
            ref_id: draft.ref_id,
            summary: draft.summary,
            url: draft.url,
            created_at: Utc::now(),
        }
    }

    /// Rehydrate a bookmark from stored parts.
    pub fn from_parts(
        id: BookmarkId,
        kind: BookmarkKind,
        ref_id: RefId,
        summary: Option<String>,
        url: Option<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            kind,
            ref_id,
            summary,
            url,
            created_at,
        }
    }

    pub fn id(&self) -> &BookmarkId {
        &self.id
    }

    pub fn kind(&self) -> BookmarkKind {
        self.kind
    }

    pub fn ref_id(&self) -> RefId {
        self.ref_id
    }

    pub fn summary(&self) -> Option<&str> {
        self.summary.as_deref()
    }

    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn matches(&self, kind: BookmarkKind, ref_id: RefId) -> bool {
        self.kind == kind && self.ref_id == ref_id
    }
}

/// Caller-supplied fields for a bookmark insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookmarkDraft {
    pub kind: BookmarkKind,
    pub ref_id: RefId,
    pub summary: Option<String>,
    pub url: Option<String>,
}

impl BookmarkDraft {
    pub fn new(kind: BookmarkKind, ref_id: RefId) -> Self {
        Self {
            kind,
            ref_id,
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
