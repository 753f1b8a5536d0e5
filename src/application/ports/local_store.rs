use async_trait::async_trait;

use crate::domain::entities::{Bookmark, BookmarkDraft, LastRead, LastReadDraft};
use crate::domain::value_objects::{BookmarkKind, LastReadKind, RefId};
use crate::shared::error::AppError;

/// Scope selector for Local Record Store erasure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClearScope {
    Bookmarks,
    LastReads,
    All,
}

/// Guest-scoped record persistence. Everything here belongs to the current
/// device profile; the migration coordinator is the only component that moves
/// records out of this store.
#[async_trait]
pub trait LocalRecordStore: Send + Sync {
    /// Idempotent insert: a second add for the same `(kind, ref_id)` is a
    /// no-op.
    async fn add_bookmark(&self, draft: BookmarkDraft) -> Result<(), AppError>;

    /// No-op when the bookmark is absent.
    async fn remove_bookmark(&self, kind: BookmarkKind, ref_id: RefId) -> Result<(), AppError>;

    /// All entries in insertion order, optionally filtered by kind.
    async fn list_bookmarks(&self, kind: Option<BookmarkKind>)
        -> Result<Vec<Bookmark>, AppError>;

    /// Unconditionally overwrites the single record for the position's kind.
    async fn set_last_read(&self, draft: LastReadDraft) -> Result<(), AppError>;

    async fn get_last_read(&self, kind: LastReadKind) -> Result<Option<LastRead>, AppError>;

    async fn clear(&self, scope: ClearScope) -> Result<(), AppError>;
}
