use async_trait::async_trait;

use crate::domain::entities::{Bookmark, BookmarkDraft, LastRead, LastReadDraft};
use crate::domain::value_objects::{BookmarkKind, LastReadKind, RefId};
use crate::shared::error::AppError;

/// Result of a remote last-read overwrite: the record now stored, plus the
/// one it superseded so the caller can restore it after a failed optimistic
/// update elsewhere.
#[derive(Debug, Clone)]
pub struct LastReadReplaced {
    pub current: LastRead,
    pub previous: Option<LastRead>,
}

/// Account-scoped record persistence, fronted by network calls. Every
/// operation can fail with `AppError::Network` or `AppError::Unauthorized`;
/// callers must not assume success.
#[async_trait]
pub trait RemoteRecordStore: Send + Sync {
    /// Fails with `AppError::Conflict` when `(kind, ref_id)` already exists
    /// for this account (server-enforced uniqueness).
    async fn add_bookmark(&self, draft: BookmarkDraft) -> Result<Bookmark, AppError>;

    /// Returns the removed record, if any, so a failed optimistic delete can
    /// be rolled back by re-adding it.
    async fn remove_bookmark(
        &self,
        kind: BookmarkKind,
        ref_id: RefId,
    ) -> Result<Option<Bookmark>, AppError>;

    async fn list_bookmarks(&self, kind: Option<BookmarkKind>)
        -> Result<Vec<Bookmark>, AppError>;

    /// Overwrite semantics, one record per kind.
    async fn set_last_read(&self, draft: LastReadDraft) -> Result<LastReadReplaced, AppError>;

    async fn get_last_read(&self, kind: LastReadKind) -> Result<Option<LastRead>, AppError>;
}
