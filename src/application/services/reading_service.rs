use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock};

use tracing::warn;

use crate::application::ports::{
    Identity, IdentityProvider, LocalRecordStore, RemoteRecordStore,
};
use crate::domain::entities::{Bookmark, BookmarkDraft, LastRead, LastReadDraft};
use crate::domain::value_objects::{AccountId, BookmarkId, BookmarkKind, LastReadKind, RefId};
use crate::shared::error::AppError;

use super::optimistic;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    Added,
    Removed,
}

/// Optimistic view of the account-scoped records, keyed by the account it
/// was loaded for. Reset whenever the identity changes.
#[derive(Default)]
struct RemoteMirror {
    account: Option<AccountId>,
    bookmarks: Option<Vec<Bookmark>>,
    last_reads: HashMap<LastReadKind, LastRead>,
    last_reads_loaded: HashSet<LastReadKind>,
}

/// One interface for bookmark and last-read reads and writes regardless of
/// identity state. The identity is consulted on every call: guest traffic
/// goes to the local store (best-effort writes), account traffic to the
/// remote store through the optimistic mirror.
pub struct ReadingService {
    identity: Arc<dyn IdentityProvider>,
    local: Arc<dyn LocalRecordStore>,
    remote: Arc<dyn RemoteRecordStore>,
    mirror: RwLock<RemoteMirror>,
}

impl ReadingService {
    pub fn new(
        identity: Arc<dyn IdentityProvider>,
        local: Arc<dyn LocalRecordStore>,
        remote: Arc<dyn RemoteRecordStore>,
    ) -> Self {
        Self {
            identity,
            local,
            remote,
            mirror: RwLock::new(RemoteMirror::default()),
        }
    }

    pub async fn is_bookmarked(&self, kind: BookmarkKind, ref_id: RefId) -> Result<bool, AppError> {
        match self.identity.current() {
            Identity::Guest => {
                let bookmarks = self.local.list_bookmarks(Some(kind)).await?;
                Ok(bookmarks.iter().any(|b| b.matches(kind, ref_id)))
            }
            Identity::Account(account) => {
                let bookmarks = self.loaded_bookmarks(&account).await?;
                Ok(bookmarks.iter().any(|b| b.matches(kind, ref_id)))
            }
        }
    }

    pub async fn list_bookmarks(
        &self,
        kind: Option<BookmarkKind>,
    ) -> Result<Vec<Bookmark>, AppError> {
        match self.identity.current() {
            Identity::Guest => self.local.list_bookmarks(kind).await,
            Identity::Account(account) => {
                let bookmarks = self.loaded_bookmarks(&account).await?;
                Ok(bookmarks
                    .into_iter()
                    .filter(|b| kind.map_or(true, |k| b.kind() == k))
                    .collect())
            }
        }
    }

    /// Adds or removes the bookmark for `(kind, ref_id)`. Remote writes are
    /// applied to the mirror first and rolled back if the call fails; a
    /// remote `Conflict` on add means the item was already bookmarked and is
    /// not an error.
    pub async fn toggle_bookmark(&self, draft: BookmarkDraft) -> Result<ToggleOutcome, AppError> {
        let kind = draft.kind;
        let ref_id = draft.ref_id;

        match self.identity.current() {
            Identity::Guest => {
                let bookmarks = self.local.list_bookmarks(Some(kind)).await?;
                if bookmarks.iter().any(|b| b.matches(kind, ref_id)) {
                    if let Err(err) = self.local.remove_bookmark(kind, ref_id).await {
                        warn!("best-effort guest bookmark remove failed: {err}");
                    }
                    Ok(ToggleOutcome::Removed)
                } else {
                    if let Err(err) = self.local.add_bookmark(draft).await {
                        warn!("best-effort guest bookmark add failed: {err}");
                    }
                    Ok(ToggleOutcome::Added)
                }
            }
            Identity::Account(account) => {
                let bookmarks = self.loaded_bookmarks(&account).await?;
                match bookmarks.iter().find(|b| b.matches(kind, ref_id)).cloned() {
                    Some(existing) => {
                        optimistic::mutate(
                            || self.mirror_remove(&account, kind, ref_id),
                            || self.remote.remove_bookmark(kind, ref_id),
                            || self.mirror_insert(&account, existing.clone()),
                        )
                        .await?;
                        Ok(ToggleOutcome::Removed)
                    }
                    None => {
                        let provisional = Bookmark::new(draft.clone());
                        let provisional_id = provisional.id().clone();
                        let remote = self.remote.clone();
                        let saved = optimistic::mutate(
                            || self.mirror_insert(&account, provisional),
                            move || async move {
                                match remote.add_bookmark(draft).await {
                                    Ok(bookmark) => Ok(Some(bookmark)),
                                    // Already bookmarked on the server; keep
                                    // the optimistic entry.
                                    Err(err) if err.is_conflict() => Ok(None),
                                    Err(err) => Err(err),
                                }
                            },
                            || self.mirror_remove_by_id(&account, &provisional_id),
                        )
                        .await?;
                        if let Some(saved) = saved {
                            self.mirror_replace(&account, &provisional_id, saved);
                        }
                        Ok(ToggleOutcome::Added)
                    }
                }
            }
        }
    }

    pub async fn get_last_read(&self, kind: LastReadKind) -> Result<Option<LastRead>, AppError> {
        match self.identity.current() {
            Identity::Guest => self.local.get_last_read(kind).await,
            Identity::Account(account) => self.loaded_last_read(&account, kind).await,
        }
    }

    /// Overwrites the reading position for the draft's kind. Guest writes are
    /// best-effort; remote writes go through the optimistic mirror.
    pub async fn mark_last_read(&self, draft: LastReadDraft) -> Result<(), AppError> {
        let kind = draft.position.kind();

        match self.identity.current() {
            Identity::Guest => {
                if let Err(err) = self.local.set_last_read(draft).await {
                    warn!("best-effort guest last-read write failed: {err}");
                }
                Ok(())
            }
            Identity::Account(account) => {
                let prior = self.loaded_last_read(&account, kind).await?;
                let provisional = LastRead::new(draft.clone());
                let replaced = optimistic::mutate(
                    || self.mirror_set_last_read(&account, kind, Some(provisional)),
                    || self.remote.set_last_read(draft),
                    || self.mirror_set_last_read(&account, kind, prior.clone()),
                )
                .await?;
                self.mirror_set_last_read(&account, kind, Some(replaced.current));
                Ok(())
            }
        }
    }

    async fn loaded_bookmarks(&self, account: &AccountId) -> Result<Vec<Bookmark>, AppError> {
        self.ensure_account(account);
        if let Some(bookmarks) = self
            .mirror
            .read()
            .expect("mirror lock poisoned")
            .bookmarks
            .clone()
        {
            return Ok(bookmarks);
        }

        let fetched = self.remote.list_bookmarks(None).await?;
        let mut mirror = self.mirror.write().expect("mirror lock poisoned");
        if mirror.account.as_ref() == Some(account) {
            mirror.bookmarks = Some(fetched.clone());
        }
        Ok(fetched)
    }

    async fn loaded_last_read(
        &self,
        account: &AccountId,
        kind: LastReadKind,
    ) -> Result<Option<LastRead>, AppError> {
        self.ensure_account(account);
        {
            let mirror = self.mirror.read().expect("mirror lock poisoned");
            if mirror.last_reads_loaded.contains(&kind) {
                return Ok(mirror.last_reads.get(&kind).cloned());
            }
        }

        let fetched = self.remote.get_last_read(kind).await?;
        let mut mirror = self.mirror.write().expect("mirror lock poisoned");
        if mirror.account.as_ref() == Some(account) {
            mirror.last_reads_loaded.insert(kind);
            match &fetched {
                Some(record) => {
                    mirror.last_reads.insert(kind, record.clone());
                }
                None => {
                    mirror.last_reads.remove(&kind);
                }
            }
        }
        Ok(fetched)
    }

    /// Drops the mirror when the signed-in account changed since it was
    /// loaded.
    fn ensure_account(&self, account: &AccountId) {
        let mut mirror = self.mirror.write().expect("mirror lock poisoned");
        if mirror.account.as_ref() != Some(account) {
            *mirror = RemoteMirror {
                account: Some(account.clone()),
                ..RemoteMirror::default()
            };
        }
    }

    fn mirror_insert(&self, account: &AccountId, bookmark: Bookmark) {
        let mut mirror = self.mirror.write().expect("mirror lock poisoned");
        if mirror.account.as_ref() == Some(account) {
            if let Some(bookmarks) = mirror.bookmarks.as_mut() {
                bookmarks.push(bookmark);
            }
        }
    }

    fn mirror_remove(&self, account: &AccountId, kind: BookmarkKind, ref_id: RefId) {
        let mut mirror = self.mirror.write().expect("mirror lock poisoned");
        if mirror.account.as_ref() == Some(account) {
            if let Some(bookmarks) = mirror.bookmarks.as_mut() {
                bookmarks.retain(|b| !b.matches(kind, ref_id));
            }
        }
    }

    fn mirror_remove_by_id(&self, account: &AccountId, id: &BookmarkId) {
        let mut mirror = self.mirror.write().expect("mirror lock poisoned");
        if mirror.account.as_ref() == Some(account) {
            if let Some(bookmarks) = mirror.bookmarks.as_mut() {
                bookmarks.retain(|b| b.id() != id);
            }
        }
    }

    fn mirror_replace(&self, account: &AccountId, id: &BookmarkId, saved: Bookmark) {
        let mut mirror = self.mirror.write().expect("mirror lock poisoned");
        if mirror.account.as_ref() == Some(account) {
            if let Some(bookmarks) = mirror.bookmarks.as_mut() {
                if let Some(slot) = bookmarks.iter_mut().find(|b| b.id() == id) {
                    *slot = saved;
                }
            }
        }
    }

    fn mirror_set_last_read(
        &self,
        account: &AccountId,
        kind: LastReadKind,
        value: Option<LastRead>,
    ) {
        let mut mirror = self.mirror.write().expect("mirror lock poisoned");
        if mirror.account.as_ref() == Some(account) {
            mirror.last_reads_loaded.insert(kind);
            match value {
                Some(record) => {
                    mirror.last_reads.insert(kind, record);
                }
                None => {
                    mirror.last_reads.remove(&kind);
                }
            }
        }
    }
}
