//! In-memory port stubs shared by the service tests.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::RwLock;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::application::ports::{
    ConnectivityProbe, ContentSource, Identity, IdentityProvider, LastReadReplaced,
    RemoteRecordStore,
};
use crate::domain::entities::{
    Ayah, Bookmark, BookmarkDraft, Dua, DuaCategory, LastRead, LastReadDraft, Surah, SurahSummary,
};
use crate::domain::value_objects::{AccountId, BookmarkKind, LastReadKind, RefId};
use crate::shared::error::AppError;

pub(crate) struct TestIdentity {
    current: RwLock<Identity>,
}

impl TestIdentity {
    pub fn guest() -> Self {
        Self {
            current: RwLock::new(Identity::Guest),
        }
    }

    pub fn account(id: &str) -> Self {
        Self {
            current: RwLock::new(Identity::Account(AccountId::new(id.to_string()).unwrap())),
        }
    }

    pub fn sign_in(&self, id: &str) {
        *self.current.write().unwrap() =
            Identity::Account(AccountId::new(id.to_string()).unwrap());
    }

    pub fn sign_out(&self) {
        *self.current.write().unwrap() = Identity::Guest;
    }
}

impl IdentityProvider for TestIdentity {
    fn current(&self) -> Identity {
        self.current.read().unwrap().clone()
    }
}

#[derive(Default)]
struct RemoteState {
    bookmarks: Vec<Bookmark>,
    last_reads: HashMap<LastReadKind, LastRead>,
    fail_writes: bool,
}

/// Remote store backed by plain memory, with server-enforced uniqueness and
/// switchable write failures.
#[derive(Default)]
pub(crate) struct InMemoryRemoteStore {
    state: Mutex<RemoteState>,
    add_calls: AtomicU32,
}

impl InMemoryRemoteStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set_fail_writes(&self, fail: bool) {
        self.state.lock().await.fail_writes = fail;
    }

    pub async fn bookmark_count(&self) -> usize {
        self.state.lock().await.bookmarks.len()
    }

    pub async fn contains(&self, kind: BookmarkKind, ref_id: RefId) -> bool {
        self.state
            .lock()
            .await
            .bookmarks
            .iter()
            .any(|b| b.matches(kind, ref_id))
    }

    pub async fn stored_last_read(&self, kind: LastReadKind) -> Option<LastRead> {
        self.state.lock().await.last_reads.get(&kind).cloned()
    }

    pub fn add_calls(&self) -> u32 {
        self.add_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RemoteRecordStore for InMemoryRemoteStore {
    async fn add_bookmark(&self, draft: BookmarkDraft) -> Result<Bookmark, AppError> {
        self.add_calls.fetch_add(1, Ordering::SeqCst);
        let mut state = self.state.lock().await;
        if state.fail_writes {
            return Err(AppError::Network("simulated outage".to_string()));
        }
        if state
            .bookmarks
            .iter()
            .any(|b| b.matches(draft.kind, draft.ref_id))
        {
            return Err(AppError::Conflict(format!(
                "bookmark {}:{} already exists",
                draft.kind, draft.ref_id
            )));
        }
        let bookmark = Bookmark::new(draft);
        state.bookmarks.push(bookmark.clone());
        Ok(bookmark)
    }

    async fn remove_bookmark(
        &self,
        kind: BookmarkKind,
        ref_id: RefId,
    ) -> Result<Option<Bookmark>, AppError> {
        let mut state = self.state.lock().await;
        if state.fail_writes {
            return Err(AppError::Network("simulated outage".to_string()));
        }
        let position = state.bookmarks.iter().position(|b| b.matches(kind, ref_id));
        Ok(position.map(|idx| state.bookmarks.remove(idx)))
    }

    async fn list_bookmarks(
        &self,
        kind: Option<BookmarkKind>,
    ) -> Result<Vec<Bookmark>, AppError> {
        let state = self.state.lock().await;
        Ok(state
            .bookmarks
            .iter()
            .filter(|b| kind.map_or(true, |k| b.kind() == k))
            .cloned()
            .collect())
    }

    async fn set_last_read(&self, draft: LastReadDraft) -> Result<LastReadReplaced, AppError> {
        let mut state = self.state.lock().await;
        if state.fail_writes {
            return Err(AppError::Network("simulated outage".to_string()));
        }
        let kind = draft.position.kind();
        let current = LastRead::new(draft);
        let previous = state.last_reads.insert(kind, current.clone());
        Ok(LastReadReplaced { current, previous })
    }

    async fn get_last_read(&self, kind: LastReadKind) -> Result<Option<LastRead>, AppError> {
        Ok(self.state.lock().await.last_reads.get(&kind).cloned())
    }
}

/// Content source serving deterministic fixtures, with injectable per-chapter
/// failures.
pub(crate) struct StubContentSource {
    chapters: u32,
    failing_chapters: RwLock<HashSet<u32>>,
    fail_index: AtomicBool,
    index_calls: AtomicU32,
    detail_calls: AtomicU32,
}

impl StubContentSource {
    pub fn new(chapters: u32) -> Self {
        Self {
            chapters,
            failing_chapters: RwLock::new(HashSet::new()),
            fail_index: AtomicBool::new(false),
            index_calls: AtomicU32::new(0),
            detail_calls: AtomicU32::new(0),
        }
    }

    pub fn fail_chapter(&self, number: u32) {
        self.failing_chapters.write().unwrap().insert(number);
    }

    pub fn fail_index(&self) {
        self.fail_index.store(true, Ordering::SeqCst);
    }

    pub fn index_calls(&self) -> u32 {
        self.index_calls.load(Ordering::SeqCst)
    }

    pub fn detail_calls(&self) -> u32 {
        self.detail_calls.load(Ordering::SeqCst)
    }

    pub fn summary(number: u32) -> SurahSummary {
        SurahSummary {
            number,
            name: format!("Surah {number}"),
            latin_name: format!("Surah {number}"),
            verse_count: 3,
            revelation: "Mekah".to_string(),
            meaning: format!("Meaning {number}"),
        }
    }

    pub fn detail(number: u32) -> Surah {
        Surah {
            summary: Self::summary(number),
            verses: (1..=3)
                .map(|n| Ayah {
                    number: n,
                    arabic: format!("ayah {number}:{n}"),
                    transliteration: format!("latin {number}:{n}"),
                    translation: format!("translation {number}:{n}"),
                })
                .collect(),
        }
    }

    pub fn dua(id: i64) -> Dua {
        Dua {
            id,
            category_id: 1,
            title: format!("Dua {id}"),
            arabic: format!("dua {id}"),
            transliteration: None,
            translation: format!("meaning {id}"),
            reference: None,
            order: id,
        }
    }

    pub fn category(id: i64) -> DuaCategory {
        DuaCategory {
            id,
            name: format!("Category {id}"),
            slug: format!("category-{id}"),
            order: id,
            dua_count: None,
        }
    }
}

#[async_trait]
impl ContentSource for StubContentSource {
    async fn surah_index(&self) -> Result<Vec<SurahSummary>, AppError> {
        self.index_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_index.load(Ordering::SeqCst) {
            return Err(AppError::Network("index unavailable".to_string()));
        }
        Ok((1..=self.chapters).map(Self::summary).collect())
    }

    async fn surah_detail(&self, number: u32) -> Result<Surah, AppError> {
        self.detail_calls.fetch_add(1, Ordering::SeqCst);
        if self.failing_chapters.read().unwrap().contains(&number) {
            return Err(AppError::Network(format!("chapter {number} unavailable")));
        }
        Ok(Self::detail(number))
    }

    async fn dua_categories(&self) -> Result<Vec<DuaCategory>, AppError> {
        Ok((1..=2).map(Self::category).collect())
    }

    async fn duas(&self) -> Result<Vec<Dua>, AppError> {
        Ok((1..=3).map(Self::dua).collect())
    }
}

pub(crate) struct StaticConnectivity {
    online: AtomicBool,
}

impl StaticConnectivity {
    pub fn online() -> Self {
        Self {
            online: AtomicBool::new(true),
        }
    }

    pub fn offline() -> Self {
        Self {
            online: AtomicBool::new(false),
        }
    }
}

#[async_trait]
impl ConnectivityProbe for StaticConnectivity {
    async fn is_online(&self) -> bool {
        self.online.load(Ordering::SeqCst)
    }
}
