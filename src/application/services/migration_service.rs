use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::application::ports::{
    ClearScope, IdentityProvider, LocalRecordStore, RemoteRecordStore,
};
use crate::domain::entities::{BookmarkDraft, LastReadDraft};
use crate::domain::value_objects::LastReadKind;
use crate::shared::error::AppError;

/// Coordinator phase. `Done` is sticky for the session; a new session builds
/// a fresh coordinator and re-evaluates from `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergePhase {
    Idle,
    PromptPending,
    Merging,
    Done,
}

/// How the user answered the merge prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeChoice {
    /// Drain guest records into the account store.
    Merge,
    /// Wipe guest records without touching the account store.
    Discard,
    /// Dismiss for this session; guest records stay put.
    Defer,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeOutcome {
    pub merged_bookmarks: u32,
    pub skipped_bookmarks: u32,
    pub failed_bookmarks: u32,
    pub merged_last_reads: u32,
    pub failed_last_reads: u32,
    pub local_cleared: bool,
}

struct CoordinatorState {
    phase: MergePhase,
    prompt_shown: bool,
}

/// One-shot migration of guest records into the signed-in account. The only
/// component allowed to move ownership out of the local store.
pub struct MigrationService {
    identity: Arc<dyn IdentityProvider>,
    local: Arc<dyn LocalRecordStore>,
    remote: Arc<dyn RemoteRecordStore>,
    state: Mutex<CoordinatorState>,
}

impl MigrationService {
    pub fn new(
        identity: Arc<dyn IdentityProvider>,
        local: Arc<dyn LocalRecordStore>,
        remote: Arc<dyn RemoteRecordStore>,
    ) -> Self {
        Self {
            identity,
            local,
            remote,
            state: Mutex::new(CoordinatorState {
                phase: MergePhase::Idle,
                prompt_shown: false,
            }),
        }
    }

    pub async fn phase(&self) -> MergePhase {
        self.state.lock().await.phase
    }

    /// Re-evaluates the prompt gate, typically after a sign-in edge event.
    /// Moves `Idle → PromptPending` at most once per session, and only when
    /// the visitor is authenticated and guest bookmarks exist.
    pub async fn evaluate(&self) -> Result<MergePhase, AppError> {
        let mut state = self.state.lock().await;
        if state.phase != MergePhase::Idle {
            return Ok(state.phase);
        }
        if state.prompt_shown || !self.identity.current().is_authenticated() {
            return Ok(MergePhase::Idle);
        }

        let has_guest_bookmarks = !self.local.list_bookmarks(None).await?.is_empty();
        if has_guest_bookmarks {
            state.phase = MergePhase::PromptPending;
        }
        Ok(state.phase)
    }

    /// Resolves a pending prompt. Holding the state lock across the merge
    /// serializes duplicate triggers: a second caller waits and then fails
    /// the phase check instead of merging twice.
    pub async fn resolve(&self, choice: MergeChoice) -> Result<MergeOutcome, AppError> {
        let mut state = self.state.lock().await;
        if state.phase != MergePhase::PromptPending {
            return Err(AppError::InvalidInput(format!(
                "no merge prompt pending (phase {:?})",
                state.phase
            )));
        }
        if !self.identity.current().is_authenticated() {
            return Err(AppError::Unauthorized(
                "merge requires a signed-in account".to_string(),
            ));
        }

        state.prompt_shown = true;
        match choice {
            MergeChoice::Defer => {
                state.phase = MergePhase::Done;
                Ok(MergeOutcome::default())
            }
            MergeChoice::Discard => {
                self.local.clear(ClearScope::All).await?;
                state.phase = MergePhase::Done;
                info!("guest records discarded without merge");
                Ok(MergeOutcome {
                    local_cleared: true,
                    ..MergeOutcome::default()
                })
            }
            MergeChoice::Merge => {
                state.phase = MergePhase::Merging;
                let outcome = self.run_merge().await;
                state.phase = MergePhase::Done;
                outcome
            }
        }
    }

    async fn run_merge(&self) -> Result<MergeOutcome, AppError> {
        let mut outcome = MergeOutcome::default();

        let bookmarks = self.local.list_bookmarks(None).await?;
        for bookmark in &bookmarks {
            // The account store only needs the identity key; display
            // metadata is re-derived from content on the account side.
            let draft = BookmarkDraft::new(bookmark.kind(), bookmark.ref_id());
            match self.remote.add_bookmark(draft).await {
                Ok(_) => outcome.merged_bookmarks += 1,
                Err(err) if err.is_conflict() => outcome.skipped_bookmarks += 1,
                Err(err) => {
                    outcome.failed_bookmarks += 1;
                    warn!(
                        "failed to merge bookmark {}:{}: {err}",
                        bookmark.kind(),
                        bookmark.ref_id()
                    );
                }
            }
        }

        for kind in LastReadKind::ALL {
            let Some(record) = self.local.get_last_read(kind).await? else {
                continue;
            };
            // Guest progress supersedes whatever the account stored; the
            // guest action is presumed more recent.
            match self.remote.set_last_read(LastReadDraft::from(&record)).await {
                Ok(_) => outcome.merged_last_reads += 1,
                Err(err) => {
                    outcome.failed_last_reads += 1;
                    warn!("failed to merge {kind} last-read: {err}");
                }
            }
        }

        // Clearing is the irreversible step: withhold it unless every record
        // made it across. A retained snapshot retries cleanly next session,
        // with already-merged records resolving as Conflict skips.
        if outcome.failed_bookmarks == 0 && outcome.failed_last_reads == 0 {
            self.local.clear(ClearScope::All).await?;
            outcome.local_cleared = true;
            info!(
                merged = outcome.merged_bookmarks,
                skipped = outcome.skipped_bookmarks,
                last_reads = outcome.merged_last_reads,
                "guest records merged into account"
            );
        } else {
            warn!(
                failed_bookmarks = outcome.failed_bookmarks,
                failed_last_reads = outcome.failed_last_reads,
                "merge finished with failures; keeping guest records for retry"
            );
        }

        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::services::test_support::{InMemoryRemoteStore, TestIdentity};
    use crate::domain::entities::{LastReadDraft, ReadingPosition};
    use crate::domain::value_objects::{BookmarkKind, RefId};
    use crate::infrastructure::database::{ConnectionPool, SqliteGuestStore};

    async fn setup() -> (
        MigrationService,
        Arc<TestIdentity>,
        Arc<SqliteGuestStore>,
        Arc<InMemoryRemoteStore>,
    ) {
        let identity = Arc::new(TestIdentity::guest());
        let pool = ConnectionPool::from_memory().await.unwrap();
        pool.initialize_schema().await.unwrap();
        let local = Arc::new(SqliteGuestStore::new(pool.get_pool().clone()));
        let remote = Arc::new(InMemoryRemoteStore::new());
        let service = MigrationService::new(identity.clone(), local.clone(), remote.clone());
        (service, identity, local, remote)
    }

    async fn seed_guest_records(local: &SqliteGuestStore) {
        local
            .add_bookmark(BookmarkDraft::new(
                BookmarkKind::Ayah,
                RefId::new(101).unwrap(),
            ))
            .await
            .unwrap();
        local
            .add_bookmark(BookmarkDraft::new(
                BookmarkKind::Dua,
                RefId::new(4).unwrap(),
            ))
            .await
            .unwrap();
        local
            .set_last_read(LastReadDraft::new(
                ReadingPosition::quran(RefId::new(2).unwrap(), 255).unwrap(),
            ))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn evaluate_stays_idle_for_guest() {
        let (service, _, local, _) = setup().await;
        seed_guest_records(&local).await;

        assert_eq!(service.evaluate().await.unwrap(), MergePhase::Idle);
    }

    #[tokio::test]
    async fn evaluate_stays_idle_without_guest_bookmarks() {
        let (service, identity, _, _) = setup().await;
        identity.sign_in("user-1");

        assert_eq!(service.evaluate().await.unwrap(), MergePhase::Idle);
    }

    #[tokio::test]
    async fn evaluate_prompts_once_after_sign_in() {
        let (service, identity, local, _) = setup().await;
        seed_guest_records(&local).await;
        identity.sign_in("user-1");

        assert_eq!(service.evaluate().await.unwrap(), MergePhase::PromptPending);
        // Re-evaluation while pending keeps the prompt, not a second one.
        assert_eq!(service.evaluate().await.unwrap(), MergePhase::PromptPending);
    }

    #[tokio::test]
    async fn merge_moves_records_and_clears_local() {
        let (service, identity, local, remote) = setup().await;
        seed_guest_records(&local).await;
        identity.sign_in("user-1");
        service.evaluate().await.unwrap();

        let outcome = service.resolve(MergeChoice::Merge).await.unwrap();

        assert_eq!(outcome.merged_bookmarks, 2);
        assert_eq!(outcome.failed_bookmarks, 0);
        assert_eq!(outcome.merged_last_reads, 1);
        assert!(outcome.local_cleared);

        assert!(
            remote
                .contains(BookmarkKind::Ayah, RefId::new(101).unwrap())
                .await
        );
        assert!(
            remote
                .contains(BookmarkKind::Dua, RefId::new(4).unwrap())
                .await
        );
        let last_read = remote.stored_last_read(LastReadKind::Quran).await.unwrap();
        assert_eq!(
            last_read.position(),
            ReadingPosition::quran(RefId::new(2).unwrap(), 255).unwrap()
        );

        assert!(local.list_bookmarks(None).await.unwrap().is_empty());
        assert!(local
            .get_last_read(LastReadKind::Quran)
            .await
            .unwrap()
            .is_none());
        assert_eq!(service.phase().await, MergePhase::Done);
    }

    #[tokio::test]
    async fn duplicate_merge_resolves_as_conflict_skips() {
        let (first, identity, local, remote) = setup().await;
        seed_guest_records(&local).await;
        identity.sign_in("user-1");
        first.evaluate().await.unwrap();
        first.resolve(MergeChoice::Merge).await.unwrap();

        // Simulate a second session that still carries the same guest data.
        seed_guest_records(&local).await;
        let second = MigrationService::new(identity.clone(), local.clone(), remote.clone());
        second.evaluate().await.unwrap();
        let outcome = second.resolve(MergeChoice::Merge).await.unwrap();

        assert_eq!(outcome.merged_bookmarks, 0);
        assert_eq!(outcome.skipped_bookmarks, 2);
        assert_eq!(remote.bookmark_count().await, 2);
    }

    #[tokio::test]
    async fn discard_wipes_local_without_remote_writes() {
        let (service, identity, local, remote) = setup().await;
        seed_guest_records(&local).await;
        identity.sign_in("user-1");
        service.evaluate().await.unwrap();

        let outcome = service.resolve(MergeChoice::Discard).await.unwrap();

        assert!(outcome.local_cleared);
        assert_eq!(remote.add_calls(), 0);
        assert!(local.list_bookmarks(None).await.unwrap().is_empty());
        assert_eq!(service.phase().await, MergePhase::Done);
    }

    #[tokio::test]
    async fn defer_keeps_local_and_suppresses_reprompt() {
        let (service, identity, local, _) = setup().await;
        seed_guest_records(&local).await;
        identity.sign_in("user-1");
        service.evaluate().await.unwrap();

        let outcome = service.resolve(MergeChoice::Defer).await.unwrap();

        assert!(!outcome.local_cleared);
        assert_eq!(local.list_bookmarks(None).await.unwrap().len(), 2);
        assert_eq!(service.phase().await, MergePhase::Done);
        // Sticky for the session.
        assert_eq!(service.evaluate().await.unwrap(), MergePhase::Done);

        // A fresh session re-evaluates from Idle and prompts again.
        let next = MigrationService::new(
            identity.clone(),
            local.clone(),
            Arc::new(InMemoryRemoteStore::new()),
        );
        assert_eq!(next.evaluate().await.unwrap(), MergePhase::PromptPending);
    }

    #[tokio::test]
    async fn failed_records_keep_local_store() {
        let (service, identity, local, remote) = setup().await;
        seed_guest_records(&local).await;
        identity.sign_in("user-1");
        service.evaluate().await.unwrap();

        remote.set_fail_writes(true).await;
        let outcome = service.resolve(MergeChoice::Merge).await.unwrap();

        assert_eq!(outcome.failed_bookmarks, 2);
        assert_eq!(outcome.failed_last_reads, 1);
        assert!(!outcome.local_cleared);
        assert_eq!(local.list_bookmarks(None).await.unwrap().len(), 2);
        assert_eq!(service.phase().await, MergePhase::Done);
    }

    #[tokio::test]
    async fn resolve_without_prompt_is_rejected() {
        let (service, identity, _, _) = setup().await;
        identity.sign_in("user-1");

        let result = service.resolve(MergeChoice::Merge).await;
        assert!(matches!(result, Err(AppError::InvalidInput(_))));
    }
}
