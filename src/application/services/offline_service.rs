use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::application::ports::{ConnectivityProbe, ContentCache, ContentSource};
use crate::domain::entities::{
    CollectionPayload, DownloadProgress, Dua, DuaCategory, ItemPayload, OfflineStatus, Surah,
    SurahSummary,
};
use crate::domain::value_objects::{ContentKind, OfflineTarget};
use crate::shared::config::DownloadConfig;
use crate::shared::error::AppError;

/// Expected chapter count, used for error payloads before the index is known.
const QURAN_CHAPTER_COUNT: u32 = 114;

/// Coarse phase percentages for the two-step supplication download.
const DUA_PHASE_CATEGORIES: u32 = 30;
const DUA_PHASE_COMPLETE: u32 = 100;

/// Maintains the local mirror of reference content: bulk downloads with
/// progress reporting, stale-while-revalidate reads, and per-collection
/// deletion.
pub struct OfflineContentService {
    source: Arc<dyn ContentSource>,
    cache: Arc<dyn ContentCache>,
    connectivity: Arc<dyn ConnectivityProbe>,
    download: DownloadConfig,
}

impl OfflineContentService {
    pub fn new(
        source: Arc<dyn ContentSource>,
        cache: Arc<dyn ContentCache>,
        connectivity: Arc<dyn ConnectivityProbe>,
        download: DownloadConfig,
    ) -> Self {
        Self {
            source,
            cache,
            connectivity,
            download,
        }
    }

    /// Starts the bulk chapter download in the background and returns its
    /// progress stream. Chapters are fetched strictly sequentially and each
    /// one is persisted as soon as it arrives, so an interrupted run keeps
    /// everything already fetched.
    pub fn download_quran(&self, cancel: CancellationToken) -> mpsc::Receiver<DownloadProgress> {
        let (tx, rx) = mpsc::channel(self.download.progress_buffer);
        let source = self.source.clone();
        let cache = self.cache.clone();
        let delay = Duration::from_millis(self.download.request_delay_ms);

        tokio::spawn(async move {
            if let Err(err) = run_quran_download(source, cache, &tx, cancel, delay).await {
                error!("quran download failed: {err}");
                let _ = tx
                    .send(DownloadProgress::error(QURAN_CHAPTER_COUNT, err.to_string()))
                    .await;
            }
        });

        rx
    }

    /// Starts the two-phase supplication download (categories, then items).
    pub fn download_duas(&self, cancel: CancellationToken) -> mpsc::Receiver<DownloadProgress> {
        let (tx, rx) = mpsc::channel(self.download.progress_buffer);
        let source = self.source.clone();
        let cache = self.cache.clone();

        tokio::spawn(async move {
            if let Err(err) = run_dua_download(source, cache, &tx, cancel).await {
                error!("dua download failed: {err}");
                let _ = tx
                    .send(DownloadProgress::error(DUA_PHASE_COMPLETE, err.to_string()))
                    .await;
            }
        });

        rx
    }

    /// Chapter index, cache first. A cache hit triggers a silent background
    /// refresh when the device is online; the returned read never waits on
    /// the network.
    pub async fn surah_index(&self) -> Result<CollectionPayload<SurahSummary>, AppError> {
        let cached = self.cache.surah_index().await?;
        if !cached.is_empty() {
            if self.connectivity.is_online().await {
                let source = self.source.clone();
                let cache = self.cache.clone();
                tokio::spawn(async move {
                    match source.surah_index().await {
                        Ok(items) => {
                            if let Err(err) = cache.save_surah_index(&items).await {
                                warn!("background index refresh not persisted: {err}");
                            }
                        }
                        Err(err) => debug!("background index refresh failed: {err}"),
                    }
                });
            }
            return Ok(CollectionPayload {
                items: cached,
                from_cache: true,
            });
        }

        let fetched = self.source.surah_index().await?;
        if let Err(err) = self.cache.save_surah_index(&fetched).await {
            warn!("fetched index not persisted: {err}");
        }
        Ok(CollectionPayload {
            items: fetched,
            from_cache: false,
        })
    }

    /// One chapter with verses, cache first. A network fetch persists the
    /// single chapter without touching the bulk completion flag.
    pub async fn surah_detail(&self, number: u32) -> Result<ItemPayload<Surah>, AppError> {
        if let Some(cached) = self.cache.surah_detail(number).await? {
            if self.connectivity.is_online().await {
                let source = self.source.clone();
                let cache = self.cache.clone();
                tokio::spawn(async move {
                    match source.surah_detail(number).await {
                        Ok(surah) => {
                            if let Err(err) = cache.save_surah_detail(&surah).await {
                                warn!("background chapter refresh not persisted: {err}");
                            }
                        }
                        Err(err) => debug!("background chapter refresh failed: {err}"),
                    }
                });
            }
            return Ok(ItemPayload {
                item: cached,
                from_cache: true,
            });
        }

        let fetched = self.source.surah_detail(number).await?;
        if let Err(err) = self.cache.save_surah_detail(&fetched).await {
            warn!("fetched chapter not persisted: {err}");
        }
        Ok(ItemPayload {
            item: fetched,
            from_cache: false,
        })
    }

    pub async fn duas(&self) -> Result<CollectionPayload<Dua>, AppError> {
        let cached = self.cache.duas().await?;
        if !cached.is_empty() {
            if self.connectivity.is_online().await {
                let source = self.source.clone();
                let cache = self.cache.clone();
                tokio::spawn(async move {
                    match source.duas().await {
                        Ok(items) => {
                            if let Err(err) = cache.save_duas(&items).await {
                                warn!("background dua refresh not persisted: {err}");
                            }
                        }
                        Err(err) => debug!("background dua refresh failed: {err}"),
                    }
                });
            }
            return Ok(CollectionPayload {
                items: cached,
                from_cache: true,
            });
        }

        let fetched = self.source.duas().await?;
        if let Err(err) = self.cache.save_duas(&fetched).await {
            warn!("fetched duas not persisted: {err}");
        }
        Ok(CollectionPayload {
            items: fetched,
            from_cache: false,
        })
    }

    pub async fn dua_categories(&self) -> Result<CollectionPayload<DuaCategory>, AppError> {
        let cached = self.cache.dua_categories().await?;
        if !cached.is_empty() {
            if self.connectivity.is_online().await {
                let source = self.source.clone();
                let cache = self.cache.clone();
                tokio::spawn(async move {
                    match source.dua_categories().await {
                        Ok(items) => {
                            if let Err(err) = cache.save_dua_categories(&items).await {
                                warn!("background category refresh not persisted: {err}");
                            }
                        }
                        Err(err) => debug!("background category refresh failed: {err}"),
                    }
                });
            }
            return Ok(CollectionPayload {
                items: cached,
                from_cache: true,
            });
        }

        let fetched = self.source.dua_categories().await?;
        if let Err(err) = self.cache.save_dua_categories(&fetched).await {
            warn!("fetched categories not persisted: {err}");
        }
        Ok(CollectionPayload {
            items: fetched,
            from_cache: false,
        })
    }

    /// Destructive and immediate: drops the target's rows and resets its
    /// completion flag and progress counter.
    pub async fn delete(&self, target: OfflineTarget) -> Result<(), AppError> {
        self.cache.clear(target).await?;
        info!("offline content deleted: {target:?}");
        Ok(())
    }

    pub async fn status(&self) -> Result<OfflineStatus, AppError> {
        self.cache.status().await
    }
}

async fn run_quran_download(
    source: Arc<dyn ContentSource>,
    cache: Arc<dyn ContentCache>,
    tx: &mpsc::Sender<DownloadProgress>,
    cancel: CancellationToken,
    delay: Duration,
) -> Result<(), AppError> {
    // The index is persisted up front so titles browse offline even before
    // any detail arrives.
    let index = source.surah_index().await?;
    cache.save_surah_index(&index).await?;

    let total = index.len() as u32;
    let mut completed = 0u32;
    let mut failures = 0u32;
    let _ = tx.send(DownloadProgress::downloading(0, total)).await;

    let mut cancelled = false;
    for summary in &index {
        if cancel.is_cancelled() {
            cancelled = true;
            break;
        }

        match source.surah_detail(summary.number).await {
            Ok(surah) => {
                cache.save_surah_detail(&surah).await?;
                completed += 1;
                let progress = DownloadProgress::downloading(completed, total);
                cache
                    .set_progress(ContentKind::Quran, progress.percentage)
                    .await?;
                let _ = tx.send(progress).await;
            }
            Err(err) => {
                // Best-effort: one unreachable chapter must not sink the
                // other 113.
                failures += 1;
                warn!("skipping chapter {}: {err}", summary.number);
            }
        }

        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }

    if cancelled {
        info!(completed, total, "quran download cancelled");
        let _ = tx.send(DownloadProgress::cancelled(completed, total)).await;
        return Ok(());
    }

    // The completion flag demands a gap-free run; a partial mirror stays
    // usable but keeps reporting as incomplete.
    cache
        .set_downloaded(ContentKind::Quran, failures == 0)
        .await?;
    if failures > 0 {
        warn!(failures, completed, total, "quran download finished with gaps");
    } else {
        info!(total, "quran download complete");
    }
    let _ = tx.send(DownloadProgress::completed(completed, total)).await;
    Ok(())
}

async fn run_dua_download(
    source: Arc<dyn ContentSource>,
    cache: Arc<dyn ContentCache>,
    tx: &mpsc::Sender<DownloadProgress>,
    cancel: CancellationToken,
) -> Result<(), AppError> {
    let _ = tx
        .send(DownloadProgress::downloading(0, DUA_PHASE_COMPLETE))
        .await;

    let categories = source.dua_categories().await?;
    cache.save_dua_categories(&categories).await?;
    cache
        .set_progress(ContentKind::Duas, DUA_PHASE_CATEGORIES as u8)
        .await?;
    let _ = tx
        .send(DownloadProgress::downloading(
            DUA_PHASE_CATEGORIES,
            DUA_PHASE_COMPLETE,
        ))
        .await;

    if cancel.is_cancelled() {
        info!("dua download cancelled after categories");
        let _ = tx
            .send(DownloadProgress::cancelled(
                DUA_PHASE_CATEGORIES,
                DUA_PHASE_COMPLETE,
            ))
            .await;
        return Ok(());
    }

    let duas = source.duas().await?;
    cache.save_duas(&duas).await?;
    cache
        .set_downloaded(ContentKind::Duas, true)
        .await?;
    cache
        .set_progress(ContentKind::Duas, DUA_PHASE_COMPLETE as u8)
        .await?;
    info!(count = duas.len(), "dua download complete");
    let _ = tx
        .send(DownloadProgress::completed(
            DUA_PHASE_COMPLETE,
            DUA_PHASE_COMPLETE,
        ))
        .await;
    Ok(())
}
