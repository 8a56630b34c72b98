//! Incremental mirror of the remote library into the local store.
//!
//! Remote collections are listed newest first, so each category is pulled
//! page by page until the first record that is already known locally: the
//! records in front of it are new, the ones behind it are assumed to be
//! mirrored already. All enabled categories are mirrored concurrently and
//! the sync timestamp is only written once every category finished. If any
//! category fails, the whole mirror is cleared so that the next run starts
//! from scratch.

use crate::error::Result;
use crate::record::{Category, NewRecord};
use crate::settings::LibrarySettings;
use crate::store::LibraryStore;
use chrono::{DateTime, Duration, Utc};
use futures::future::{join_all, try_join_all};
use serde::Serialize;
use shuflowspotify::{
    Artist, DEFAULT_PAGE_LIMIT, Page, PageRequest, Paginator, RemoteCatalog, SavedAlbum,
    SavedTrack, SimplifiedPlaylist,
};
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Default freshness window of a completed sync
pub const DEFAULT_SYNC_FRESHNESS_HOURS: i64 = 24;

/// How a sync run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncOutcome {
    /// Every category completed and the timestamp was written
    Synced,
    /// A category failed and the mirror was cleared
    Cleared,
    /// The writer was stopped; the timestamp was left untouched
    Stopped,
}

/// Per-category progress of a sync run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryReport {
    pub category: Category,
    pub pages: usize,
    pub inserted: usize,
    /// A known record was reached before the end of the collection
    pub stopped_early: bool,
    pub interrupted: bool,
}

impl CategoryReport {
    fn new(category: Category) -> Self {
        Self {
            category,
            pages: 0,
            inserted: 0,
            stopped_early: false,
            interrupted: false,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SyncReport {
    pub outcome: SyncOutcome,
    pub categories: Vec<CategoryReport>,
    /// Categories that failed, with the error message
    pub failures: Vec<(Category, String)>,
}

impl SyncReport {
    pub fn inserted(&self) -> usize {
        self.categories.iter().map(|c| c.inserted).sum()
    }
}

pub struct LibraryWriter {
    store: Arc<dyn LibraryStore>,
    remote: Arc<dyn RemoteCatalog>,
    page_limit: u32,
    freshness: Duration,
    stopped: AtomicBool,
    running: Mutex<()>,
}

impl LibraryWriter {
    pub fn new(store: Arc<dyn LibraryStore>, remote: Arc<dyn RemoteCatalog>) -> Self {
        Self {
            store,
            remote,
            page_limit: DEFAULT_PAGE_LIMIT,
            freshness: Duration::hours(DEFAULT_SYNC_FRESHNESS_HOURS),
            stopped: AtomicBool::new(false),
            running: Mutex::new(()),
        }
    }

    pub fn with_page_limit(mut self, page_limit: u32) -> Self {
        self.page_limit = page_limit.max(1);
        self
    }

    pub fn with_freshness(mut self, freshness: Duration) -> Self {
        self.freshness = freshness;
        self
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }

    /// True when the library was never synced or the last sync is stale
    pub fn needs_sync(&self, settings: &LibrarySettings, now: DateTime<Utc>) -> bool {
        settings.is_stale(now, self.freshness)
    }

    /// Remove every mirrored record, in all categories
    pub async fn clear(&self) -> Result<()> {
        try_join_all(Category::ALL.into_iter().map(|c| self.store.clear(c))).await?;
        info!("Library mirror cleared");
        Ok(())
    }

    /// Mirror every enabled category.
    ///
    /// Only one sync runs at a time; a second caller waits for the first
    /// one to finish.
    pub async fn sync(&self, settings: &LibrarySettings) -> Result<SyncReport> {
        let _running = self.running.lock().await;

        let categories = settings.enabled_categories();
        info!("Syncing library ({} categories)", categories.len());

        let results = join_all(categories.iter().map(|&c| self.update(c))).await;

        let mut reports = Vec::new();
        let mut failures = Vec::new();
        for (category, result) in categories.into_iter().zip(results) {
            match result {
                Ok(report) => {
                    debug!(
                        "{}: {} new records over {} pages",
                        category, report.inserted, report.pages
                    );
                    reports.push(report);
                }
                Err(e) => {
                    warn!("Failed to sync {}: {}", category, e);
                    failures.push((category, e.to_string()));
                }
            }
        }

        let outcome = if !failures.is_empty() {
            self.clear().await?;
            self.store.update_synced_at(None).await?;
            SyncOutcome::Cleared
        } else if self.is_stopped() {
            info!("Sync stopped before completion");
            SyncOutcome::Stopped
        } else {
            self.store.update_synced_at(Some(Utc::now())).await?;
            SyncOutcome::Synced
        };

        Ok(SyncReport {
            outcome,
            categories: reports,
            failures,
        })
    }

    /// Stop at the next page boundary and wait for the running sync
    pub async fn stop(&self) {
        self.stopped.store(true, Ordering::SeqCst);
        let _running = self.running.lock().await;
    }

    async fn update(&self, category: Category) -> Result<CategoryReport> {
        let remote = &self.remote;
        let limit = self.page_limit;
        match category {
            Category::Albums => {
                let pages = Paginator::with_limit(|r| remote.saved_albums(r), limit);
                self.mirror(category, pages, |saved: SavedAlbum| {
                    Some(NewRecord::new(saved.album.id, saved.album.name))
                })
                .await
            }
            Category::Artists => {
                let pages = Paginator::with_limit(|r| remote.followed_artists(r), limit);
                self.mirror(category, pages, |artist: Artist| {
                    Some(NewRecord::new(artist.id, artist.name))
                })
                .await
            }
            Category::Playlists => {
                let pages = Paginator::with_limit(|r| remote.playlists(r), limit);
                self.mirror(category, pages, |playlist: SimplifiedPlaylist| {
                    (playlist.track_total() > 0)
                        .then(|| NewRecord::new(playlist.id, playlist.name))
                })
                .await
            }
            Category::Tracks => {
                let pages = Paginator::with_limit(|r| remote.saved_tracks(r), limit);
                self.mirror(category, pages, |saved: SavedTrack| {
                    (!saved.track.id.is_empty())
                        .then(|| NewRecord::new(saved.track.id, saved.track.name))
                })
                .await
            }
        }
    }

    async fn mirror<T, F, Fut>(
        &self,
        category: Category,
        mut pages: Paginator<T, F>,
        to_record: fn(T) -> Option<NewRecord>,
    ) -> Result<CategoryReport>
    where
        F: FnMut(PageRequest) -> Fut,
        Fut: Future<Output = shuflowspotify::Result<Page<T>>>,
    {
        let mut report = CategoryReport::new(category);
        loop {
            if self.is_stopped() {
                report.interrupted = true;
                break;
            }

            let Some(batch) = pages.next_batch().await? else {
                break;
            };
            report.pages += 1;
            if batch.is_empty() {
                break;
            }

            let records: Vec<NewRecord> = batch.into_iter().filter_map(to_record).collect();
            let ids = records.iter().map(|r| r.external_id.clone()).collect();
            let known = self.store.existing_external_ids(category, ids).await?;

            let first_known = records
                .iter()
                .position(|r| known.contains(&r.external_id));
            let fresh: Vec<NewRecord> = match first_known {
                Some(cut) => records.into_iter().take(cut).collect(),
                None => records,
            };
            report.inserted += self.store.insert_missing(category, fresh).await?;

            if first_known.is_some() {
                debug!("{}: reached an already mirrored record", category);
                report.stopped_early = true;
                break;
            }
        }
        Ok(report)
    }
}
