//! Weighted random selection of the next track.
//!
//! A category is drawn with a weight of `sqrt(count + 1) * bias`, a random
//! active record is picked inside it and expanded into a concrete track
//! through the remote catalog. Records that yield nothing playable (an empty
//! album, a playlist of episodes) are retried with a fresh draw, a bounded
//! number of times.

use crate::error::{LibraryError, Result};
use crate::picker::Picker;
use crate::record::{Category, LibraryRecord, LocalCounts};
use crate::settings::LibrarySettings;
use crate::store::LibraryStore;
use serde::Serialize;
use shuflowspotify::{
    DEFAULT_PAGE_LIMIT, Paginator, PlaylistItem, RemoteCatalog, SimplifiedAlbum, Track,
};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tokio::sync::Mutex;
use tracing::{debug, trace};

/// Failed resolutions tolerated before giving up
pub const DEFAULT_MAX_RETRIES: usize = 20;

/// A resolved track plus the local records it was reached through
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerItem {
    pub track: Track,
    pub album: Option<LibraryRecord>,
    pub artist: Option<LibraryRecord>,
    pub playlist: Option<LibraryRecord>,
}

impl PlayerItem {
    pub fn new(track: Track) -> Self {
        Self {
            track,
            album: None,
            artist: None,
            playlist: None,
        }
    }

    /// The category this item was drawn from
    pub fn source(&self) -> Category {
        if self.playlist.is_some() {
            Category::Playlists
        } else if self.artist.is_some() {
            Category::Artists
        } else if self.album.is_some() {
            Category::Albums
        } else {
            Category::Tracks
        }
    }
}

/// Selection weights of the enabled categories, in category order.
///
/// An enabled but empty category keeps a small weight: drawing it yields
/// nothing and costs one retry.
pub fn category_weights(settings: &LibrarySettings, counts: &LocalCounts) -> Vec<(Category, f64)> {
    settings
        .enabled_categories()
        .into_iter()
        .map(|c| (c, ((counts.get(c) + 1) as f64).sqrt() * c.bias()))
        .collect()
}

/// Outcome of the last completed draw, handed to the callers that waited on it
#[derive(Default)]
struct Round {
    completed: u64,
    outcome: Option<std::result::Result<Option<PlayerItem>, String>>,
}

pub struct LibraryReader {
    store: Arc<dyn LibraryStore>,
    remote: Arc<dyn RemoteCatalog>,
    picker: Picker,
    page_limit: u32,
    max_retries: usize,
    stopped: AtomicBool,
    completed: AtomicU64,
    in_flight: Mutex<Round>,
}

impl LibraryReader {
    pub fn new(store: Arc<dyn LibraryStore>, remote: Arc<dyn RemoteCatalog>) -> Self {
        Self {
            store,
            remote,
            picker: Picker::new(),
            page_limit: DEFAULT_PAGE_LIMIT,
            max_retries: DEFAULT_MAX_RETRIES,
            stopped: AtomicBool::new(false),
            completed: AtomicU64::new(0),
            in_flight: Mutex::new(Round::default()),
        }
    }

    pub fn with_picker(mut self, picker: Picker) -> Self {
        self.picker = picker;
        self
    }

    pub fn with_page_limit(mut self, page_limit: u32) -> Self {
        self.page_limit = page_limit.max(1);
        self
    }

    pub fn with_max_retries(mut self, max_retries: usize) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }

    /// Draw the next playable item.
    ///
    /// Returns `Ok(None)` when no category is eligible, when the retry bound
    /// is exhausted or once the reader is stopped.
    ///
    /// A caller arriving while a draw is in flight waits for it and receives
    /// its result (a failure comes back as [`LibraryError::SharedDraw`]); its
    /// own `settings` and `counts` are ignored in that case.
    pub async fn next_item(
        &self,
        settings: &LibrarySettings,
        counts: &LocalCounts,
    ) -> Result<Option<PlayerItem>> {
        let arrived = self.completed.load(Ordering::SeqCst);
        let mut round = self.in_flight.lock().await;
        if round.completed != arrived {
            if let Some(outcome) = round.outcome.clone() {
                trace!("Joining the draw that was in flight");
                return outcome.map_err(LibraryError::SharedDraw);
            }
        }

        let result = self.draw(settings, counts).await;
        round.outcome = Some(match &result {
            Ok(item) => Ok(item.clone()),
            Err(e) => Err(e.to_string()),
        });
        round.completed += 1;
        self.completed.store(round.completed, Ordering::SeqCst);
        result
    }

    async fn draw(
        &self,
        settings: &LibrarySettings,
        counts: &LocalCounts,
    ) -> Result<Option<PlayerItem>> {
        let weights = category_weights(settings, counts);
        if weights.is_empty() {
            debug!("No eligible category to draw from");
            return Ok(None);
        }

        let mut retries = 0;
        while retries <= self.max_retries && !self.is_stopped() {
            let category = self.picker.weighted(&weights)?;
            trace!("Drawing from {} (attempt {})", category, retries + 1);

            let item = self.resolve(category).await?;
            if item.is_some() || self.is_stopped() {
                return Ok(item);
            }
            retries += 1;
        }

        if !self.is_stopped() {
            debug!("Giving up after {} empty draws", retries);
        }
        Ok(None)
    }

    /// Refuse further draws and wait for the one in progress
    pub async fn stop(&self) {
        self.stopped.store(true, Ordering::SeqCst);
        let _in_flight = self.in_flight.lock().await;
    }

    async fn resolve(&self, category: Category) -> Result<Option<PlayerItem>> {
        match category {
            Category::Albums => self.from_album().await,
            Category::Artists => self.from_artist().await,
            Category::Playlists => self.from_playlist().await,
            Category::Tracks => self.from_track().await,
        }
    }

    /// Uniformly random active record of a category
    async fn random_record(&self, category: Category) -> Result<Option<LibraryRecord>> {
        let count = self.store.count_active(category).await?;
        let Some(offset) = self.picker.index(count) else {
            return Ok(None);
        };
        self.store.active_record_at(category, offset).await
    }

    async fn from_track(&self) -> Result<Option<PlayerItem>> {
        let Some(record) = self.random_record(Category::Tracks).await? else {
            return Ok(None);
        };
        let track = self.remote.track(&record.external_id).await?;
        Ok(Some(PlayerItem::new(track)))
    }

    async fn from_album(&self) -> Result<Option<PlayerItem>> {
        let Some(record) = self.random_record(Category::Albums).await? else {
            return Ok(None);
        };
        let album = self.remote.album(&record.external_id).await?;
        let Some(track) = self.pick_album_track(album.summary, album.tracks.items) else {
            return Ok(None);
        };
        Ok(Some(PlayerItem {
            album: Some(record),
            ..PlayerItem::new(track)
        }))
    }

    async fn from_artist(&self) -> Result<Option<PlayerItem>> {
        let Some(record) = self.random_record(Category::Artists).await? else {
            return Ok(None);
        };

        let remote = &self.remote;
        let artist_id = record.external_id.as_str();
        let albums = Paginator::with_limit(
            |request| remote.artist_albums(artist_id, request),
            self.page_limit,
        )
        .collect_all()
        .await?;
        let Some(album) = self.picker.choose(albums) else {
            trace!("Artist {} has no album", record.name);
            return Ok(None);
        };

        let album_id = album.id.as_str();
        let tracks = Paginator::with_limit(
            |request| remote.album_tracks(album_id, request),
            self.page_limit,
        )
        .collect_all()
        .await?;
        let Some(track) = self.pick_album_track(album, tracks) else {
            return Ok(None);
        };
        Ok(Some(PlayerItem {
            artist: Some(record),
            ..PlayerItem::new(track)
        }))
    }

    async fn from_playlist(&self) -> Result<Option<PlayerItem>> {
        let Some(record) = self.random_record(Category::Playlists).await? else {
            return Ok(None);
        };

        let remote = &self.remote;
        let playlist_id = record.external_id.as_str();
        let items = Paginator::with_limit(
            |request| remote.playlist_items(playlist_id, request),
            self.page_limit,
        )
        .collect_all()
        .await?;
        let tracks: Vec<Track> = items
            .into_iter()
            .filter_map(PlaylistItem::into_track)
            .collect();
        let Some(track) = self.picker.choose(tracks) else {
            trace!("Playlist {} has no playable track", record.name);
            return Ok(None);
        };
        Ok(Some(PlayerItem {
            playlist: Some(record),
            ..PlayerItem::new(track)
        }))
    }

    /// Random track of an album, carrying the album summary
    fn pick_album_track(&self, album: SimplifiedAlbum, tracks: Vec<Track>) -> Option<Track> {
        let playable: Vec<Track> = tracks
            .into_iter()
            .filter(|t| !t.is_local && !t.id.is_empty())
            .collect();
        self.picker
            .choose(playable)
            .map(|track| track.with_album(album))
    }
}
