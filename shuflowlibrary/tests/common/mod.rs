//! In-memory remote catalog shared by the integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::json;
use shuflowspotify::{
    Album, Artist, Page, PageRequest, PlaylistItem, RemoteCatalog, Result, SavedAlbum, SavedTrack,
    SimplifiedAlbum, SimplifiedPlaylist, SpotifyError, Track,
};
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

pub fn track(id: &str) -> Track {
    serde_json::from_value(json!({ "id": id, "name": format!("Track {id}") })).unwrap()
}

pub fn saved_track(id: &str) -> SavedTrack {
    SavedTrack {
        added_at: None,
        track: track(id),
    }
}

pub fn simplified_album(id: &str) -> SimplifiedAlbum {
    serde_json::from_value(json!({ "id": id, "name": format!("Album {id}") })).unwrap()
}

pub fn saved_album(id: &str) -> SavedAlbum {
    SavedAlbum {
        added_at: None,
        album: simplified_album(id),
    }
}

pub fn album(id: &str, track_ids: &[&str]) -> Album {
    Album {
        summary: simplified_album(id),
        tracks: Page::last(track_ids.iter().map(|t| track(t)).collect()),
    }
}

pub fn artist(id: &str) -> Artist {
    serde_json::from_value(json!({ "id": id, "name": format!("Artist {id}") })).unwrap()
}

pub fn playlist(id: &str, total: u32) -> SimplifiedPlaylist {
    serde_json::from_value(json!({
        "id": id,
        "name": format!("Playlist {id}"),
        "tracks": { "total": total }
    }))
    .unwrap()
}

pub fn playlist_track(id: &str) -> PlaylistItem {
    serde_json::from_value(json!({
        "is_local": false,
        "track": { "type": "track", "id": id, "name": format!("Track {id}") }
    }))
    .unwrap()
}

pub fn playlist_episode(id: &str) -> PlaylistItem {
    serde_json::from_value(json!({
        "is_local": false,
        "track": { "type": "episode", "id": id, "name": format!("Episode {id}") }
    }))
    .unwrap()
}

/// Offset-paginated slice of `all`, advertising a next link while items remain
fn page<T: Clone>(all: &[T], request: &PageRequest) -> Page<T> {
    let offset = request.offset.unwrap_or(0) as usize;
    let limit = request.limit as usize;
    let end = (offset + limit).min(all.len());
    let items = all.get(offset..end).map(<[T]>::to_vec).unwrap_or_default();
    if end < all.len() {
        Page::with_next(
            items,
            format!("https://fake.invalid/page?offset={end}&limit={limit}"),
        )
    } else {
        Page::last(items)
    }
}

/// Scripted catalog recording every request it serves
#[derive(Default)]
pub struct FakeCatalog {
    pub saved_albums: Mutex<Vec<SavedAlbum>>,
    pub followed_artists: Mutex<Vec<Artist>>,
    pub playlists: Mutex<Vec<SimplifiedPlaylist>>,
    pub saved_tracks: Mutex<Vec<SavedTrack>>,
    pub tracks: Mutex<HashMap<String, Track>>,
    pub albums: Mutex<HashMap<String, Album>>,
    pub artist_albums: Mutex<HashMap<String, Vec<SimplifiedAlbum>>>,
    pub playlist_items: Mutex<HashMap<String, Vec<PlaylistItem>>>,
    /// Endpoints answering with a server error
    pub failing: Mutex<HashSet<&'static str>>,
    /// `endpoint` or `endpoint:offset` for every call
    pub calls: Mutex<Vec<String>>,
}

impl FakeCatalog {
    pub fn fail(&self, endpoint: &'static str) {
        self.failing.lock().unwrap().insert(endpoint);
    }

    pub fn recover(&self, endpoint: &'static str) {
        self.failing.lock().unwrap().remove(endpoint);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count_calls(&self, endpoint: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.split(':').next() == Some(endpoint))
            .count()
    }

    fn record(&self, endpoint: &'static str, request: Option<&PageRequest>) -> Result<()> {
        let entry = match request {
            Some(request) => format!("{endpoint}:{}", request.offset.unwrap_or(0)),
            None => endpoint.to_string(),
        };
        self.calls.lock().unwrap().push(entry);
        if self.failing.lock().unwrap().contains(endpoint) {
            return Err(SpotifyError::ApiError {
                code: 500,
                message: format!("{endpoint} unavailable"),
            });
        }
        Ok(())
    }
}

fn not_found(id: &str) -> SpotifyError {
    SpotifyError::NotFound(id.to_string())
}

#[async_trait]
impl RemoteCatalog for FakeCatalog {
    async fn saved_albums(&self, request: PageRequest) -> Result<Page<SavedAlbum>> {
        self.record("saved_albums", Some(&request))?;
        Ok(page(&self.saved_albums.lock().unwrap(), &request))
    }

    async fn followed_artists(&self, request: PageRequest) -> Result<Page<Artist>> {
        self.record("followed_artists", Some(&request))?;
        Ok(page(&self.followed_artists.lock().unwrap(), &request))
    }

    async fn playlists(&self, request: PageRequest) -> Result<Page<SimplifiedPlaylist>> {
        self.record("playlists", Some(&request))?;
        Ok(page(&self.playlists.lock().unwrap(), &request))
    }

    async fn saved_tracks(&self, request: PageRequest) -> Result<Page<SavedTrack>> {
        self.record("saved_tracks", Some(&request))?;
        Ok(page(&self.saved_tracks.lock().unwrap(), &request))
    }

    async fn track(&self, id: &str) -> Result<Track> {
        self.record("track", None)?;
        // Suspend once so concurrent callers can overlap a pending draw
        tokio::task::yield_now().await;
        self.tracks
            .lock()
            .unwrap()
            .get(id)
            .cloned()
            .ok_or_else(|| not_found(id))
    }

    async fn album(&self, id: &str) -> Result<Album> {
        self.record("album", None)?;
        self.albums
            .lock()
            .unwrap()
            .get(id)
            .cloned()
            .ok_or_else(|| not_found(id))
    }

    async fn album_tracks(&self, id: &str, request: PageRequest) -> Result<Page<Track>> {
        self.record("album_tracks", Some(&request))?;
        let albums = self.albums.lock().unwrap();
        let album = albums.get(id).ok_or_else(|| not_found(id))?;
        Ok(page(&album.tracks.items, &request))
    }

    async fn artist_albums(&self, id: &str, request: PageRequest) -> Result<Page<SimplifiedAlbum>> {
        self.record("artist_albums", Some(&request))?;
        let albums = self.artist_albums.lock().unwrap();
        let all = albums.get(id).ok_or_else(|| not_found(id))?;
        Ok(page(all, &request))
    }

    async fn playlist_items(&self, id: &str, request: PageRequest) -> Result<Page<PlaylistItem>> {
        self.record("playlist_items", Some(&request))?;
        let items = self.playlist_items.lock().unwrap();
        let all = items.get(id).ok_or_else(|| not_found(id))?;
        Ok(page(all, &request))
    }
}
