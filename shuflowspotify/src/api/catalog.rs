//! Module d'accès au catalogue (albums, tracks, artistes, playlists)

use super::SpotifyApi;
use crate::error::Result;
use crate::models::*;
use crate::paginator::PageRequest;
use tracing::debug;

/// Groupes d'albums retenus pour un artiste
const ARTIST_ALBUM_GROUPS: &str = "album,single";

impl SpotifyApi {
    /// Récupère une piste complète
    pub async fn get_track(&self, track_id: &str) -> Result<Track> {
        debug!("Fetching track {}", track_id);
        self.get(&format!("/tracks/{}", track_id), &[]).await
    }

    /// Récupère un album avec la première page de ses pistes
    pub async fn get_album(&self, album_id: &str) -> Result<Album> {
        debug!("Fetching album {}", album_id);
        self.get(&format!("/albums/{}", album_id), &[]).await
    }

    /// Récupère une page des pistes d'un album
    pub async fn get_album_tracks(
        &self,
        album_id: &str,
        request: &PageRequest,
    ) -> Result<Page<Track>> {
        debug!("Fetching tracks of album {}", album_id);
        self.get(&format!("/albums/{}/tracks", album_id), &request.query())
            .await
    }

    /// Récupère une page des albums et singles d'un artiste
    pub async fn get_artist_albums(
        &self,
        artist_id: &str,
        request: &PageRequest,
    ) -> Result<Page<SimplifiedAlbum>> {
        debug!("Fetching albums of artist {}", artist_id);
        let mut params = request.query();
        params.push(("include_groups", ARTIST_ALBUM_GROUPS.to_string()));
        self.get(&format!("/artists/{}/albums", artist_id), &params)
            .await
    }

    /// Récupère une page des entrées d'une playlist
    pub async fn get_playlist_items(
        &self,
        playlist_id: &str,
        request: &PageRequest,
    ) -> Result<Page<PlaylistItem>> {
        debug!("Fetching items of playlist {}", playlist_id);
        self.get(&format!("/playlists/{}/tracks", playlist_id), &request.query())
            .await
    }
}
