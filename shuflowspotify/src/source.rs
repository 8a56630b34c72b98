//! Trait d'accès au catalogue distant
//!
//! [`RemoteCatalog`] est la frontière entre le moteur de bibliothèque et le
//! service distant : la synchronisation et la sélection ne voient que ce
//! trait, ce qui permet de les tester avec un catalogue en mémoire.

use crate::api::SpotifyApi;
use crate::error::Result;
use crate::models::*;
use crate::paginator::PageRequest;
use async_trait::async_trait;

/// Opérations du catalogue distant utilisées par la bibliothèque
#[async_trait]
pub trait RemoteCatalog: Send + Sync {
    /// Page d'albums sauvegardés
    async fn saved_albums(&self, request: PageRequest) -> Result<Page<SavedAlbum>>;

    /// Page d'artistes suivis
    async fn followed_artists(&self, request: PageRequest) -> Result<Page<Artist>>;

    /// Page de playlists de l'utilisateur
    async fn playlists(&self, request: PageRequest) -> Result<Page<SimplifiedPlaylist>>;

    /// Page de pistes sauvegardées
    async fn saved_tracks(&self, request: PageRequest) -> Result<Page<SavedTrack>>;

    /// Piste complète
    async fn track(&self, id: &str) -> Result<Track>;

    /// Album complet avec la première page de ses pistes
    async fn album(&self, id: &str) -> Result<Album>;

    /// Page de pistes d'un album
    async fn album_tracks(&self, id: &str, request: PageRequest) -> Result<Page<Track>>;

    /// Page d'albums d'un artiste
    async fn artist_albums(&self, id: &str, request: PageRequest) -> Result<Page<SimplifiedAlbum>>;

    /// Page d'entrées d'une playlist
    async fn playlist_items(&self, id: &str, request: PageRequest) -> Result<Page<PlaylistItem>>;
}

#[async_trait]
impl RemoteCatalog for SpotifyApi {
    async fn saved_albums(&self, request: PageRequest) -> Result<Page<SavedAlbum>> {
        SpotifyApi::saved_albums(self, &request).await
    }

    async fn followed_artists(&self, request: PageRequest) -> Result<Page<Artist>> {
        SpotifyApi::followed_artists(self, &request).await
    }

    async fn playlists(&self, request: PageRequest) -> Result<Page<SimplifiedPlaylist>> {
        self.user_playlists(&request).await
    }

    async fn saved_tracks(&self, request: PageRequest) -> Result<Page<SavedTrack>> {
        SpotifyApi::saved_tracks(self, &request).await
    }

    async fn track(&self, id: &str) -> Result<Track> {
        self.get_track(id).await
    }

    async fn album(&self, id: &str) -> Result<Album> {
        self.get_album(id).await
    }

    async fn album_tracks(&self, id: &str, request: PageRequest) -> Result<Page<Track>> {
        self.get_album_tracks(id, &request).await
    }

    async fn artist_albums(&self, id: &str, request: PageRequest) -> Result<Page<SimplifiedAlbum>> {
        self.get_artist_albums(id, &request).await
    }

    async fn playlist_items(&self, id: &str, request: PageRequest) -> Result<Page<PlaylistItem>> {
        self.get_playlist_items(id, &request).await
    }
}
