//! Module d'accès à la bibliothèque de l'utilisateur courant
//!
//! Chaque méthode récupère une page ; l'itération est confiée au
//! [`Paginator`](crate::paginator::Paginator).

use super::SpotifyApi;
use crate::error::Result;
use crate::models::*;
use crate::paginator::PageRequest;
use serde::Deserialize;
use tracing::debug;

/// Réponse de `/me/following?type=artist` (pagination par curseur)
#[derive(Debug, Deserialize)]
struct FollowedArtistsResponse {
    artists: Page<Artist>,
}

impl SpotifyApi {
    /// Albums sauvegardés (`/me/albums`, pagination par offset)
    pub async fn saved_albums(&self, request: &PageRequest) -> Result<Page<SavedAlbum>> {
        debug!("Fetching saved albums");
        self.get("/me/albums", &request.query()).await
    }

    /// Artistes suivis (`/me/following`, pagination par curseur `after`)
    pub async fn followed_artists(&self, request: &PageRequest) -> Result<Page<Artist>> {
        debug!("Fetching followed artists");
        let mut params = request.query();
        params.push(("type", "artist".to_string()));
        let response: FollowedArtistsResponse = self.get("/me/following", &params).await?;
        Ok(response.artists)
    }

    /// Playlists de l'utilisateur (`/me/playlists`)
    pub async fn user_playlists(&self, request: &PageRequest) -> Result<Page<SimplifiedPlaylist>> {
        debug!("Fetching user playlists");
        self.get("/me/playlists", &request.query()).await
    }

    /// Pistes sauvegardées (`/me/tracks`)
    pub async fn saved_tracks(&self, request: &PageRequest) -> Result<Page<SavedTrack>> {
        debug!("Fetching saved tracks");
        self.get("/me/tracks", &request.query()).await
    }
}
