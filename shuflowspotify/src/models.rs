//! Structures de données pour représenter les objets du catalogue distant
//!
//! Seuls les champs utiles à la synchronisation et à la lecture sont
//! modélisés ; serde ignore le reste de la réponse.

use serde::{Deserialize, Deserializer, Serialize};

/// Désérialise un identifiant qui peut être `null` (fichiers locaux)
pub(crate) fn nullable_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Une page de résultats renvoyée par l'API
///
/// `next` est l'URL de la page suivante : elle porte soit un paramètre
/// `offset`, soit un curseur `after`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub total: Option<u32>,
}

impl<T> Page<T> {
    /// Page terminale, sans continuation
    pub fn last(items: Vec<T>) -> Self {
        Self {
            items,
            next: None,
            total: None,
        }
    }

    /// Page suivie d'une continuation
    pub fn with_next(items: Vec<T>, next: impl Into<String>) -> Self {
        Self {
            items,
            next: Some(next.into()),
            total: None,
        }
    }
}

/// Référence courte vers un artiste (dans une track ou un album)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ArtistRef {
    #[serde(default, deserialize_with = "nullable_string")]
    pub id: String,
    pub name: String,
}

/// Artiste suivi par l'utilisateur
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Artist {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub uri: String,
    #[serde(default)]
    pub genres: Vec<String>,
}

/// Album sans sa liste de pistes
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SimplifiedAlbum {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub uri: String,
    #[serde(default)]
    pub album_type: Option<String>,
    #[serde(default)]
    pub total_tracks: Option<u32>,
    #[serde(default)]
    pub artists: Vec<ArtistRef>,
}

/// Album complet, avec la première page de ses pistes
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Album {
    #[serde(flatten)]
    pub summary: SimplifiedAlbum,
    pub tracks: Page<Track>,
}

/// Piste jouable
///
/// Les pistes listées par `/albums/{id}/tracks` n'ont pas de champ `album` ;
/// le lecteur l'ajoute lorsqu'il connaît l'album d'origine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Track {
    #[serde(default, deserialize_with = "nullable_string")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub uri: String,
    #[serde(default)]
    pub duration_ms: u64,
    #[serde(default)]
    pub artists: Vec<ArtistRef>,
    #[serde(default)]
    pub album: Option<SimplifiedAlbum>,
    #[serde(default)]
    pub is_local: bool,
}

impl Track {
    /// Rattache l'album d'origine à une piste simplifiée
    pub fn with_album(mut self, album: SimplifiedAlbum) -> Self {
        self.album = Some(album);
        self
    }
}

/// Épisode de podcast (présent dans certaines playlists)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Episode {
    #[serde(default, deserialize_with = "nullable_string")]
    pub id: String,
    pub name: String,
}

/// Contenu d'une entrée de playlist
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum PlaylistEntry {
    Track(Track),
    Episode(Episode),
    #[serde(other)]
    Unsupported,
}

/// Entrée de playlist telle que renvoyée par `/playlists/{id}/tracks`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlaylistItem {
    #[serde(default)]
    pub is_local: bool,
    /// `null` lorsque la piste a été retirée du catalogue
    #[serde(default)]
    pub track: Option<PlaylistEntry>,
}

impl PlaylistItem {
    /// Retourne la piste si l'entrée est une vraie piste du catalogue
    ///
    /// Les épisodes, les fichiers locaux et les entrées supprimées sont
    /// écartés.
    pub fn into_track(self) -> Option<Track> {
        if self.is_local {
            return None;
        }
        match self.track {
            Some(PlaylistEntry::Track(track)) if !track.is_local && !track.id.is_empty() => {
                Some(track)
            }
            _ => None,
        }
    }
}

/// Compteur de pistes d'une playlist
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TracksRef {
    #[serde(default)]
    pub total: u32,
}

/// Playlist sans son contenu
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SimplifiedPlaylist {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub uri: String,
    #[serde(default)]
    pub tracks: Option<TracksRef>,
}

impl SimplifiedPlaylist {
    /// Nombre de pistes annoncé (0 si inconnu)
    pub fn track_total(&self) -> u32 {
        self.tracks.as_ref().map(|t| t.total).unwrap_or(0)
    }
}

/// Album sauvegardé dans la bibliothèque
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SavedAlbum {
    #[serde(default)]
    pub added_at: Option<String>,
    pub album: SimplifiedAlbum,
}

/// Piste sauvegardée dans la bibliothèque
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SavedTrack {
    #[serde(default)]
    pub added_at: Option<String>,
    pub track: Track,
}
