//! # shuflowspotify - Client du catalogue distant pour Shuflow
//!
//! Cette crate fournit l'accès en lecture au catalogue de l'utilisateur
//! (API Web Spotify) : bibliothèque sauvegardée, artistes suivis, playlists,
//! et expansion des objets (album complet, pistes d'un artiste, contenu d'une
//! playlist).
//!
//! ## Architecture
//!
//! - `models` : Structures de données (Page, Album, Track, Artist, etc.)
//! - `paginator` : Curseur générique sur une collection paginée
//! - `api` : Couche d'accès à l'API REST
//! - `source` : Trait [`RemoteCatalog`] consommé par `shuflowlibrary`
//! - `error` : Gestion des erreurs
//!
//! ## Utilisation
//!
//! ```rust,no_run
//! use shuflowspotify::{Paginator, RemoteCatalog, SpotifyApi};
//!
//! # async fn example() -> shuflowspotify::Result<()> {
//! let api = SpotifyApi::new("access-token")?;
//!
//! let albums = Paginator::new(|request| RemoteCatalog::saved_albums(&api, request))
//!     .collect_all()
//!     .await?;
//! println!("{} saved albums", albums.len());
//! # Ok(())
//! # }
//! ```
//!
//! ## Gestion des erreurs
//!
//! Les erreurs sont typées via `thiserror` ([`SpotifyError`]). Aucun appel
//! n'est réessayé : c'est à l'appelant de décider.

pub mod api;
pub mod error;
pub mod models;
pub mod paginator;
pub mod source;

pub use api::SpotifyApi;
pub use error::{Result, SpotifyError};
pub use models::{
    Album, Artist, ArtistRef, Episode, Page, PlaylistEntry, PlaylistItem, SavedAlbum, SavedTrack,
    SimplifiedAlbum, SimplifiedPlaylist, Track,
};
pub use paginator::{DEFAULT_PAGE_LIMIT, PageRequest, PageStyle, Paginator};
pub use source::RemoteCatalog;
