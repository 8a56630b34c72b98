//! The single library settings row

use crate::record::Category;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Per-category switches and sync bookkeeping.
///
/// Created lazily by the store with every category enabled and no sync
/// timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LibrarySettings {
    pub use_albums: bool,
    pub use_artists: bool,
    pub use_playlists: bool,
    pub use_tracks: bool,
    pub created_at: DateTime<Utc>,
    pub synced_at: Option<DateTime<Utc>>,
}

impl LibrarySettings {
    pub fn new(created_at: DateTime<Utc>) -> Self {
        Self {
            use_albums: true,
            use_artists: true,
            use_playlists: true,
            use_tracks: true,
            created_at,
            synced_at: None,
        }
    }

    pub fn is_enabled(&self, category: Category) -> bool {
        match category {
            Category::Albums => self.use_albums,
            Category::Artists => self.use_artists,
            Category::Playlists => self.use_playlists,
            Category::Tracks => self.use_tracks,
        }
    }

    pub fn set_enabled(&mut self, category: Category, enabled: bool) {
        match category {
            Category::Albums => self.use_albums = enabled,
            Category::Artists => self.use_artists = enabled,
            Category::Playlists => self.use_playlists = enabled,
            Category::Tracks => self.use_tracks = enabled,
        }
    }

    /// Enabled categories, in the fixed category order
    pub fn enabled_categories(&self) -> Vec<Category> {
        Category::ALL
            .into_iter()
            .filter(|c| self.is_enabled(*c))
            .collect()
    }

    /// True when never synced, or when the last sync is older than `freshness`
    pub fn is_stale(&self, now: DateTime<Utc>, freshness: Duration) -> bool {
        match self.synced_at {
            None => true,
            Some(synced_at) => now - synced_at > freshness,
        }
    }
}
