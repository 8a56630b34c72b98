//! Catalog records mirrored from the remote library

use serde::{Deserialize, Serialize};
use std::fmt;

/// One independently syncable and selectable partition of the catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Albums,
    Artists,
    Playlists,
    Tracks,
}

impl Category {
    /// Fixed iteration order, used by the weighted draw and the sync
    pub const ALL: [Category; 4] = [
        Category::Albums,
        Category::Artists,
        Category::Playlists,
        Category::Tracks,
    ];

    /// Name of the backing table
    pub fn table(self) -> &'static str {
        match self {
            Category::Albums => "albums",
            Category::Artists => "artists",
            Category::Playlists => "playlists",
            Category::Tracks => "tracks",
        }
    }

    /// Selection bias applied on top of the damped count.
    ///
    /// Artist and playlist draws fan out into more distinct tracks.
    pub fn bias(self) -> f64 {
        match self {
            Category::Albums => 1.0,
            Category::Artists => 1.2,
            Category::Playlists => 1.5,
            Category::Tracks => 0.8,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.table())
    }
}

/// A mirrored album, artist, playlist or track
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LibraryRecord {
    /// Surrogate id assigned by the store, stable once assigned
    pub id: i64,
    pub category: Category,
    /// Remote identifier, unique within the category
    pub external_id: String,
    pub active: bool,
    pub name: String,
}

/// A record about to be inserted; always inserted active
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRecord {
    pub external_id: String,
    pub name: String,
}

impl NewRecord {
    pub fn new(external_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            external_id: external_id.into(),
            name: name.into(),
        }
    }
}

/// Active record count per category
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalCounts {
    pub albums: u64,
    pub artists: u64,
    pub playlists: u64,
    pub tracks: u64,
}

impl LocalCounts {
    pub fn get(&self, category: Category) -> u64 {
        match category {
            Category::Albums => self.albums,
            Category::Artists => self.artists,
            Category::Playlists => self.playlists,
            Category::Tracks => self.tracks,
        }
    }

    pub fn set(&mut self, category: Category, count: u64) {
        match category {
            Category::Albums => self.albums = count,
            Category::Artists => self.artists = count,
            Category::Playlists => self.playlists = count,
            Category::Tracks => self.tracks = count,
        }
    }

    pub fn total(&self) -> u64 {
        self.albums + self.artists + self.playlists + self.tracks
    }
}
