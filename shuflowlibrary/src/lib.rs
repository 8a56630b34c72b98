//! # shuflowlibrary - Local mirror and random selection
//!
//! This crate keeps a local mirror of the user's remote library (saved
//! albums, followed artists, playlists and saved tracks) and draws tracks
//! from it:
//!
//! - [`LibraryWriter`] pulls new records incrementally from a
//!   [`RemoteCatalog`](shuflowspotify::RemoteCatalog), newest first;
//! - [`LibraryReader`] picks a category by weight, a random active record
//!   inside it, and expands it into a [`PlayerItem`];
//! - [`LibraryManager`] ties both to a [`LibraryStore`] and feeds a
//!   [`LookaheadQueue`](shuflowqueue::LookaheadQueue).
//!
//! ```rust,no_run
//! use shuflowlibrary::{LibraryManager, LibraryOptions, MemoryLibraryStore};
//! use shuflowspotify::SpotifyApi;
//! use std::sync::Arc;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let store = Arc::new(MemoryLibraryStore::new());
//! let remote = Arc::new(SpotifyApi::new("access-token")?);
//! let manager = LibraryManager::new(store, remote, LibraryOptions::default());
//!
//! manager.sync(false).await?;
//! if let Some(item) = manager.next().await? {
//!     println!("{}", item.track.name);
//! }
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod manager;
pub mod picker;
pub mod reader;
pub mod record;
pub mod settings;
pub mod store;
pub mod writer;

pub use error::{LibraryError, Result};
pub use manager::{LibraryManager, LibraryOptions};
pub use picker::Picker;
pub use reader::{LibraryReader, PlayerItem, category_weights};
pub use record::{Category, LibraryRecord, LocalCounts, NewRecord};
pub use settings::LibrarySettings;
pub use store::{LibraryStore, MemoryLibraryStore, SqliteLibraryStore, open_store};
pub use writer::{CategoryReport, LibraryWriter, SyncOutcome, SyncReport};
