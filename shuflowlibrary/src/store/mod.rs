//! Local persistence of the mirrored catalog.
//!
//! Each category lives in its own collection keyed by a surrogate id, with
//! a uniqueness constraint on the remote id and an index on the active flag.
//! A single settings row carries the category switches and the last sync
//! timestamp. Two backends are provided: SQLite for the application and an
//! in-memory one for tests and throwaway sessions.

mod memory;
mod sqlite;

pub use memory::MemoryLibraryStore;
pub use sqlite::SqliteLibraryStore;

use crate::error::Result;
use crate::record::{Category, LibraryRecord, LocalCounts, NewRecord};
use crate::settings::LibrarySettings;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

/// Abstract persistence interface.
#[async_trait]
pub trait LibraryStore: Send + Sync {
    /// Number of active records in a category
    async fn count_active(&self, category: Category) -> Result<u64>;

    /// Active record at `offset` when active records are ordered by id
    async fn active_record_at(&self, category: Category, offset: u64)
    -> Result<Option<LibraryRecord>>;

    async fn get(&self, category: Category, id: i64) -> Result<Option<LibraryRecord>>;

    /// Subset of `external_ids` already present in the category
    async fn existing_external_ids(
        &self,
        category: Category,
        external_ids: Vec<String>,
    ) -> Result<HashSet<String>>;

    /// Insert records whose remote id is unknown; returns how many were written.
    ///
    /// Records already present keep their surrogate id and active flag.
    async fn insert_missing(&self, category: Category, records: Vec<NewRecord>) -> Result<usize>;

    /// Returns false when no record has this id
    async fn set_active(&self, category: Category, id: i64, active: bool) -> Result<bool>;

    /// Remove every record of a category
    async fn clear(&self, category: Category) -> Result<()>;

    /// The settings row, created with defaults on first access
    async fn settings(&self) -> Result<LibrarySettings>;

    /// Stamp the last complete sync, or forget it with `None`
    async fn update_synced_at(&self, at: Option<DateTime<Utc>>) -> Result<()>;

    async fn set_category_enabled(
        &self,
        category: Category,
        enabled: bool,
    ) -> Result<LibrarySettings>;

    /// Remove all records and the settings row
    async fn drop_all(&self) -> Result<()>;

    async fn counts(&self) -> Result<LocalCounts> {
        let mut counts = LocalCounts::default();
        for category in Category::ALL {
            counts.set(category, self.count_active(category).await?);
        }
        Ok(counts)
    }
}

/// Open the SQLite store at `path`, creating the schema when missing.
pub fn open_store(path: impl AsRef<Path>) -> Result<Arc<dyn LibraryStore>> {
    let store = SqliteLibraryStore::new(path)?;
    Ok(Arc::new(store))
}
