//! Facade over the store, the sync engine and the selection reader

use crate::error::Result;
use crate::picker::Picker;
use crate::reader::{DEFAULT_MAX_RETRIES, LibraryReader, PlayerItem};
use crate::record::{Category, LocalCounts};
use crate::settings::LibrarySettings;
use crate::store::LibraryStore;
use crate::writer::{DEFAULT_SYNC_FRESHNESS_HOURS, LibraryWriter, SyncReport};
use async_trait::async_trait;
use chrono::{Duration, Utc};
use shuflowconfig::Config;
use shuflowqueue::Upstream;
use shuflowspotify::{DEFAULT_PAGE_LIMIT, RemoteCatalog};
use std::sync::Arc;
use tracing::{debug, info};

/// Tunables of a [`LibraryManager`]
#[derive(Debug, Clone)]
pub struct LibraryOptions {
    pub page_limit: u32,
    pub sync_freshness: Duration,
    pub max_retries: usize,
    /// Seed of the selection draws; random when unset
    pub seed: Option<u64>,
}

impl Default for LibraryOptions {
    fn default() -> Self {
        Self {
            page_limit: DEFAULT_PAGE_LIMIT,
            sync_freshness: Duration::hours(DEFAULT_SYNC_FRESHNESS_HOURS),
            max_retries: DEFAULT_MAX_RETRIES,
            seed: None,
        }
    }
}

impl LibraryOptions {
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        Ok(Self {
            page_limit: config.get_page_size()? as u32,
            sync_freshness: Duration::hours(config.get_sync_freshness_hours()? as i64),
            max_retries: config.get_max_selection_retries()?,
            seed: None,
        })
    }
}

pub struct LibraryManager {
    store: Arc<dyn LibraryStore>,
    reader: LibraryReader,
    writer: LibraryWriter,
}

impl LibraryManager {
    pub fn new(
        store: Arc<dyn LibraryStore>,
        remote: Arc<dyn RemoteCatalog>,
        options: LibraryOptions,
    ) -> Self {
        let picker = match options.seed {
            Some(seed) => Picker::seeded(seed),
            None => Picker::new(),
        };
        let reader = LibraryReader::new(Arc::clone(&store), Arc::clone(&remote))
            .with_picker(picker)
            .with_page_limit(options.page_limit)
            .with_max_retries(options.max_retries);
        let writer = LibraryWriter::new(Arc::clone(&store), remote)
            .with_page_limit(options.page_limit)
            .with_freshness(options.sync_freshness);

        Self {
            store,
            reader,
            writer,
        }
    }

    /// Draw the next item to play, `None` when nothing is playable
    pub async fn next(&self) -> Result<Option<PlayerItem>> {
        let settings = self.store.settings().await?;
        let counts = self.store.counts().await?;
        self.reader.next_item(&settings, &counts).await
    }

    /// Sync when forced or when the last sync is stale.
    ///
    /// Returns `None` when the sync was skipped.
    pub async fn sync(&self, force: bool) -> Result<Option<SyncReport>> {
        let settings = self.store.settings().await?;
        if !force && !self.writer.needs_sync(&settings, Utc::now()) {
            debug!("Library is fresh, skipping sync");
            return Ok(None);
        }
        let report = self.writer.sync(&settings).await?;
        info!(
            "Sync finished ({:?}, {} new records)",
            report.outcome,
            report.inserted()
        );
        Ok(Some(report))
    }

    /// Drop the mirror and rebuild it from the remote library
    pub async fn reset(&self) -> Result<Option<SyncReport>> {
        self.writer.clear().await?;
        self.sync(true).await
    }

    /// Remove every local record and the settings row
    pub async fn delete(&self) -> Result<()> {
        self.store.drop_all().await?;
        info!("Library deleted");
        Ok(())
    }

    /// Stop the reader and the writer, waiting for their current work
    pub async fn stop(&self) {
        tokio::join!(self.reader.stop(), self.writer.stop());
    }

    pub async fn counts(&self) -> Result<LocalCounts> {
        self.store.counts().await
    }

    pub async fn settings(&self) -> Result<LibrarySettings> {
        self.store.settings().await
    }

    pub async fn set_category_enabled(
        &self,
        category: Category,
        enabled: bool,
    ) -> Result<LibrarySettings> {
        self.store.set_category_enabled(category, enabled).await
    }

    /// Exclude a record from (or return it to) the selection pool
    pub async fn set_record_active(&self, category: Category, id: i64, active: bool) -> Result<bool> {
        self.store.set_active(category, id, active).await
    }
}

#[async_trait]
impl Upstream for LibraryManager {
    type Item = PlayerItem;

    async fn next_item(&self) -> anyhow::Result<Option<PlayerItem>> {
        Ok(self.next().await?)
    }
}
