use super::LibraryStore;
use crate::error::Result;
use crate::record::{Category, LibraryRecord, LocalCounts, NewRecord};
use crate::settings::LibrarySettings;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};
use tokio::sync::Mutex;

#[derive(Debug, Default)]
struct Table {
    /// Ordered by id
    records: Vec<LibraryRecord>,
    next_id: i64,
}

#[derive(Debug, Default)]
struct State {
    tables: HashMap<Category, Table>,
    settings: Option<LibrarySettings>,
}

impl State {
    fn table(&mut self, category: Category) -> &mut Table {
        self.tables.entry(category).or_default()
    }

    fn settings(&mut self) -> &mut LibrarySettings {
        self.settings
            .get_or_insert_with(|| LibrarySettings::new(Utc::now()))
    }
}

/// Volatile store, lost when dropped.
#[derive(Debug, Default)]
pub struct MemoryLibraryStore {
    state: Mutex<State>,
}

impl MemoryLibraryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LibraryStore for MemoryLibraryStore {
    async fn count_active(&self, category: Category) -> Result<u64> {
        let mut state = self.state.lock().await;
        let count = state
            .table(category)
            .records
            .iter()
            .filter(|r| r.active)
            .count();
        Ok(count as u64)
    }

    async fn active_record_at(
        &self,
        category: Category,
        offset: u64,
    ) -> Result<Option<LibraryRecord>> {
        let mut state = self.state.lock().await;
        let record = state
            .table(category)
            .records
            .iter()
            .filter(|r| r.active)
            .nth(offset as usize)
            .cloned();
        Ok(record)
    }

    async fn get(&self, category: Category, id: i64) -> Result<Option<LibraryRecord>> {
        let mut state = self.state.lock().await;
        let record = state
            .table(category)
            .records
            .iter()
            .find(|r| r.id == id)
            .cloned();
        Ok(record)
    }

    async fn existing_external_ids(
        &self,
        category: Category,
        external_ids: Vec<String>,
    ) -> Result<HashSet<String>> {
        let mut state = self.state.lock().await;
        let table = state.table(category);
        Ok(external_ids
            .into_iter()
            .filter(|id| table.records.iter().any(|r| &r.external_id == id))
            .collect())
    }

    async fn insert_missing(&self, category: Category, records: Vec<NewRecord>) -> Result<usize> {
        let mut state = self.state.lock().await;
        let table = state.table(category);
        let mut inserted = 0;
        for record in records {
            if table
                .records
                .iter()
                .any(|r| r.external_id == record.external_id)
            {
                continue;
            }
            table.next_id += 1;
            table.records.push(LibraryRecord {
                id: table.next_id,
                category,
                external_id: record.external_id,
                active: true,
                name: record.name,
            });
            inserted += 1;
        }
        Ok(inserted)
    }

    async fn set_active(&self, category: Category, id: i64, active: bool) -> Result<bool> {
        let mut state = self.state.lock().await;
        match state.table(category).records.iter_mut().find(|r| r.id == id) {
            Some(record) => {
                record.active = active;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn clear(&self, category: Category) -> Result<()> {
        let mut state = self.state.lock().await;
        state.table(category).records.clear();
        Ok(())
    }

    async fn settings(&self) -> Result<LibrarySettings> {
        let mut state = self.state.lock().await;
        Ok(state.settings().clone())
    }

    async fn update_synced_at(&self, at: Option<DateTime<Utc>>) -> Result<()> {
        let mut state = self.state.lock().await;
        state.settings().synced_at = at;
        Ok(())
    }

    async fn set_category_enabled(
        &self,
        category: Category,
        enabled: bool,
    ) -> Result<LibrarySettings> {
        let mut state = self.state.lock().await;
        let settings = state.settings();
        settings.set_enabled(category, enabled);
        Ok(settings.clone())
    }

    async fn drop_all(&self) -> Result<()> {
        let mut state = self.state.lock().await;
        *state = State::default();
        Ok(())
    }

    async fn counts(&self) -> Result<LocalCounts> {
        let mut state = self.state.lock().await;
        let mut counts = LocalCounts::default();
        for category in Category::ALL {
            let active = state
                .table(category)
                .records
                .iter()
                .filter(|r| r.active)
                .count();
            counts.set(category, active as u64);
        }
        Ok(counts)
    }
}
