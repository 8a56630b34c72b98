use super::LibraryStore;
use crate::error::{LibraryError, Result};
use crate::record::{Category, LibraryRecord, NewRecord};
use crate::settings::LibrarySettings;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, params, params_from_iter};
use std::collections::HashSet;
use std::path::Path;
use std::sync::{Arc, Mutex as StdMutex};
use tokio::task::spawn_blocking;
use tracing::debug;

/// Bumped whenever the schema changes incompatibly
const SCHEMA_VERSION: i64 = 1;

const SETTINGS_COLUMNS: &str =
    "use_albums, use_artists, use_playlists, use_tracks, created_at_ms, synced_at_ms";

pub struct SqliteLibraryStore {
    conn: Arc<StdMutex<Connection>>,
}

impl SqliteLibraryStore {
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                LibraryError::Store(format!("cannot create {}: {}", parent.display(), e))
            })?;
        }

        let conn = Connection::open(path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        Self::init(conn)
    }

    /// Store backed by a private in-memory database
    pub fn in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        let mut schema = String::new();
        for category in Category::ALL {
            let table = category.table();
            schema.push_str(&format!(
                "CREATE TABLE IF NOT EXISTS {table} (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    external_id TEXT NOT NULL UNIQUE,
                    active INTEGER NOT NULL DEFAULT 1,
                    name TEXT NOT NULL
                );
                CREATE INDEX IF NOT EXISTS idx_{table}_active ON {table}(active);"
            ));
        }
        schema.push_str(
            "CREATE TABLE IF NOT EXISTS settings (
                id INTEGER PRIMARY KEY CHECK (id = 1),
                use_albums INTEGER NOT NULL,
                use_artists INTEGER NOT NULL,
                use_playlists INTEGER NOT NULL,
                use_tracks INTEGER NOT NULL,
                created_at_ms INTEGER NOT NULL,
                synced_at_ms INTEGER
            );",
        );
        conn.execute_batch(&schema)?;
        conn.pragma_update(None, "user_version", SCHEMA_VERSION)?;

        Ok(Self {
            conn: Arc::new(StdMutex::new(conn)),
        })
    }

    /// Run `f` on the blocking pool with the connection locked
    async fn with_conn<T, F>(&self, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        spawn_blocking(move || {
            let mut guard = conn
                .lock()
                .map_err(|_| LibraryError::Store("connection lock poisoned".into()))?;
            f(&mut guard)
        })
        .await?
    }
}

fn record_from_row(category: Category, row: &rusqlite::Row<'_>) -> rusqlite::Result<LibraryRecord> {
    Ok(LibraryRecord {
        id: row.get(0)?,
        category,
        external_id: row.get(1)?,
        active: row.get(2)?,
        name: row.get(3)?,
    })
}

fn timestamp(ms: i64) -> Result<DateTime<Utc>> {
    DateTime::<Utc>::from_timestamp_millis(ms)
        .ok_or_else(|| LibraryError::Store(format!("invalid timestamp {ms} in settings")))
}

fn load_settings(conn: &Connection) -> Result<Option<LibrarySettings>> {
    let row = conn
        .query_row(
            &format!("SELECT {SETTINGS_COLUMNS} FROM settings WHERE id = 1"),
            [],
            |row| {
                Ok((
                    row.get::<_, bool>(0)?,
                    row.get::<_, bool>(1)?,
                    row.get::<_, bool>(2)?,
                    row.get::<_, bool>(3)?,
                    row.get::<_, i64>(4)?,
                    row.get::<_, Option<i64>>(5)?,
                ))
            },
        )
        .optional()?;

    row.map(
        |(use_albums, use_artists, use_playlists, use_tracks, created_at_ms, synced_at_ms)| {
            Ok(LibrarySettings {
                use_albums,
                use_artists,
                use_playlists,
                use_tracks,
                created_at: timestamp(created_at_ms)?,
                synced_at: synced_at_ms.map(timestamp).transpose()?,
            })
        },
    )
    .transpose()
}

fn save_settings(conn: &Connection, settings: &LibrarySettings) -> Result<()> {
    conn.execute(
        &format!(
            "INSERT OR REPLACE INTO settings (id, {SETTINGS_COLUMNS}) VALUES (1, ?1, ?2, ?3, ?4, ?5, ?6)"
        ),
        params![
            settings.use_albums,
            settings.use_artists,
            settings.use_playlists,
            settings.use_tracks,
            settings.created_at.timestamp_millis(),
            settings.synced_at.map(|at| at.timestamp_millis()),
        ],
    )?;
    Ok(())
}

fn settings_or_default(conn: &Connection) -> Result<LibrarySettings> {
    if let Some(settings) = load_settings(conn)? {
        return Ok(settings);
    }
    // Stored at millisecond precision
    let settings = LibrarySettings::new(timestamp(Utc::now().timestamp_millis())?);
    save_settings(conn, &settings)?;
    debug!("Created library settings row");
    Ok(settings)
}

#[async_trait]
impl LibraryStore for SqliteLibraryStore {
    async fn count_active(&self, category: Category) -> Result<u64> {
        self.with_conn(move |conn| {
            let count: i64 = conn.query_row(
                &format!("SELECT COUNT(*) FROM {} WHERE active = 1", category.table()),
                [],
                |row| row.get(0),
            )?;
            Ok(count as u64)
        })
        .await
    }

    async fn active_record_at(
        &self,
        category: Category,
        offset: u64,
    ) -> Result<Option<LibraryRecord>> {
        self.with_conn(move |conn| {
            let record = conn
                .query_row(
                    &format!(
                        "SELECT id, external_id, active, name FROM {}
                         WHERE active = 1 ORDER BY id LIMIT 1 OFFSET ?1",
                        category.table()
                    ),
                    [offset as i64],
                    |row| record_from_row(category, row),
                )
                .optional()?;
            Ok(record)
        })
        .await
    }

    async fn get(&self, category: Category, id: i64) -> Result<Option<LibraryRecord>> {
        self.with_conn(move |conn| {
            let record = conn
                .query_row(
                    &format!(
                        "SELECT id, external_id, active, name FROM {} WHERE id = ?1",
                        category.table()
                    ),
                    [id],
                    |row| record_from_row(category, row),
                )
                .optional()?;
            Ok(record)
        })
        .await
    }

    async fn existing_external_ids(
        &self,
        category: Category,
        external_ids: Vec<String>,
    ) -> Result<HashSet<String>> {
        if external_ids.is_empty() {
            return Ok(HashSet::new());
        }
        self.with_conn(move |conn| {
            let placeholders = vec!["?"; external_ids.len()].join(", ");
            let mut stmt = conn.prepare(&format!(
                "SELECT external_id FROM {} WHERE external_id IN ({placeholders})",
                category.table()
            ))?;
            let found = stmt
                .query_map(params_from_iter(external_ids.iter()), |row| row.get(0))?
                .collect::<rusqlite::Result<HashSet<String>>>()?;
            Ok(found)
        })
        .await
    }

    async fn insert_missing(&self, category: Category, records: Vec<NewRecord>) -> Result<usize> {
        if records.is_empty() {
            return Ok(0);
        }
        self.with_conn(move |conn| {
            let tx = conn.transaction()?;
            let mut inserted = 0;
            {
                let mut stmt = tx.prepare(&format!(
                    "INSERT OR IGNORE INTO {} (external_id, active, name) VALUES (?1, 1, ?2)",
                    category.table()
                ))?;
                for record in &records {
                    inserted += stmt.execute(params![record.external_id, record.name])?;
                }
            }
            tx.commit()?;
            Ok(inserted)
        })
        .await
    }

    async fn set_active(&self, category: Category, id: i64, active: bool) -> Result<bool> {
        self.with_conn(move |conn| {
            let changed = conn.execute(
                &format!("UPDATE {} SET active = ?1 WHERE id = ?2", category.table()),
                params![active, id],
            )?;
            Ok(changed > 0)
        })
        .await
    }

    async fn clear(&self, category: Category) -> Result<()> {
        self.with_conn(move |conn| {
            conn.execute(&format!("DELETE FROM {}", category.table()), [])?;
            Ok(())
        })
        .await
    }

    async fn settings(&self) -> Result<LibrarySettings> {
        self.with_conn(|conn| settings_or_default(conn)).await
    }

    async fn update_synced_at(&self, at: Option<DateTime<Utc>>) -> Result<()> {
        self.with_conn(move |conn| {
            let mut settings = settings_or_default(conn)?;
            settings.synced_at = at;
            save_settings(conn, &settings)
        })
        .await
    }

    async fn set_category_enabled(
        &self,
        category: Category,
        enabled: bool,
    ) -> Result<LibrarySettings> {
        self.with_conn(move |conn| {
            let mut settings = settings_or_default(conn)?;
            settings.set_enabled(category, enabled);
            save_settings(conn, &settings)?;
            Ok(settings)
        })
        .await
    }

    async fn drop_all(&self) -> Result<()> {
        self.with_conn(|conn| {
            let tx = conn.transaction()?;
            for category in Category::ALL {
                tx.execute(&format!("DELETE FROM {}", category.table()), [])?;
            }
            tx.execute("DELETE FROM settings", [])?;
            tx.execute("DELETE FROM sqlite_sequence", [])?;
            tx.commit()?;
            Ok(())
        })
        .await
    }
}
