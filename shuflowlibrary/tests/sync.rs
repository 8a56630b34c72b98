mod common;

use chrono::{Duration, Utc};
use common::*;
use shuflowlibrary::{
    Category, LibrarySettings, LibraryStore, LibraryWriter, MemoryLibraryStore, NewRecord,
    SqliteLibraryStore, SyncOutcome,
};
use std::sync::Arc;
use tempfile::TempDir;

fn only(category: Category) -> LibrarySettings {
    let mut settings = LibrarySettings::new(Utc::now());
    for other in Category::ALL {
        settings.set_enabled(other, other == category);
    }
    settings
}

async fn external_ids(store: &dyn LibraryStore, category: Category) -> Vec<String> {
    let count = store.count_active(category).await.unwrap();
    let mut ids = Vec::new();
    for offset in 0..count {
        let record = store
            .active_record_at(category, offset)
            .await
            .unwrap()
            .unwrap();
        ids.push(record.external_id);
    }
    ids.sort();
    ids
}

#[tokio::test]
async fn test_sync_stops_at_first_known_record() {
    let store = Arc::new(MemoryLibraryStore::new());
    store
        .insert_missing(
            Category::Tracks,
            vec![NewRecord::new("A", "A"), NewRecord::new("B", "B")],
        )
        .await
        .unwrap();

    let remote = Arc::new(FakeCatalog::default());
    *remote.saved_tracks.lock().unwrap() = ["C", "D", "B", "E", "F", "G"]
        .into_iter()
        .map(saved_track)
        .collect();

    let writer = LibraryWriter::new(store.clone(), remote.clone()).with_page_limit(2);
    let report = writer.sync(&only(Category::Tracks)).await.unwrap();

    assert_eq!(report.outcome, SyncOutcome::Synced);
    assert_eq!(
        external_ids(store.as_ref(), Category::Tracks).await,
        vec!["A", "B", "C", "D"]
    );
    assert_eq!(remote.calls(), vec!["saved_tracks:0", "saved_tracks:2"]);

    let tracks = &report.categories[0];
    assert_eq!(tracks.inserted, 2);
    assert_eq!(tracks.pages, 2);
    assert!(tracks.stopped_early);
    assert!(store.settings().await.unwrap().synced_at.is_some());
}

#[tokio::test]
async fn test_first_sync_mirrors_every_category() {
    let store = Arc::new(MemoryLibraryStore::new());
    let remote = Arc::new(FakeCatalog::default());
    *remote.saved_albums.lock().unwrap() = vec![saved_album("al1"), saved_album("al2")];
    *remote.followed_artists.lock().unwrap() = vec![artist("ar1")];
    *remote.playlists.lock().unwrap() = vec![playlist("p1", 12), playlist("empty", 0)];
    *remote.saved_tracks.lock().unwrap() =
        ["t1", "t2", "t3", "t4", "t5"].into_iter().map(saved_track).collect();

    let writer = LibraryWriter::new(store.clone(), remote.clone()).with_page_limit(2);
    let report = writer
        .sync(&LibrarySettings::new(Utc::now()))
        .await
        .unwrap();

    assert_eq!(report.outcome, SyncOutcome::Synced);
    assert_eq!(report.inserted(), 9);

    let counts = store.counts().await.unwrap();
    assert_eq!(counts.albums, 2);
    assert_eq!(counts.artists, 1);
    assert_eq!(counts.playlists, 1);
    assert_eq!(counts.tracks, 5);
    assert_eq!(
        external_ids(store.as_ref(), Category::Playlists).await,
        vec!["p1"]
    );
    assert_eq!(remote.count_calls("saved_tracks"), 3);
}

#[tokio::test]
async fn test_disabled_categories_are_not_fetched() {
    let store = Arc::new(MemoryLibraryStore::new());
    let remote = Arc::new(FakeCatalog::default());
    *remote.saved_albums.lock().unwrap() = vec![saved_album("al1")];

    let writer = LibraryWriter::new(store.clone(), remote.clone());
    writer.sync(&only(Category::Artists)).await.unwrap();

    assert_eq!(remote.count_calls("saved_albums"), 0);
    assert_eq!(remote.count_calls("followed_artists"), 1);
    assert_eq!(store.count_active(Category::Albums).await.unwrap(), 0);
}

#[tokio::test]
async fn test_failed_category_clears_everything() {
    let store = Arc::new(MemoryLibraryStore::new());
    store
        .insert_missing(Category::Artists, vec![NewRecord::new("old", "Old")])
        .await
        .unwrap();
    store.update_synced_at(Some(Utc::now())).await.unwrap();

    let remote = Arc::new(FakeCatalog::default());
    *remote.saved_tracks.lock().unwrap() = vec![saved_track("t1")];
    remote.fail("saved_albums");

    let writer = LibraryWriter::new(store.clone(), remote.clone());
    let report = writer
        .sync(&LibrarySettings::new(Utc::now()))
        .await
        .unwrap();

    assert_eq!(report.outcome, SyncOutcome::Cleared);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].0, Category::Albums);
    assert_eq!(store.counts().await.unwrap().total(), 0);
    assert!(store.settings().await.unwrap().synced_at.is_none());
}

#[tokio::test]
async fn test_interrupted_sync_resumes_with_new_records_only() {
    // Records written by a run that died before stamping the timestamp
    let store = Arc::new(MemoryLibraryStore::new());
    store
        .insert_missing(
            Category::Albums,
            vec![NewRecord::new("al1", "One"), NewRecord::new("al2", "Two")],
        )
        .await
        .unwrap();

    let remote = Arc::new(FakeCatalog::default());
    *remote.saved_albums.lock().unwrap() = ["new", "al1", "al2"]
        .into_iter()
        .map(saved_album)
        .collect();

    let writer = LibraryWriter::new(store.clone(), remote.clone()).with_page_limit(2);
    let settings = store.settings().await.unwrap();
    assert!(writer.needs_sync(&settings, Utc::now()));

    let report = writer.sync(&only(Category::Albums)).await.unwrap();

    assert_eq!(report.inserted(), 1);
    assert_eq!(remote.count_calls("saved_albums"), 1);
    assert_eq!(
        external_ids(store.as_ref(), Category::Albums).await,
        vec!["al1", "al2", "new"]
    );

    let settings = store.settings().await.unwrap();
    assert!(!writer.needs_sync(&settings, Utc::now()));
    assert!(writer.needs_sync(&settings, Utc::now() + Duration::hours(25)));
}

#[tokio::test]
async fn test_stopped_writer_leaves_timestamp_untouched() {
    let store = Arc::new(MemoryLibraryStore::new());
    let remote = Arc::new(FakeCatalog::default());
    *remote.saved_tracks.lock().unwrap() = vec![saved_track("t1")];

    let writer = LibraryWriter::new(store.clone(), remote.clone());
    writer.stop().await;
    let report = writer.sync(&only(Category::Tracks)).await.unwrap();

    assert_eq!(report.outcome, SyncOutcome::Stopped);
    assert!(report.categories[0].interrupted);
    assert!(remote.calls().is_empty());
    assert!(store.settings().await.unwrap().synced_at.is_none());
}

#[tokio::test]
async fn test_sync_into_sqlite_store() {
    let dir = TempDir::new().unwrap();
    let store = Arc::new(SqliteLibraryStore::new(dir.path().join("library.db")).unwrap());
    let remote = Arc::new(FakeCatalog::default());
    *remote.followed_artists.lock().unwrap() =
        ["ar1", "ar2", "ar3"].into_iter().map(artist).collect();

    let writer = LibraryWriter::new(store.clone(), remote.clone()).with_page_limit(2);
    writer.sync(&only(Category::Artists)).await.unwrap();
    assert_eq!(store.count_active(Category::Artists).await.unwrap(), 3);

    // A second run sees the newest record as known on the first page
    remote.calls.lock().unwrap().clear();
    let report = writer.sync(&only(Category::Artists)).await.unwrap();
    assert_eq!(report.inserted(), 0);
    assert_eq!(remote.calls(), vec!["followed_artists:0"]);
}
