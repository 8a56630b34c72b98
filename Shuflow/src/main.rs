use anyhow::Context;
use shuflowconfig::Config;
use shuflowlibrary::{LibraryManager, LibraryOptions, open_store};
use shuflowqueue::LookaheadQueue;
use shuflowspotify::SpotifyApi;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Répertoire de configuration optionnel en premier argument
    let config_dir = std::env::args().nth(1).unwrap_or_default();
    let config = Config::load_config(&config_dir)?;

    // RUST_LOG reste prioritaire sur le niveau configuré
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.get_log_min_level()));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    // ========== PHASE 1 : Bibliothèque locale ==========
    let database = config.get_library_database_path()?;
    info!("📚 Opening library at {}", database.display());
    let store = open_store(&database).context("cannot open the library database")?;

    let remote = Arc::new(SpotifyApi::from_config(&config)?);
    let options = LibraryOptions::from_config(&config)?;
    let manager = Arc::new(LibraryManager::new(store, remote, options));

    // ========== PHASE 2 : Synchronisation ==========
    info!("🔄 Checking library freshness...");
    match manager.sync(false).await {
        Ok(Some(report)) => info!(
            "✅ Sync {:?}: {} new records",
            report.outcome,
            report.inserted()
        ),
        Ok(None) => info!("✅ Library is up to date"),
        Err(e) => warn!("⚠️ Sync failed: {}", e),
    }

    let counts = manager.counts().await?;
    info!(
        "🎵 {} albums, {} artists, {} playlists, {} tracks",
        counts.albums, counts.artists, counts.playlists, counts.tracks
    );

    // ========== PHASE 3 : File de lecture ==========
    let queue = LookaheadQueue::new(manager.clone(), config.get_queue_lookahead()?);
    queue.prime();

    for position in 1..=queue.lookahead().max(1) {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted");
                break;
            }
            next = queue.next() => match next {
                Ok(Some(item)) => {
                    let artists: Vec<&str> =
                        item.track.artists.iter().map(|a| a.name.as_str()).collect();
                    println!(
                        "{:>2}. {} - {} [{}]",
                        position,
                        artists.join(", "),
                        item.track.name,
                        item.source()
                    );
                }
                Ok(None) => {
                    info!("Nothing left to play");
                    break;
                }
                Err(e) => {
                    warn!("⚠️ Failed to fetch the next track: {}", e);
                    break;
                }
            }
        }
    }

    queue.stop().await;
    manager.stop().await;
    Ok(())
}
