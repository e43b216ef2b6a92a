//! Download example
//!
//! This example demonstrates the core functionality of soundcloud-dl:
//! - Creating a downloader instance
//! - Subscribing to events
//! - Downloading a single track, or a playlist/likes page into one archive
//! - Cancelling a batch with Ctrl+C
//!
//! ```bash
//! cargo run --example download -- https://soundcloud.com/artist/track
//! cargo run --example download -- https://soundcloud.com/artist/sets/mix
//! cargo run --example download -- https://soundcloud.com/someone/likes
//! ```

use soundcloud_dl::config::Config;
use soundcloud_dl::{CollectionRef, Downloader, Event, TrackHints, cancel_on_shutdown_signal};
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing for logging (optional)
    // Uncomment if you add tracing-subscriber to your dependencies:
    // tracing_subscriber::fmt::init();

    let Some(url) = std::env::args().nth(1) else {
        eprintln!("usage: download <track | playlist | likes URL> [client_id]");
        std::process::exit(2);
    };

    let mut config = Config::default();
    config.output.download_dir = "downloads".into();
    // A client id copied from the browser's network tab skips page extraction
    config.credentials.client_id = std::env::args().nth(2);

    let downloader = Downloader::new(config).await?;

    // Subscribe to events
    let mut events = downloader.subscribe();
    tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            match event {
                Event::Progress { message, percent } => {
                    println!("[{:>3}%] {}", percent, message);
                }
                Event::TrackFailed {
                    index,
                    total,
                    track_id,
                    error,
                } => {
                    println!("✗ Skipped {}/{} (track {}): {}", index + 1, total, track_id, error);
                }
                Event::BatchFinished {
                    succeeded,
                    failed,
                    total,
                    cancelled,
                } => {
                    println!(
                        "Batch finished: {} ok, {} failed, {} total{}",
                        succeeded,
                        failed,
                        total,
                        if cancelled { " (cancelled)" } else { "" }
                    );
                }
            }
        }
    });

    let is_collection = url.contains("/sets/")
        || matches!(CollectionRef::parse(&url), Ok(CollectionRef::Likes { .. }));

    if is_collection {
        let cancel = CancellationToken::new();
        tokio::spawn(cancel_on_shutdown_signal(cancel.clone()));

        let (outcome, path) = downloader.download_collection(&url, cancel).await?;
        println!("✓ {} -> {}", outcome.summary(), path.display());
    } else {
        let path = downloader.download_track(&url, &TrackHints::default()).await?;
        println!("✓ Saved {}", path.display());
    }

    Ok(())
}
