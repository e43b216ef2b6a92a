//! Shared test helpers for creating Downloader instances in tests.

use crate::config::Config;
use crate::credentials::MemoryPersistence;
use crate::downloader::{DirectorySink, Downloader};
use crate::test_helpers::{FakeTransport, test_config};
use crate::types::Event;
use std::sync::Arc;
use tempfile::tempdir;

/// Helper to create a test Downloader over a scripted transport.
/// Returns the downloader and the tempdir its sink writes into (which must be kept alive).
pub(crate) fn create_test_downloader(
    transport: Arc<FakeTransport>,
) -> (Downloader, tempfile::TempDir) {
    create_test_downloader_with(test_config(), transport)
}

/// Same as [`create_test_downloader`] with a caller-tuned config
pub(crate) fn create_test_downloader_with(
    mut config: Config,
    transport: Arc<FakeTransport>,
) -> (Downloader, tempfile::TempDir) {
    let temp_dir = tempdir().unwrap();
    config.output.download_dir = temp_dir.path().join("downloads");
    config.persistence.database_path = temp_dir.path().join("test.db");

    let sink = DirectorySink::new(
        config.output.download_dir.clone(),
        config.output.file_collision,
    );
    let downloader = Downloader::with_parts(
        config,
        transport,
        Arc::new(MemoryPersistence::default()),
        Arc::new(sink),
    );
    (downloader, temp_dir)
}

/// Everything buffered on `rx` so far
pub(crate) fn drain_events(rx: &mut tokio::sync::broadcast::Receiver<Event>) -> Vec<Event> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

/// Messages of the `Progress` events in `events`
pub(crate) fn progress_messages(events: &[Event]) -> Vec<String> {
    events
        .iter()
        .filter_map(|e| match e {
            Event::Progress { message, .. } => Some(message.clone()),
            _ => None,
        })
        .collect()
}
