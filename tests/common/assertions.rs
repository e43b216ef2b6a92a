//! Custom test assertions for E2E tests

use std::io::{Cursor, Read};
use std::path::Path;
use soundcloud_dl::Event;
use tokio::sync::broadcast::Receiver;

/// Every event buffered on `rx` so far
pub fn drain_events(rx: &mut Receiver<Event>) -> Vec<Event> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

/// Progress messages among `events`, in order
pub fn progress_messages(events: &[Event]) -> Vec<String> {
    events
        .iter()
        .filter_map(|e| match e {
            Event::Progress { message, .. } => Some(message.clone()),
            _ => None,
        })
        .collect()
}

/// Open the archive at `path` with a standard reader and return its entries in order
pub fn read_zip_entries(path: &Path) -> Vec<(String, Vec<u8>)> {
    let bytes = std::fs::read(path).unwrap();
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();

    (0..archive.len())
        .map(|i| {
            let mut file = archive.by_index(i).unwrap();
            assert_eq!(file.compression(), zip::CompressionMethod::Stored);
            let mut data = Vec::new();
            file.read_to_end(&mut data).unwrap();
            (file.name().to_string(), data)
        })
        .collect()
}
