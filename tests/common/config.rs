//! Test configuration helpers for creating downloaders against a mock server

use std::time::Duration;
use tempfile::TempDir;
use soundcloud_dl::{Config, Downloader};
use wiremock::MockServer;

/// Config pointing every endpoint at `server`, with files under `temp_dir`
///
/// No client id is preconfigured; pass one to skip page extraction.
pub fn mock_config(server: &MockServer, temp_dir: &TempDir, client_id: Option<&str>) -> Config {
    let mut config = Config::default();
    config.api.base_url = server.uri();
    config.credentials.page_url = format!("{}/page", server.uri());
    config.credentials.bundle_host = "127.0.0.1".to_string();
    config.credentials.client_id = client_id.map(str::to_string);
    config.batch.pacing_delay = Duration::ZERO;
    config.http.timeout = Duration::from_secs(5);
    config.output.download_dir = temp_dir.path().join("downloads");
    config.persistence.database_path = temp_dir.path().join("state.db");
    config
}

/// Downloader with the real HTTP transport and SQLite persistence, talking to `server`
pub async fn create_mock_downloader(
    server: &MockServer,
    client_id: Option<&str>,
) -> (Downloader, TempDir) {
    let temp_dir = tempfile::tempdir().unwrap();
    let config = mock_config(server, &temp_dir, client_id);
    let downloader = Downloader::new(config).await.unwrap();
    (downloader, temp_dir)
}
