//! Save sinks: where finished tracks and archives end up.

use crate::config::FileCollisionAction;
use crate::error::Result;
use crate::types::Artifact;
use crate::utils::get_unique_path;
use async_trait::async_trait;
use std::path::PathBuf;

/// Persists finished artifacts to user-visible storage
///
/// Failures are reported to the caller and never retried.
#[async_trait]
pub trait SaveSink: Send + Sync {
    /// Store `artifact` under (a variant of) its suggested file name and return
    /// where it went
    async fn save(&self, artifact: &Artifact) -> Result<PathBuf>;
}

/// Writes artifacts into one directory, applying a collision policy
#[derive(Clone, Debug)]
pub struct DirectorySink {
    dir: PathBuf,
    collision: FileCollisionAction,
}

impl DirectorySink {
    /// Sink writing into `dir`
    pub fn new(dir: PathBuf, collision: FileCollisionAction) -> Self {
        Self { dir, collision }
    }
}

#[async_trait]
impl SaveSink for DirectorySink {
    async fn save(&self, artifact: &Artifact) -> Result<PathBuf> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let path = get_unique_path(&self.dir.join(&artifact.filename), self.collision)?;
        tokio::fs::write(&path, &artifact.bytes).await?;

        tracing::info!(
            path = %path.display(),
            bytes = artifact.bytes.len(),
            "saved file"
        );
        Ok(path)
    }
}
