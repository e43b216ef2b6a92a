//! Key-value durability for the cached access id.

use crate::error::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::Mutex;

/// Simple key-value store that survives across sessions
///
/// [`Database`](crate::db::Database) implements this on its `runtime_state` table.
#[async_trait]
pub trait CredentialPersistence: Send + Sync {
    /// Stored value for `key`, if any
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, replacing any previous value
    async fn set(&self, key: &str, value: &str) -> Result<()>;
}

/// In-process persistence, lost when dropped
#[derive(Debug, Default)]
pub struct MemoryPersistence {
    values: Mutex<HashMap<String, String>>,
}

#[async_trait]
impl CredentialPersistence for MemoryPersistence {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.lock().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.values
            .lock()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}
