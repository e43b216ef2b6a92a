//! Runtime key-value state (cached access id and timestamp).

use crate::credentials::CredentialPersistence;
use crate::error::DatabaseError;
use crate::{Error, Result};
use async_trait::async_trait;

use super::Database;

impl Database {
    /// Value stored under `key` in `runtime_state`
    pub async fn get_state(&self, key: &str) -> Result<Option<String>> {
        sqlx::query_scalar(
            r#"
            SELECT value FROM runtime_state WHERE key = ?
            "#,
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            Error::Database(DatabaseError::QueryFailed(format!(
                "Failed to read runtime state '{}': {}",
                key, e
            )))
        })
    }

    /// Insert or replace the value stored under `key`
    pub async fn set_state(&self, key: &str, value: &str) -> Result<()> {
        let now = chrono::Utc::now().timestamp();
        sqlx::query(
            r#"
            INSERT INTO runtime_state (key, value, updated_at)
            VALUES (?, ?, ?)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
            "#,
        )
        .bind(key)
        .bind(value)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            Error::Database(DatabaseError::QueryFailed(format!(
                "Failed to write runtime state '{}': {}",
                key, e
            )))
        })?;

        Ok(())
    }
}

#[async_trait]
impl CredentialPersistence for Database {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        self.get_state(key).await
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.set_state(key, value).await
    }
}
