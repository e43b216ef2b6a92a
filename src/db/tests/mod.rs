use crate::credentials::{ACCESS_ID_KEY, CredentialPersistence, OBTAINED_AT_KEY};
use crate::db::*;
use tempfile::{NamedTempFile, TempDir};

#[tokio::test]
async fn test_missing_key_is_none() {
    let temp_file = NamedTempFile::new().unwrap();
    let db = Database::new(temp_file.path()).await.unwrap();

    assert_eq!(db.get_state("credential.access_id").await.unwrap(), None);

    db.close().await;
}

#[tokio::test]
async fn test_set_state_overwrites() {
    let temp_file = NamedTempFile::new().unwrap();
    let db = Database::new(temp_file.path()).await.unwrap();

    db.set_state("k", "first").await.unwrap();
    db.set_state("k", "second").await.unwrap();
    assert_eq!(db.get_state("k").await.unwrap().as_deref(), Some("second"));

    db.close().await;
}

#[tokio::test]
async fn test_state_survives_reopen() {
    let temp_file = NamedTempFile::new().unwrap();

    {
        let db = Database::new(temp_file.path()).await.unwrap();
        db.set(ACCESS_ID_KEY, "persistedId").await.unwrap();
        db.set(OBTAINED_AT_KEY, "1700000000000").await.unwrap();
        db.close().await;
    }

    // Reopening must not re-run the migration or lose values
    let db = Database::new(temp_file.path()).await.unwrap();
    assert_eq!(
        db.get(ACCESS_ID_KEY).await.unwrap().as_deref(),
        Some("persistedId")
    );
    assert_eq!(
        db.get(OBTAINED_AT_KEY).await.unwrap().as_deref(),
        Some("1700000000000")
    );
    db.close().await;
}

#[tokio::test]
async fn test_creates_parent_directory() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("state.db");

    let db = Database::new(&path).await.unwrap();
    db.set_state("k", "v").await.unwrap();
    db.close().await;

    assert!(path.exists());
}
