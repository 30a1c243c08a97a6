//! Database initialization against real files

use jukebox_common::db::{init_database, load_or_init_jwt_secret};
use tempfile::TempDir;

#[tokio::test]
async fn test_database_creation_when_missing() {
    let temp = TempDir::new().unwrap();
    let db_path = temp.path().join("sub").join("jukebox.db");

    let pool = init_database(&db_path).await;
    assert!(pool.is_ok(), "Database initialization failed: {:?}", pool.err());
    assert!(db_path.exists(), "Database file was not created");
}

#[tokio::test]
async fn test_database_opens_existing() {
    let temp = TempDir::new().unwrap();
    let db_path = temp.path().join("jukebox.db");

    let pool1 = init_database(&db_path).await.unwrap();
    pool1.close().await;

    let pool2 = init_database(&db_path).await;
    assert!(pool2.is_ok(), "Failed to open existing database: {:?}", pool2.err());
}

#[tokio::test]
async fn test_jwt_secret_survives_reopen() {
    let temp = TempDir::new().unwrap();
    let db_path = temp.path().join("jukebox.db");

    let pool = init_database(&db_path).await.unwrap();
    let secret = load_or_init_jwt_secret(&pool).await.unwrap();
    pool.close().await;

    let pool = init_database(&db_path).await.unwrap();
    assert_eq!(load_or_init_jwt_secret(&pool).await.unwrap(), secret);
}

#[tokio::test]
async fn test_foreign_keys_enabled_on_every_connection() {
    let temp = TempDir::new().unwrap();
    let pool = init_database(&temp.path().join("jukebox.db")).await.unwrap();

    for _ in 0..3 {
        let mut conn = pool.acquire().await.unwrap();
        let enabled: i64 = sqlx::query_scalar("PRAGMA foreign_keys")
            .fetch_one(&mut *conn)
            .await
            .unwrap();
        assert_eq!(enabled, 1);
    }
}
