//! `song_likes` table queries

use jukebox_common::models::Song;
use sqlx::SqlitePool;

/// Record a like; returns false if it already existed
pub async fn insert(db: &SqlitePool, user_id: &str, song_id: &str, now: &str) -> sqlx::Result<bool> {
    let result =
        sqlx::query("INSERT OR IGNORE INTO song_likes (user_id, song_id, liked_at) VALUES (?, ?, ?)")
            .bind(user_id)
            .bind(song_id)
            .bind(now)
            .execute(db)
            .await?;
    Ok(result.rows_affected() == 1)
}

/// Remove a like; returns false if there was none
pub async fn delete(db: &SqlitePool, user_id: &str, song_id: &str) -> sqlx::Result<bool> {
    let result = sqlx::query("DELETE FROM song_likes WHERE user_id = ? AND song_id = ?")
        .bind(user_id)
        .bind(song_id)
        .execute(db)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn count_for_user(db: &SqlitePool, user_id: &str) -> sqlx::Result<i64> {
    sqlx::query_scalar("SELECT COUNT(*) FROM song_likes WHERE user_id = ?")
        .bind(user_id)
        .fetch_one(db)
        .await
}

/// Songs liked by a user, most recent like first
pub async fn liked_songs(
    db: &SqlitePool,
    user_id: &str,
    limit: i64,
    offset: i64,
) -> sqlx::Result<Vec<Song>> {
    sqlx::query_as(
        r#"
        SELECT s.* FROM song_likes l
        JOIN songs s ON s.id = l.song_id
        WHERE l.user_id = ?
        ORDER BY l.liked_at DESC, l.rowid DESC
        LIMIT ? OFFSET ?
        "#,
    )
    .bind(user_id)
    .bind(limit)
    .bind(offset)
    .fetch_all(db)
    .await
}
