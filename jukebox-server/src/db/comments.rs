//! `comments` table queries

use jukebox_common::models::Comment;
use sqlx::SqlitePool;

pub async fn insert(
    db: &SqlitePool,
    id: &str,
    song_id: &str,
    author_id: &str,
    content: &str,
    rating: Option<i64>,
    now: &str,
) -> sqlx::Result<()> {
    sqlx::query(
        r#"
        INSERT INTO comments (id, song_id, author_id, content, rating, is_flagged, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, 0, ?, ?)
        "#,
    )
    .bind(id)
    .bind(song_id)
    .bind(author_id)
    .bind(content)
    .bind(rating)
    .bind(now)
    .bind(now)
    .execute(db)
    .await?;
    Ok(())
}

pub async fn find_by_id(db: &SqlitePool, id: &str) -> sqlx::Result<Option<Comment>> {
    sqlx::query_as("SELECT * FROM comments WHERE id = ?")
        .bind(id)
        .fetch_optional(db)
        .await
}

/// Comments on a song, oldest first
pub async fn for_song(db: &SqlitePool, song_id: &str) -> sqlx::Result<Vec<Comment>> {
    sqlx::query_as("SELECT * FROM comments WHERE song_id = ? ORDER BY created_at, rowid")
        .bind(song_id)
        .fetch_all(db)
        .await
}

pub async fn update(
    db: &SqlitePool,
    id: &str,
    content: Option<&str>,
    rating: Option<i64>,
    now: &str,
) -> sqlx::Result<()> {
    sqlx::query(
        r#"
        UPDATE comments SET
            content = COALESCE(?, content),
            rating = COALESCE(?, rating),
            updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(content)
    .bind(rating)
    .bind(now)
    .bind(id)
    .execute(db)
    .await?;
    Ok(())
}

pub async fn set_flagged(db: &SqlitePool, id: &str) -> sqlx::Result<()> {
    sqlx::query("UPDATE comments SET is_flagged = 1 WHERE id = ?")
        .bind(id)
        .execute(db)
        .await?;
    Ok(())
}

pub async fn delete(db: &SqlitePool, id: &str) -> sqlx::Result<bool> {
    let result = sqlx::query("DELETE FROM comments WHERE id = ?")
        .bind(id)
        .execute(db)
        .await?;
    Ok(result.rows_affected() > 0)
}
