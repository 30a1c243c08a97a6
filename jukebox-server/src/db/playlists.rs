//! `playlists` and `playlist_songs` queries
//!
//! Position-changing functions take a `SqliteConnection` so callers can run
//! them inside one transaction.

use jukebox_common::models::{Playlist, PlaylistEntry};
use sqlx::{SqliteConnection, SqlitePool};

pub async fn insert(
    conn: &mut SqliteConnection,
    id: &str,
    owner_id: &str,
    title: &str,
    description: Option<&str>,
    now: &str,
) -> sqlx::Result<()> {
    sqlx::query(
        r#"
        INSERT INTO playlists (id, title, description, owner_id, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(id)
    .bind(title)
    .bind(description)
    .bind(owner_id)
    .bind(now)
    .bind(now)
    .execute(conn)
    .await?;

    Ok(())
}

pub async fn find_by_id(db: &SqlitePool, id: &str) -> sqlx::Result<Option<Playlist>> {
    sqlx::query_as("SELECT * FROM playlists WHERE id = ?")
        .bind(id)
        .fetch_optional(db)
        .await
}

/// A user's playlists, newest first
pub async fn list_by_owner(db: &SqlitePool, owner_id: &str) -> sqlx::Result<Vec<Playlist>> {
    sqlx::query_as("SELECT * FROM playlists WHERE owner_id = ? ORDER BY created_at DESC, rowid DESC")
        .bind(owner_id)
        .fetch_all(db)
        .await
}

/// Title substring match, ASCII case-insensitive
pub async fn search_by_title(db: &SqlitePool, q: &str, limit: i64) -> sqlx::Result<Vec<Playlist>> {
    sqlx::query_as(
        "SELECT * FROM playlists WHERE instr(lower(title), lower(?)) > 0 ORDER BY created_at DESC LIMIT ?",
    )
    .bind(q)
    .bind(limit)
    .fetch_all(db)
    .await
}

/// Delete a playlist; cascades to its entries
pub async fn delete(db: &SqlitePool, id: &str) -> sqlx::Result<bool> {
    let result = sqlx::query("DELETE FROM playlists WHERE id = ?")
        .bind(id)
        .execute(db)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn touch(conn: &mut SqliteConnection, id: &str, now: &str) -> sqlx::Result<()> {
    sqlx::query("UPDATE playlists SET updated_at = ? WHERE id = ?")
        .bind(now)
        .bind(id)
        .execute(conn)
        .await?;
    Ok(())
}

/// Songs of a playlist ordered by position
pub async fn entries(db: &SqlitePool, playlist_id: &str) -> sqlx::Result<Vec<PlaylistEntry>> {
    sqlx::query_as(
        r#"
        SELECT ps.position, ps.added_at, s.*
        FROM playlist_songs ps
        JOIN songs s ON s.id = ps.song_id
        WHERE ps.playlist_id = ?
        ORDER BY ps.position
        "#,
    )
    .bind(playlist_id)
    .fetch_all(db)
    .await
}

/// Song ids of a playlist ordered by position
pub async fn song_ids(conn: &mut SqliteConnection, playlist_id: &str) -> sqlx::Result<Vec<String>> {
    sqlx::query_scalar("SELECT song_id FROM playlist_songs WHERE playlist_id = ? ORDER BY position")
        .bind(playlist_id)
        .fetch_all(conn)
        .await
}

/// Playlists that contain a song
pub async fn containing_song(conn: &mut SqliteConnection, song_id: &str) -> sqlx::Result<Vec<String>> {
    sqlx::query_scalar("SELECT DISTINCT playlist_id FROM playlist_songs WHERE song_id = ?")
        .bind(song_id)
        .fetch_all(conn)
        .await
}

pub async fn contains_song(
    conn: &mut SqliteConnection,
    playlist_id: &str,
    song_id: &str,
) -> sqlx::Result<bool> {
    let found: Option<i64> =
        sqlx::query_scalar("SELECT 1 FROM playlist_songs WHERE playlist_id = ? AND song_id = ?")
            .bind(playlist_id)
            .bind(song_id)
            .fetch_optional(conn)
            .await?;
    Ok(found.is_some())
}

pub async fn count_entries(conn: &mut SqliteConnection, playlist_id: &str) -> sqlx::Result<i64> {
    sqlx::query_scalar("SELECT COUNT(*) FROM playlist_songs WHERE playlist_id = ?")
        .bind(playlist_id)
        .fetch_one(conn)
        .await
}

pub async fn insert_entry(
    conn: &mut SqliteConnection,
    playlist_id: &str,
    song_id: &str,
    position: i64,
    now: &str,
) -> sqlx::Result<()> {
    sqlx::query(
        "INSERT INTO playlist_songs (playlist_id, song_id, position, added_at) VALUES (?, ?, ?, ?)",
    )
    .bind(playlist_id)
    .bind(song_id)
    .bind(position)
    .bind(now)
    .execute(conn)
    .await?;
    Ok(())
}

pub async fn delete_entry(
    conn: &mut SqliteConnection,
    playlist_id: &str,
    song_id: &str,
) -> sqlx::Result<bool> {
    let result = sqlx::query("DELETE FROM playlist_songs WHERE playlist_id = ? AND song_id = ?")
        .bind(playlist_id)
        .bind(song_id)
        .execute(conn)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Write positions 1..n following the order of `ordered_song_ids`
pub async fn write_positions(
    conn: &mut SqliteConnection,
    playlist_id: &str,
    ordered_song_ids: &[String],
) -> sqlx::Result<()> {
    for (index, song_id) in ordered_song_ids.iter().enumerate() {
        sqlx::query("UPDATE playlist_songs SET position = ? WHERE playlist_id = ? AND song_id = ?")
            .bind(index as i64 + 1)
            .bind(playlist_id)
            .bind(song_id)
            .execute(&mut *conn)
            .await?;
    }
    Ok(())
}

/// Close gaps left by a removal so positions run 1..n again
pub async fn renumber(conn: &mut SqliteConnection, playlist_id: &str) -> sqlx::Result<()> {
    let ids = song_ids(&mut *conn, playlist_id).await?;
    write_positions(conn, playlist_id, &ids).await
}
