//! `songs` table queries

use jukebox_common::models::Song;
use sqlx::{SqliteConnection, SqlitePool};

/// Column values for a new song
#[derive(Debug, Clone, Default)]
pub struct NewSong {
    pub title: String,
    pub artist: String,
    pub album: Option<String>,
    pub file_path: Option<String>,
    pub cover_path: Option<String>,
    pub duration: Option<i64>,
    pub explicit: bool,
}

/// Optional column changes; `None` keeps the current value
///
/// Nullable columns (album, cover, duration) can be changed but not
/// cleared through an update.
#[derive(Debug, Clone, Default)]
pub struct SongChanges {
    pub title: Option<String>,
    pub artist: Option<String>,
    pub album: Option<String>,
    pub file_path: Option<String>,
    pub cover_path: Option<String>,
    pub duration: Option<i64>,
    pub explicit: Option<bool>,
}

/// Case-insensitive substring filters; `None` matches everything
///
/// Case folding is SQLite's `lower()`, which folds ASCII letters only:
/// `BAND` finds `band`, but `É` does not find `é`.
#[derive(Debug, Clone, Default)]
pub struct SongFilter {
    pub title: Option<String>,
    pub artist: Option<String>,
    pub album: Option<String>,
}

const FILTER_CLAUSE: &str = r#"
    (? IS NULL OR instr(lower(title), lower(?)) > 0)
    AND (? IS NULL OR instr(lower(artist), lower(?)) > 0)
    AND (? IS NULL OR instr(lower(COALESCE(album, '')), lower(?)) > 0)
"#;

pub async fn insert(
    db: &SqlitePool,
    id: &str,
    owner_id: &str,
    song: &NewSong,
    now: &str,
) -> sqlx::Result<()> {
    sqlx::query(
        r#"
        INSERT INTO songs (id, title, artist, album, file_path, cover_path, duration, explicit,
                           owner_id, play_count, uploaded_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, 0, ?, ?)
        "#,
    )
    .bind(id)
    .bind(&song.title)
    .bind(&song.artist)
    .bind(&song.album)
    .bind(&song.file_path)
    .bind(&song.cover_path)
    .bind(song.duration)
    .bind(song.explicit)
    .bind(owner_id)
    .bind(now)
    .bind(now)
    .execute(db)
    .await?;

    Ok(())
}

pub async fn find_by_id(db: &SqlitePool, id: &str) -> sqlx::Result<Option<Song>> {
    sqlx::query_as("SELECT * FROM songs WHERE id = ?")
        .bind(id)
        .fetch_optional(db)
        .await
}

pub async fn exists(db: &SqlitePool, id: &str) -> sqlx::Result<bool> {
    let found: Option<i64> = sqlx::query_scalar("SELECT 1 FROM songs WHERE id = ?")
        .bind(id)
        .fetch_optional(db)
        .await?;
    Ok(found.is_some())
}

pub async fn update(
    db: &SqlitePool,
    id: &str,
    changes: &SongChanges,
    now: &str,
) -> sqlx::Result<()> {
    sqlx::query(
        r#"
        UPDATE songs SET
            title = COALESCE(?, title),
            artist = COALESCE(?, artist),
            album = COALESCE(?, album),
            file_path = COALESCE(?, file_path),
            cover_path = COALESCE(?, cover_path),
            duration = COALESCE(?, duration),
            explicit = COALESCE(?, explicit),
            updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(&changes.title)
    .bind(&changes.artist)
    .bind(&changes.album)
    .bind(&changes.file_path)
    .bind(&changes.cover_path)
    .bind(changes.duration)
    .bind(changes.explicit)
    .bind(now)
    .bind(id)
    .execute(db)
    .await?;

    Ok(())
}

/// Delete a song row; cascades to playlist entries, likes and comments
pub async fn delete(conn: &mut SqliteConnection, id: &str) -> sqlx::Result<bool> {
    let result = sqlx::query("DELETE FROM songs WHERE id = ?")
        .bind(id)
        .execute(conn)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Whether any song row still points at a stored file
pub async fn references_file(conn: &mut SqliteConnection, stored: &str) -> sqlx::Result<bool> {
    let found: Option<i64> =
        sqlx::query_scalar("SELECT 1 FROM songs WHERE file_path = ?1 OR cover_path = ?1 LIMIT 1")
            .bind(stored)
            .fetch_optional(conn)
            .await?;
    Ok(found.is_some())
}

pub async fn count_matching(db: &SqlitePool, filter: &SongFilter) -> sqlx::Result<i64> {
    let sql = format!("SELECT COUNT(*) FROM songs WHERE {}", FILTER_CLAUSE);
    sqlx::query_scalar(&sql)
        .bind(&filter.title)
        .bind(&filter.title)
        .bind(&filter.artist)
        .bind(&filter.artist)
        .bind(&filter.album)
        .bind(&filter.album)
        .fetch_one(db)
        .await
}

/// Matching songs, newest upload first
pub async fn search(
    db: &SqlitePool,
    filter: &SongFilter,
    limit: i64,
    offset: i64,
) -> sqlx::Result<Vec<Song>> {
    let sql = format!(
        "SELECT * FROM songs WHERE {} ORDER BY uploaded_at DESC, rowid DESC LIMIT ? OFFSET ?",
        FILTER_CLAUSE
    );
    sqlx::query_as(&sql)
        .bind(&filter.title)
        .bind(&filter.title)
        .bind(&filter.artist)
        .bind(&filter.artist)
        .bind(&filter.album)
        .bind(&filter.album)
        .bind(limit)
        .bind(offset)
        .fetch_all(db)
        .await
}

/// Free-text match over title, artist and album (ASCII case folding, see [`SongFilter`])
pub async fn search_text(db: &SqlitePool, q: &str, limit: i64) -> sqlx::Result<Vec<Song>> {
    sqlx::query_as(
        r#"
        SELECT * FROM songs
        WHERE instr(lower(title), lower(?1)) > 0
           OR instr(lower(artist), lower(?1)) > 0
           OR instr(lower(COALESCE(album, '')), lower(?1)) > 0
        ORDER BY play_count DESC, uploaded_at DESC
        LIMIT ?2
        "#,
    )
    .bind(q)
    .bind(limit)
    .fetch_all(db)
    .await
}

/// Add one to a song's play count
pub async fn increment_play_count(db: &SqlitePool, id: &str) -> sqlx::Result<()> {
    sqlx::query("UPDATE songs SET play_count = play_count + 1 WHERE id = ?")
        .bind(id)
        .execute(db)
        .await?;
    Ok(())
}

pub async fn play_count(db: &SqlitePool, id: &str) -> sqlx::Result<Option<i64>> {
    sqlx::query_scalar("SELECT play_count FROM songs WHERE id = ?")
        .bind(id)
        .fetch_optional(db)
        .await
}

/// Songs by artists the user liked, excluding liked and own songs
pub async fn by_liked_artists(db: &SqlitePool, user_id: &str, limit: i64) -> sqlx::Result<Vec<Song>> {
    sqlx::query_as(
        r#"
        SELECT * FROM songs
        WHERE artist != ''
          AND artist IN (
              SELECT DISTINCT s.artist FROM song_likes l
              JOIN songs s ON s.id = l.song_id
              WHERE l.user_id = ?1
          )
          AND id NOT IN (SELECT song_id FROM song_likes WHERE user_id = ?1)
          AND owner_id != ?1
        ORDER BY play_count DESC, uploaded_at DESC
        LIMIT ?2
        "#,
    )
    .bind(user_id)
    .bind(limit)
    .fetch_all(db)
    .await
}

/// Most played songs the user hasn't liked
pub async fn most_played_unliked(db: &SqlitePool, user_id: &str, limit: i64) -> sqlx::Result<Vec<Song>> {
    sqlx::query_as(
        r#"
        SELECT * FROM songs
        WHERE id NOT IN (SELECT song_id FROM song_likes WHERE user_id = ?1)
        ORDER BY play_count DESC, uploaded_at DESC
        LIMIT ?2
        "#,
    )
    .bind(user_id)
    .bind(limit)
    .fetch_all(db)
    .await
}
