//! Song CRUD, likes, comments listing and file access

use jukebox_common::api::{CreateSongRequest, MessageResponse, Paginated, SongSearchQuery, UpdateSongRequest};
use jukebox_common::models::{Comment, Song};
use jukebox_common::{time, uuid_utils};
use std::path::PathBuf;
use tracing::info;

use super::storage::{self, UploadKind};
use crate::db::songs::{NewSong, SongChanges, SongFilter};
use crate::db::{comments, likes, playlists, songs};
use crate::error::{ApiError, ApiResult};
use crate::pagination;
use crate::AppState;

fn song_not_found() -> ApiError {
    ApiError::NotFound("Song not found".to_string())
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Normalized stored path, or 400 when it points outside `kind`'s upload directory
fn checked_path(kind: UploadKind, stored: &str) -> ApiResult<String> {
    storage::stored_path(kind, stored).ok_or_else(|| {
        let field = match kind {
            UploadKind::Song => "File path",
            UploadKind::Thumbnail => "Cover path",
        };
        ApiError::BadRequest(format!("{} must name an uploaded file", field))
    })
}

fn validate_duration(duration: Option<i64>) -> ApiResult<()> {
    match duration {
        Some(d) if d < 0 => Err(ApiError::BadRequest("Duration cannot be negative".to_string())),
        _ => Ok(()),
    }
}

pub async fn get(state: &AppState, song_id: &str) -> ApiResult<Song> {
    songs::find_by_id(&state.db, song_id)
        .await?
        .ok_or_else(song_not_found)
}

/// Load a song the caller owns
///
/// Missing → 404; someone else's → 400.
async fn get_owned(state: &AppState, user_id: &str, song_id: &str) -> ApiResult<Song> {
    let song = get(state, song_id).await?;
    if song.owner_id != user_id {
        return Err(ApiError::BadRequest("You do not own this song".to_string()));
    }
    Ok(song)
}

/// Insert a song row owned by `owner_id`
pub async fn insert(state: &AppState, owner_id: &str, new_song: NewSong) -> ApiResult<Song> {
    let id = uuid_utils::generate_string();
    songs::insert(&state.db, &id, owner_id, &new_song, &time::now_rfc3339()).await?;

    info!(song_id = %id, owner_id = %owner_id, title = %new_song.title, "Created song");
    get(state, &id).await
}

pub async fn create(state: &AppState, owner_id: &str, request: CreateSongRequest) -> ApiResult<Song> {
    let title = request.title.trim().to_string();
    if title.is_empty() {
        return Err(ApiError::BadRequest("Title is required".to_string()));
    }
    if request.file_path.trim().is_empty() {
        return Err(ApiError::BadRequest("File path is required".to_string()));
    }
    let file_path = checked_path(UploadKind::Song, &request.file_path)?;
    let cover_path = non_blank(request.cover_path)
        .map(|p| checked_path(UploadKind::Thumbnail, &p))
        .transpose()?;
    validate_duration(request.duration)?;

    insert(
        state,
        owner_id,
        NewSong {
            title,
            artist: request.artist.trim().to_string(),
            album: non_blank(request.album),
            file_path: Some(file_path),
            cover_path,
            duration: request.duration,
            explicit: request.explicit.unwrap_or(false),
        },
    )
    .await
}

pub async fn update(
    state: &AppState,
    user_id: &str,
    song_id: &str,
    request: UpdateSongRequest,
) -> ApiResult<Song> {
    get_owned(state, user_id, song_id).await?;

    if let Some(title) = &request.title {
        if title.trim().is_empty() {
            return Err(ApiError::BadRequest("Title cannot be empty".to_string()));
        }
    }
    validate_duration(request.duration)?;
    let file_path = request
        .file_path
        .map(|p| checked_path(UploadKind::Song, &p))
        .transpose()?;
    let cover_path = request
        .cover_path
        .map(|p| checked_path(UploadKind::Thumbnail, &p))
        .transpose()?;

    let changes = SongChanges {
        title: request.title.map(|t| t.trim().to_string()),
        artist: request.artist.map(|a| a.trim().to_string()),
        album: request.album,
        file_path,
        cover_path,
        duration: request.duration,
        explicit: request.explicit,
    };

    songs::update(&state.db, song_id, &changes, &time::now_rfc3339()).await?;
    get(state, song_id).await
}

/// Delete a song the caller owns
///
/// Playlists that contained it are renumbered in the same transaction.
/// Its audio and cover files are removed afterwards unless another song
/// still points at them.
pub async fn delete(state: &AppState, user_id: &str, song_id: &str) -> ApiResult<()> {
    let song = get_owned(state, user_id, song_id).await?;

    let mut tx = state.db.begin().await?;
    let affected = playlists::containing_song(&mut *tx, song_id).await?;
    songs::delete(&mut *tx, song_id).await?;
    for playlist_id in &affected {
        playlists::renumber(&mut *tx, playlist_id).await?;
    }

    let mut orphaned = Vec::new();
    for (kind, stored) in [
        (UploadKind::Song, &song.file_path),
        (UploadKind::Thumbnail, &song.cover_path),
    ] {
        if let Some(stored) = stored {
            if !songs::references_file(&mut *tx, stored).await? {
                orphaned.push((kind, stored));
            }
        }
    }
    tx.commit().await?;

    for (kind, stored) in orphaned {
        state.storage.remove(kind, stored).await;
    }

    info!(song_id = %song_id, playlists = affected.len(), "Deleted song");
    Ok(())
}

pub async fn search(state: &AppState, query: SongSearchQuery) -> ApiResult<Paginated<Song>> {
    let filter = SongFilter {
        title: non_blank(query.title),
        artist: non_blank(query.artist),
        album: non_blank(query.album),
    };

    let total = songs::count_matching(&state.db, &filter).await?;
    let page = pagination::calculate_pagination(total, query.page, query.page_size);
    let data = songs::search(&state.db, &filter, page.page_size, page.offset).await?;

    Ok(page.wrap(data, total))
}

/// Like a song; a repeated like is a no-op
pub async fn like(state: &AppState, user_id: &str, song_id: &str) -> ApiResult<MessageResponse> {
    if !songs::exists(&state.db, song_id).await? {
        return Err(song_not_found());
    }

    let created = likes::insert(&state.db, user_id, song_id, &time::now_rfc3339()).await?;
    Ok(MessageResponse::new(if created { "Song liked" } else { "Already liked" }))
}

pub async fn unlike(state: &AppState, user_id: &str, song_id: &str) -> ApiResult<MessageResponse> {
    likes::delete(&state.db, user_id, song_id).await?;
    Ok(MessageResponse::new("Song unliked"))
}

pub async fn comments(state: &AppState, song_id: &str) -> ApiResult<Vec<Comment>> {
    if !songs::exists(&state.db, song_id).await? {
        return Err(song_not_found());
    }
    Ok(comments::for_song(&state.db, song_id).await?)
}

/// A song together with its audio file on disk
pub struct SongFile {
    pub song: Song,
    pub path: PathBuf,
}

/// Locate the audio file of a song
///
/// Missing song → 404, song without file → 400, file gone → 404.
pub async fn audio_file(state: &AppState, song_id: &str) -> ApiResult<SongFile> {
    let song = get(state, song_id).await?;

    let stored = song
        .file_path
        .as_deref()
        .filter(|p| !p.trim().is_empty())
        .ok_or_else(|| ApiError::BadRequest("Song file not available".to_string()))?;

    let path = state
        .storage
        .resolve(UploadKind::Song, stored)
        .filter(|p| p.is_file())
        .ok_or_else(|| ApiError::NotFound("Song file does not exist".to_string()))?;

    Ok(SongFile { song, path })
}

pub async fn record_play(state: &AppState, song_id: &str) -> ApiResult<()> {
    songs::increment_play_count(&state.db, song_id).await?;
    Ok(())
}

pub async fn play_count(state: &AppState, song_id: &str) -> ApiResult<i64> {
    songs::play_count(&state.db, song_id)
        .await?
        .ok_or_else(song_not_found)
}
