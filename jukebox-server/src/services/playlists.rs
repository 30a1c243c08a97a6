//! Playlists and their ordered songs
//!
//! Positions are dense and 1-based. Every add, remove and reorder leaves them
//! as exactly `1..=n`, inside one transaction.

use jukebox_common::api::{CreatePlaylistRequest, ReorderPlaylistRequest};
use jukebox_common::models::{Playlist, PlaylistDetail};
use jukebox_common::{time, uuid_utils};
use std::collections::HashSet;
use tracing::info;

use crate::db::{playlists, songs};
use crate::error::{ApiError, ApiResult};
use crate::AppState;

fn playlist_not_found() -> ApiError {
    ApiError::NotFound("Playlist not found".to_string())
}

/// Load a playlist visible to the caller (owner only)
async fn get_visible(state: &AppState, user_id: &str, playlist_id: &str) -> ApiResult<Playlist> {
    playlists::find_by_id(&state.db, playlist_id)
        .await?
        .filter(|p| p.owner_id == user_id)
        .ok_or_else(playlist_not_found)
}

/// Load a playlist for mutation: missing → 404, not the owner → 400
async fn get_owned(state: &AppState, user_id: &str, playlist_id: &str) -> ApiResult<Playlist> {
    let playlist = playlists::find_by_id(&state.db, playlist_id)
        .await?
        .ok_or_else(playlist_not_found)?;

    if playlist.owner_id != user_id {
        return Err(ApiError::BadRequest("You do not own this playlist".to_string()));
    }
    Ok(playlist)
}

async fn require_song(state: &AppState, song_id: &str) -> ApiResult<()> {
    if songs::exists(&state.db, song_id).await? {
        Ok(())
    } else {
        Err(ApiError::NotFound("Song not found".to_string()))
    }
}

async fn detail(state: &AppState, playlist: Playlist) -> ApiResult<PlaylistDetail> {
    let entries = playlists::entries(&state.db, &playlist.id).await?;
    Ok(PlaylistDetail {
        playlist,
        songs: entries,
    })
}

pub async fn create(
    state: &AppState,
    owner_id: &str,
    request: CreatePlaylistRequest,
) -> ApiResult<PlaylistDetail> {
    let title = request.title.trim();
    if title.is_empty() {
        return Err(ApiError::BadRequest("Title is required".to_string()));
    }
    if let Some(song_id) = &request.song_id {
        require_song(state, song_id).await?;
    }

    let id = uuid_utils::generate_string();
    let now = time::now_rfc3339();

    let mut tx = state.db.begin().await?;
    playlists::insert(&mut *tx, &id, owner_id, title, request.description.as_deref(), &now).await?;
    if let Some(song_id) = &request.song_id {
        playlists::insert_entry(&mut *tx, &id, song_id, 1, &now).await?;
    }
    tx.commit().await?;

    info!(playlist_id = %id, owner_id = %owner_id, "Created playlist");

    let playlist = get_visible(state, owner_id, &id).await?;
    detail(state, playlist).await
}

/// The caller's playlists, newest first
pub async fn list(state: &AppState, owner_id: &str) -> ApiResult<Vec<Playlist>> {
    Ok(playlists::list_by_owner(&state.db, owner_id).await?)
}

pub async fn get(state: &AppState, user_id: &str, playlist_id: &str) -> ApiResult<PlaylistDetail> {
    let playlist = get_visible(state, user_id, playlist_id).await?;
    detail(state, playlist).await
}

pub async fn delete(state: &AppState, user_id: &str, playlist_id: &str) -> ApiResult<()> {
    get_owned(state, user_id, playlist_id).await?;
    playlists::delete(&state.db, playlist_id).await?;
    info!(playlist_id = %playlist_id, "Deleted playlist");
    Ok(())
}

/// Append a song at position `count + 1`
pub async fn add_song(
    state: &AppState,
    user_id: &str,
    playlist_id: &str,
    song_id: &str,
) -> ApiResult<PlaylistDetail> {
    get_owned(state, user_id, playlist_id).await?;
    require_song(state, song_id).await?;

    let now = time::now_rfc3339();
    let mut tx = state.db.begin().await?;

    if playlists::contains_song(&mut *tx, playlist_id, song_id).await? {
        return Err(ApiError::BadRequest("Song already in playlist".to_string()));
    }

    let position = playlists::count_entries(&mut *tx, playlist_id).await? + 1;
    playlists::insert_entry(&mut *tx, playlist_id, song_id, position, &now).await?;
    playlists::touch(&mut *tx, playlist_id, &now).await?;
    tx.commit().await?;

    get(state, user_id, playlist_id).await
}

/// Remove a song and close the gap
pub async fn remove_song(
    state: &AppState,
    user_id: &str,
    playlist_id: &str,
    song_id: &str,
) -> ApiResult<PlaylistDetail> {
    get_owned(state, user_id, playlist_id).await?;

    let mut tx = state.db.begin().await?;
    if !playlists::delete_entry(&mut *tx, playlist_id, song_id).await? {
        return Err(ApiError::NotFound("Song not in playlist".to_string()));
    }
    playlists::renumber(&mut *tx, playlist_id).await?;
    playlists::touch(&mut *tx, playlist_id, &time::now_rfc3339()).await?;
    tx.commit().await?;

    get(state, user_id, playlist_id).await
}

/// New song order for a reorder request
///
/// Listed songs take positions `1..=k` in list order; songs left out keep
/// their previous relative order after them. Unknown or repeated ids are
/// rejected.
pub fn reordered_ids(current: &[String], requested: &[String]) -> Result<Vec<String>, String> {
    let members: HashSet<&str> = current.iter().map(String::as_str).collect();
    let mut seen: HashSet<&str> = HashSet::with_capacity(requested.len());

    for id in requested {
        if !members.contains(id.as_str()) {
            return Err(format!("Song {} is not in this playlist", id));
        }
        if !seen.insert(id.as_str()) {
            return Err(format!("Song {} listed more than once", id));
        }
    }

    let mut ordered: Vec<String> = requested.to_vec();
    ordered.extend(
        current
            .iter()
            .filter(|id| !seen.contains(id.as_str()))
            .cloned(),
    );
    Ok(ordered)
}

pub async fn reorder(
    state: &AppState,
    user_id: &str,
    playlist_id: &str,
    request: ReorderPlaylistRequest,
) -> ApiResult<PlaylistDetail> {
    get_owned(state, user_id, playlist_id).await?;

    let mut tx = state.db.begin().await?;
    let current = playlists::song_ids(&mut *tx, playlist_id).await?;
    let ordered = reordered_ids(&current, &request.song_ids).map_err(ApiError::BadRequest)?;

    playlists::write_positions(&mut *tx, playlist_id, &ordered).await?;
    playlists::touch(&mut *tx, playlist_id, &time::now_rfc3339()).await?;
    tx.commit().await?;

    get(state, user_id, playlist_id).await
}
