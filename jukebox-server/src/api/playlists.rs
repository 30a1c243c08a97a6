//! Playlist endpoints
//!
//! Only the owner sees or changes a playlist. Every mutation answers with
//! the full playlist and its songs in position order.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post, put},
    Json, Router,
};
use jukebox_common::api::{
    AddPlaylistSongRequest, CreatePlaylistRequest, MessageResponse, ReorderPlaylistRequest,
};
use jukebox_common::models::{Playlist, PlaylistDetail};

use crate::auth::AuthUser;
use crate::services;
use crate::{ApiResult, AppState};

/// POST /playlists
pub async fn create_playlist(
    State(state): State<AppState>,
    user: AuthUser,
    Json(request): Json<CreatePlaylistRequest>,
) -> ApiResult<(StatusCode, Json<PlaylistDetail>)> {
    let playlist = services::playlists::create(&state, &user.id, request).await?;
    Ok((StatusCode::CREATED, Json(playlist)))
}

/// GET /playlists
pub async fn list_playlists(State(state): State<AppState>, user: AuthUser) -> ApiResult<Json<Vec<Playlist>>> {
    Ok(Json(services::playlists::list(&state, &user.id).await?))
}

/// GET /playlists/:id
pub async fn get_playlist(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Json<PlaylistDetail>> {
    Ok(Json(services::playlists::get(&state, &user.id, &id).await?))
}

/// DELETE /playlists/:id
pub async fn delete_playlist(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Json<MessageResponse>> {
    services::playlists::delete(&state, &user.id, &id).await?;
    Ok(Json(MessageResponse::new("Playlist deleted")))
}

/// POST /playlists/:id/songs
///
/// **Errors:** 400 if the song is already in the playlist, 404 if the song
/// does not exist.
pub async fn add_song(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
    Json(request): Json<AddPlaylistSongRequest>,
) -> ApiResult<Json<PlaylistDetail>> {
    Ok(Json(
        services::playlists::add_song(&state, &user.id, &id, &request.song_id).await?,
    ))
}

/// DELETE /playlists/:id/songs/:song_id
pub async fn remove_song(
    State(state): State<AppState>,
    user: AuthUser,
    Path((id, song_id)): Path<(String, String)>,
) -> ApiResult<Json<PlaylistDetail>> {
    Ok(Json(
        services::playlists::remove_song(&state, &user.id, &id, &song_id).await?,
    ))
}

/// PUT /playlists/:id/reorder
///
/// **Request:** `{"song_ids": [...]}`. Listed songs take positions 1..k in
/// the given order; unlisted songs follow in their previous order.
pub async fn reorder(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
    Json(request): Json<ReorderPlaylistRequest>,
) -> ApiResult<Json<PlaylistDetail>> {
    Ok(Json(services::playlists::reorder(&state, &user.id, &id, request).await?))
}

pub fn playlist_routes() -> Router<AppState> {
    Router::new()
        .route("/playlists", post(create_playlist).get(list_playlists))
        .route("/playlists/:id", get(get_playlist).delete(delete_playlist))
        .route("/playlists/:id/songs", post(add_song))
        .route("/playlists/:id/songs/:song_id", delete(remove_song))
        .route("/playlists/:id/reorder", put(reorder))
}
