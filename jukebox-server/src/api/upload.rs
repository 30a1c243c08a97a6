//! Multipart upload endpoint

use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use jukebox_common::models::Song;

use crate::auth::AuthUser;
use crate::services;
use crate::{ApiResult, AppState, MAX_UPLOAD_BYTES};

/// POST /songs/upload
///
/// **Request:** `multipart/form-data` with one audio file, an optional cover
/// image and optional `title`, `artist`, `album`, `explicit` text fields.
///
/// Metadata comes from MusicBrainz when a title is supplied and a match is
/// found, otherwise from the file's embedded tags, otherwise from the
/// supplied fields and the file name.
pub async fn upload_song(
    State(state): State<AppState>,
    user: AuthUser,
    multipart: Multipart,
) -> ApiResult<(StatusCode, Json<Song>)> {
    let song = services::upload::upload(&state, &user.id, multipart).await?;
    Ok((StatusCode::CREATED, Json(song)))
}

pub fn upload_routes() -> Router<AppState> {
    Router::new()
        .route("/songs/upload", post(upload_song))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
}
