//! Song endpoints: CRUD, search, likes, comments and file delivery

use axum::{
    body::Body,
    extract::{Path, Query, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use jukebox_common::api::{
    CreateSongRequest, MessageResponse, PageQuery, Paginated, SongSearchQuery, UpdateSongRequest,
};
use jukebox_common::models::{Comment, Song};
use tokio_util::io::ReaderStream;
use tracing::debug;

use crate::auth::AuthUser;
use crate::services;
use crate::{ApiError, ApiResult, AppState};

/// Served for every audio file regardless of its stored format
pub const AUDIO_CONTENT_TYPE: &str = "audio/mpeg";

/// How the browser should treat a delivered file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    Inline,
    Attachment,
}

impl Disposition {
    fn as_str(self) -> &'static str {
        match self {
            Disposition::Inline => "inline",
            Disposition::Attachment => "attachment",
        }
    }
}

/// `Content-Disposition` value with a `<title>.mp3` filename
///
/// Characters that cannot appear in a quoted ASCII header value are replaced
/// with `_`.
pub fn content_disposition(disposition: Disposition, title: &str) -> String {
    let safe: String = title
        .chars()
        .map(|c| match c {
            '"' | '\\' => '_',
            c if c.is_ascii_graphic() || c == ' ' => c,
            _ => '_',
        })
        .collect();
    let safe = if safe.trim().is_empty() { "song" } else { safe.trim() };

    format!("{}; filename=\"{}.mp3\"", disposition.as_str(), safe)
}

/// POST /songs
pub async fn create_song(
    State(state): State<AppState>,
    user: AuthUser,
    Json(request): Json<CreateSongRequest>,
) -> ApiResult<(StatusCode, Json<Song>)> {
    let song = services::songs::create(&state, &user.id, request).await?;
    Ok((StatusCode::CREATED, Json(song)))
}

/// GET /songs/:id
pub async fn get_song(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<Song>> {
    Ok(Json(services::songs::get(&state, &id).await?))
}

/// PUT /songs/:id
///
/// **Errors:** 404 if the song does not exist, 400 if the caller is not its
/// owner.
pub async fn update_song(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
    Json(request): Json<UpdateSongRequest>,
) -> ApiResult<Json<Song>> {
    Ok(Json(services::songs::update(&state, &user.id, &id, request).await?))
}

/// DELETE /songs/:id
pub async fn delete_song(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Json<MessageResponse>> {
    services::songs::delete(&state, &user.id, &id).await?;
    Ok(Json(MessageResponse::new("Song deleted")))
}

/// GET /songs/search?title&artist&album&page&page_size
pub async fn search_songs(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(query): Query<SongSearchQuery>,
) -> ApiResult<Json<Paginated<Song>>> {
    Ok(Json(services::songs::search(&state, query).await?))
}

/// GET /songs/liked?page&page_size
pub async fn liked_songs(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<PageQuery>,
) -> ApiResult<Json<Paginated<Song>>> {
    Ok(Json(services::users::liked_songs(&state, &user.id, &query).await?))
}

async fn deliver(state: &AppState, song_id: &str, disposition: Disposition) -> ApiResult<Response> {
    let services::songs::SongFile { song, path } = services::songs::audio_file(state, song_id).await?;

    let file = tokio::fs::File::open(&path).await?;
    let length = file.metadata().await?.len();
    debug!(song_id = %song.id, path = %path.display(), bytes = length, "Sending audio file");

    let disposition_value = HeaderValue::from_str(&content_disposition(disposition, &song.title))
        .map_err(|e| ApiError::Internal(format!("Invalid Content-Disposition: {}", e)))?;

    Ok((
        [
            (header::CONTENT_TYPE, HeaderValue::from_static(AUDIO_CONTENT_TYPE)),
            (header::CONTENT_LENGTH, HeaderValue::from(length)),
            (header::CONTENT_DISPOSITION, disposition_value),
        ],
        Body::from_stream(ReaderStream::new(file)),
    )
        .into_response())
}

/// GET /songs/:id/stream
///
/// Each successful stream counts as one play.
pub async fn stream_song(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Response> {
    let response = deliver(&state, &id, Disposition::Inline).await?;
    services::songs::record_play(&state, &id).await?;
    Ok(response)
}

/// GET /songs/:id/download
pub async fn download_song(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Response> {
    deliver(&state, &id, Disposition::Attachment).await
}

/// POST /songs/:id/like
pub async fn like_song(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Json<MessageResponse>> {
    Ok(Json(services::songs::like(&state, &user.id, &id).await?))
}

/// DELETE /songs/:id/like
pub async fn unlike_song(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Json<MessageResponse>> {
    Ok(Json(services::songs::unlike(&state, &user.id, &id).await?))
}

/// GET /songs/:id/comments
pub async fn song_comments(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Vec<Comment>>> {
    Ok(Json(services::songs::comments(&state, &id).await?))
}

pub fn song_routes() -> Router<AppState> {
    Router::new()
        .route("/songs", post(create_song))
        .route("/songs/search", get(search_songs))
        .route("/songs/liked", get(liked_songs))
        .route("/songs/:id", get(get_song).put(update_song).delete(delete_song))
        .route("/songs/:id/stream", get(stream_song))
        .route("/songs/:id/download", get(download_song))
        .route("/songs/:id/like", post(like_song).delete(unlike_song))
        .route("/songs/:id/comments", get(song_comments))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_disposition_plain_title() {
        assert_eq!(
            content_disposition(Disposition::Inline, "Billie Jean"),
            "inline; filename=\"Billie Jean.mp3\""
        );
        assert_eq!(
            content_disposition(Disposition::Attachment, "Song"),
            "attachment; filename=\"Song.mp3\""
        );
    }

    #[test]
    fn test_content_disposition_escapes_unsafe_characters() {
        let value = content_disposition(Disposition::Attachment, "Say \"Hi\"\\ Café\n");
        assert_eq!(value, "attachment; filename=\"Say _Hi__ Caf__.mp3\"");
        assert!(HeaderValue::from_str(&value).is_ok());
    }

    #[test]
    fn test_content_disposition_blank_title() {
        assert_eq!(
            content_disposition(Disposition::Inline, "   "),
            "inline; filename=\"song.mp3\""
        );
    }
}
