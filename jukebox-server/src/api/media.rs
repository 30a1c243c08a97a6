//! Media URLs and play-count analytics

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use jukebox_common::api::{MediaResponse, PlayCountQuery, PlayCountResponse};

use crate::services;
use crate::{ApiResult, AppState};

/// `<base>/<id>` with exactly one separating slash
pub fn media_url(base_url: &str, id: &str) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), id)
}

/// GET /media/:id
///
/// Resolves an id to a URL on the configured media host. The id is not
/// checked against the library.
pub async fn get_media(State(state): State<AppState>, Path(id): Path<String>) -> Json<MediaResponse> {
    let url = media_url(&state.media_base_url, &id);
    Json(MediaResponse { id, url })
}

/// GET /analytics/play-counts?song_id=
pub async fn play_counts(
    State(state): State<AppState>,
    Query(query): Query<PlayCountQuery>,
) -> ApiResult<Json<PlayCountResponse>> {
    let play_count = services::songs::play_count(&state, &query.song_id).await?;
    Ok(Json(PlayCountResponse {
        song_id: query.song_id,
        play_count,
    }))
}

pub fn media_routes() -> Router<AppState> {
    Router::new().route("/media/:id", get(get_media))
}

pub fn analytics_routes() -> Router<AppState> {
    Router::new().route("/analytics/play-counts", get(play_counts))
}
