//! Global search and recommendations

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use jukebox_common::api::{SearchQuery, SearchResponse};
use jukebox_common::models::Song;

use crate::auth::AuthUser;
use crate::services;
use crate::{ApiResult, AppState};

/// GET /search?q=
pub async fn search(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> ApiResult<Json<SearchResponse>> {
    Ok(Json(services::search::search(&state, &query.q).await?))
}

/// GET /recommendations
pub async fn recommendations(State(state): State<AppState>, user: AuthUser) -> ApiResult<Json<Vec<Song>>> {
    Ok(Json(services::recommendations::for_user(&state, &user.id).await?))
}

pub fn search_routes() -> Router<AppState> {
    Router::new().route("/search", get(search))
}

pub fn recommendation_routes() -> Router<AppState> {
    Router::new().route("/recommendations", get(recommendations))
}
