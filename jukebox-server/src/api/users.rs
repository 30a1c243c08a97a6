//! User profiles and personal library

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use jukebox_common::api::{PageQuery, Paginated, UpdateUserRequest};
use jukebox_common::models::{Playlist, Song, UserProfile};

use crate::auth::AuthUser;
use crate::services;
use crate::{ApiResult, AppState};

/// GET /users/me
pub async fn get_me(State(state): State<AppState>, user: AuthUser) -> ApiResult<Json<UserProfile>> {
    Ok(Json(services::users::profile(&state, &user.id).await?))
}

/// PUT /users/me
pub async fn update_me(
    State(state): State<AppState>,
    user: AuthUser,
    Json(request): Json<UpdateUserRequest>,
) -> ApiResult<Json<UserProfile>> {
    Ok(Json(services::users::update_profile(&state, &user.id, request).await?))
}

/// GET /users/:id
pub async fn get_user(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<UserProfile>> {
    Ok(Json(services::users::profile(&state, &id).await?))
}

/// GET /users/me/library/songs
pub async fn library_songs(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<PageQuery>,
) -> ApiResult<Json<Paginated<Song>>> {
    Ok(Json(services::users::liked_songs(&state, &user.id, &query).await?))
}

/// GET /users/me/library/playlists
pub async fn library_playlists(
    State(state): State<AppState>,
    user: AuthUser,
) -> ApiResult<Json<Vec<Playlist>>> {
    Ok(Json(services::users::library_playlists(&state, &user.id).await?))
}

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users/me", get(get_me).put(update_me))
        .route("/users/me/library/songs", get(library_songs))
        .route("/users/me/library/playlists", get(library_playlists))
        .route("/users/:id", get(get_user))
}
