//! Comment endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use jukebox_common::api::{CreateCommentRequest, MessageResponse, UpdateCommentRequest};
use jukebox_common::models::Comment;

use crate::auth::AuthUser;
use crate::services;
use crate::{ApiResult, AppState};

/// POST /comments
pub async fn create_comment(
    State(state): State<AppState>,
    user: AuthUser,
    Json(request): Json<CreateCommentRequest>,
) -> ApiResult<(StatusCode, Json<Comment>)> {
    let comment = services::comments::create(&state, &user.id, request).await?;
    Ok((StatusCode::CREATED, Json(comment)))
}

/// GET /comments/:id
pub async fn get_comment(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<Comment>> {
    Ok(Json(services::comments::get(&state, &id).await?))
}

/// PUT /comments/:id
pub async fn update_comment(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
    Json(request): Json<UpdateCommentRequest>,
) -> ApiResult<Json<Comment>> {
    Ok(Json(services::comments::update(&state, &user.id, &id, request).await?))
}

/// DELETE /comments/:id
pub async fn delete_comment(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Json<MessageResponse>> {
    services::comments::delete(&state, &user.id, &id).await?;
    Ok(Json(MessageResponse::new("Comment deleted")))
}

/// POST /comments/:id/flag
pub async fn flag_comment(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Json<Comment>> {
    Ok(Json(services::comments::flag(&state, &id).await?))
}

pub fn comment_routes() -> Router<AppState> {
    Router::new()
        .route("/comments", post(create_comment))
        .route(
            "/comments/:id",
            get(get_comment).put(update_comment).delete(delete_comment),
        )
        .route("/comments/:id/flag", post(flag_comment))
}
