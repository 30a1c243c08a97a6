//! Account registration, login and token refresh

use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use jukebox_common::api::{AuthResponse, LoginRequest, MessageResponse, RefreshRequest, RegisterRequest};

use crate::auth::AuthUser;
use crate::services;
use crate::{ApiResult, AppState};

/// POST /auth/register
///
/// **Errors:** 400 for an invalid email or a password shorter than 8
/// characters, 409 when the email is taken.
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<AuthResponse>)> {
    let response = services::auth::register(&state, request).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// POST /auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> ApiResult<Json<AuthResponse>> {
    Ok(Json(services::auth::login(&state, request).await?))
}

/// POST /auth/refresh
///
/// Body `{user_id, refresh_token}`. The presented token is consumed; the
/// response carries its replacement.
pub async fn refresh(
    State(state): State<AppState>,
    Json(request): Json<RefreshRequest>,
) -> ApiResult<Json<AuthResponse>> {
    Ok(Json(services::auth::refresh(&state, request).await?))
}

/// POST /auth/logout
pub async fn logout(State(state): State<AppState>, user: AuthUser) -> ApiResult<Json<MessageResponse>> {
    services::auth::logout(&state, &user.id).await?;
    Ok(Json(MessageResponse::new("Logged out")))
}

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/refresh", post(refresh))
        .route("/auth/logout", post(logout))
}
