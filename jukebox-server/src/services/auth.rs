//! Account registration and the token lifecycle
//!
//! Each user has at most one valid refresh token, stored on the user row.
//! Login and refresh overwrite it and logout clears it, so any earlier token
//! stops working immediately.

use jukebox_common::api::{AuthResponse, LoginRequest, RefreshRequest, RegisterRequest, TokenPair};
use jukebox_common::{time, uuid_utils};
use tracing::{info, warn};

use crate::auth::password::{hash_password, validate_password, verify_password};
use crate::auth::generate_refresh_token;
use crate::db::users::{self, NewUser, UserRow};
use crate::error::{ApiError, ApiResult};
use crate::AppState;

const INVALID_CREDENTIALS: &str = "Invalid credentials";
const INVALID_REFRESH_TOKEN: &str = "Invalid refresh token";

/// Emails are matched case-insensitively
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn validate_email(email: &str) -> ApiResult<()> {
    let valid = match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && !domain.is_empty() && !domain.contains('@'),
        None => false,
    };
    if valid {
        Ok(())
    } else {
        Err(ApiError::BadRequest("Invalid email address".to_string()))
    }
}

fn issue_pair(state: &AppState, user: &UserRow, refresh_token: String) -> ApiResult<TokenPair> {
    Ok(TokenPair {
        access_token: state.tokens.issue_access_token(&user.id, &user.email)?,
        refresh_token,
    })
}

pub async fn register(state: &AppState, request: RegisterRequest) -> ApiResult<AuthResponse> {
    let email = normalize_email(&request.email);
    validate_email(&email)?;
    validate_password(&request.password)?;

    let display_name = request.display_name.trim();
    if display_name.is_empty() {
        return Err(ApiError::BadRequest("Display name is required".to_string()));
    }

    if users::find_by_email(&state.db, &email).await?.is_some() {
        return Err(ApiError::Conflict("Email already registered".to_string()));
    }

    let password_hash = hash_password(&request.password, state.bcrypt_cost).await?;
    let id = uuid_utils::generate_string();
    let refresh_token = generate_refresh_token();
    let now = time::now_rfc3339();

    let inserted = users::insert(
        &state.db,
        &NewUser {
            id: &id,
            email: &email,
            password_hash: &password_hash,
            display_name,
            refresh_token: &refresh_token,
            now: &now,
        },
    )
    .await;

    // A concurrent registration can still hit the UNIQUE constraint
    if let Err(sqlx::Error::Database(db_err)) = &inserted {
        if db_err.is_unique_violation() {
            return Err(ApiError::Conflict("Email already registered".to_string()));
        }
    }
    inserted?;

    let user = users::find_by_id(&state.db, &id)
        .await?
        .ok_or_else(|| ApiError::Internal("User vanished after insert".to_string()))?;

    info!(user_id = %user.id, "Registered user");

    let tokens = issue_pair(state, &user, refresh_token)?;
    Ok(AuthResponse {
        user: user.into_profile(),
        tokens,
    })
}

pub async fn login(state: &AppState, request: LoginRequest) -> ApiResult<AuthResponse> {
    let email = normalize_email(&request.email);

    let user = users::find_by_email(&state.db, &email)
        .await?
        .ok_or_else(|| ApiError::Unauthorized(INVALID_CREDENTIALS.to_string()))?;

    if !verify_password(&request.password, &user.password_hash).await? {
        warn!(user_id = %user.id, "Login with wrong password");
        return Err(ApiError::Unauthorized(INVALID_CREDENTIALS.to_string()));
    }

    let refresh_token = generate_refresh_token();
    users::set_refresh_token(&state.db, &user.id, Some(&refresh_token)).await?;

    info!(user_id = %user.id, "User logged in");

    let tokens = issue_pair(state, &user, refresh_token)?;
    Ok(AuthResponse {
        user: user.into_profile(),
        tokens,
    })
}

/// Exchange a refresh token for a new pair, rotating the stored token
pub async fn refresh(state: &AppState, request: RefreshRequest) -> ApiResult<AuthResponse> {
    let user = users::find_by_id(&state.db, &request.user_id)
        .await?
        .ok_or_else(|| ApiError::Unauthorized(INVALID_REFRESH_TOKEN.to_string()))?;

    let replacement = generate_refresh_token();
    let rotated =
        users::rotate_refresh_token(&state.db, &user.id, &request.refresh_token, &replacement)
            .await?;

    if !rotated {
        warn!(user_id = %user.id, "Rejected stale or unknown refresh token");
        return Err(ApiError::Unauthorized(INVALID_REFRESH_TOKEN.to_string()));
    }

    info!(user_id = %user.id, "Rotated refresh token");

    let tokens = issue_pair(state, &user, replacement)?;
    Ok(AuthResponse {
        user: user.into_profile(),
        tokens,
    })
}

/// Clear the stored refresh token
pub async fn logout(state: &AppState, user_id: &str) -> ApiResult<()> {
    users::set_refresh_token(&state.db, user_id, None).await?;
    info!(user_id = %user_id, "User logged out");
    Ok(())
}
