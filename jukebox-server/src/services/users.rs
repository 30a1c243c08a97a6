//! Profiles and personal library

use jukebox_common::api::{PageQuery, Paginated, UpdateUserRequest};
use jukebox_common::models::{Playlist, Song, UserProfile};
use jukebox_common::time;

use crate::db::{likes, playlists, users};
use crate::error::{ApiError, ApiResult};
use crate::pagination;
use crate::AppState;

pub async fn profile(state: &AppState, user_id: &str) -> ApiResult<UserProfile> {
    users::find_by_id(&state.db, user_id)
        .await?
        .map(|u| u.into_profile())
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))
}

/// Update display name, avatar and preferences
///
/// Email, password and verification status are not editable here.
pub async fn update_profile(
    state: &AppState,
    user_id: &str,
    request: UpdateUserRequest,
) -> ApiResult<UserProfile> {
    if let Some(name) = &request.display_name {
        if name.trim().is_empty() {
            return Err(ApiError::BadRequest("Display name cannot be empty".to_string()));
        }
    }

    let preferences = request
        .preferences
        .as_ref()
        .map(serde_json::to_string)
        .transpose()
        .map_err(|e| ApiError::BadRequest(format!("Invalid preferences: {}", e)))?;

    // Existence check first, so a deleted account gets 404 rather than a
    // silent no-op update
    profile(state, user_id).await?;

    users::update_profile(
        &state.db,
        user_id,
        request.display_name.as_deref().map(str::trim),
        request.avatar_url.as_deref(),
        preferences.as_deref(),
        &time::now_rfc3339(),
    )
    .await?;

    profile(state, user_id).await
}

/// Songs the user liked, most recent like first
pub async fn liked_songs(
    state: &AppState,
    user_id: &str,
    query: &PageQuery,
) -> ApiResult<Paginated<Song>> {
    let total = likes::count_for_user(&state.db, user_id).await?;
    let page = pagination::from_query(total, query);
    let songs = likes::liked_songs(&state.db, user_id, page.page_size, page.offset).await?;
    Ok(page.wrap(songs, total))
}

pub async fn library_playlists(state: &AppState, user_id: &str) -> ApiResult<Vec<Playlist>> {
    Ok(playlists::list_by_owner(&state.db, user_id).await?)
}
