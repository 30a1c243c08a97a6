//! Free-text search across songs and playlists

use jukebox_common::api::SearchResponse;

use crate::db::{playlists, songs};
use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// Maximum results per category
pub const SEARCH_LIMIT: i64 = 50;

pub async fn search(state: &AppState, q: &str) -> ApiResult<SearchResponse> {
    let q = q.trim();
    if q.is_empty() {
        return Err(ApiError::BadRequest("Search query is required".to_string()));
    }

    Ok(SearchResponse {
        songs: songs::search_text(&state.db, q, SEARCH_LIMIT).await?,
        playlists: playlists::search_by_title(&state.db, q, SEARCH_LIMIT).await?,
    })
}
