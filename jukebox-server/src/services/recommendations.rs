//! Song recommendations
//!
//! Songs by artists the user has liked (excluding liked and own songs),
//! most played first. Users without usable likes get the most played songs
//! they haven't liked.

use jukebox_common::models::Song;

use crate::db::songs;
use crate::error::ApiResult;
use crate::AppState;

pub const RECOMMENDATION_LIMIT: i64 = 20;

pub async fn for_user(state: &AppState, user_id: &str) -> ApiResult<Vec<Song>> {
    let by_artist = songs::by_liked_artists(&state.db, user_id, RECOMMENDATION_LIMIT).await?;
    if !by_artist.is_empty() {
        return Ok(by_artist);
    }

    Ok(songs::most_played_unliked(&state.db, user_id, RECOMMENDATION_LIMIT).await?)
}
