//! Song comments with optional 1-5 ratings

use jukebox_common::api::{CreateCommentRequest, UpdateCommentRequest};
use jukebox_common::models::Comment;
use jukebox_common::{time, uuid_utils};
use tracing::info;

use crate::db::{comments, songs};
use crate::error::{ApiError, ApiResult};
use crate::AppState;

fn validate_rating(rating: Option<i64>) -> ApiResult<()> {
    match rating {
        Some(r) if !(1..=5).contains(&r) => Err(ApiError::BadRequest(
            "Rating must be between 1 and 5".to_string(),
        )),
        _ => Ok(()),
    }
}

fn validate_content(content: &str) -> ApiResult<String> {
    let content = content.trim();
    if content.is_empty() {
        return Err(ApiError::BadRequest("Comment cannot be empty".to_string()));
    }
    Ok(content.to_string())
}

pub async fn get(state: &AppState, comment_id: &str) -> ApiResult<Comment> {
    comments::find_by_id(&state.db, comment_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Comment not found".to_string()))
}

/// Missing → 404; written by someone else → 400
async fn get_authored(state: &AppState, user_id: &str, comment_id: &str) -> ApiResult<Comment> {
    let comment = get(state, comment_id).await?;
    if comment.author_id != user_id {
        return Err(ApiError::BadRequest("You are not the author of this comment".to_string()));
    }
    Ok(comment)
}

pub async fn create(
    state: &AppState,
    author_id: &str,
    request: CreateCommentRequest,
) -> ApiResult<Comment> {
    let content = validate_content(&request.content)?;
    validate_rating(request.rating)?;

    if !songs::exists(&state.db, &request.song_id).await? {
        return Err(ApiError::NotFound("Song not found".to_string()));
    }

    let id = uuid_utils::generate_string();
    comments::insert(
        &state.db,
        &id,
        &request.song_id,
        author_id,
        &content,
        request.rating,
        &time::now_rfc3339(),
    )
    .await?;

    info!(comment_id = %id, song_id = %request.song_id, "Created comment");
    get(state, &id).await
}

pub async fn update(
    state: &AppState,
    user_id: &str,
    comment_id: &str,
    request: UpdateCommentRequest,
) -> ApiResult<Comment> {
    get_authored(state, user_id, comment_id).await?;

    let content = request.content.as_deref().map(validate_content).transpose()?;
    validate_rating(request.rating)?;

    comments::update(
        &state.db,
        comment_id,
        content.as_deref(),
        request.rating,
        &time::now_rfc3339(),
    )
    .await?;

    get(state, comment_id).await
}

pub async fn delete(state: &AppState, user_id: &str, comment_id: &str) -> ApiResult<()> {
    get_authored(state, user_id, comment_id).await?;
    comments::delete(&state.db, comment_id).await?;
    Ok(())
}

/// Mark a comment for moderation; any signed-in user may flag
pub async fn flag(state: &AppState, comment_id: &str) -> ApiResult<Comment> {
    get(state, comment_id).await?;
    comments::set_flagged(&state.db, comment_id).await?;
    info!(comment_id = %comment_id, "Comment flagged");
    get(state, comment_id).await
}
