//! Shared API request/response types
//!
//! The JSON contract between `jukebox-server` handlers and the
//! `jukebox-client` library. Field names are snake_case on the wire.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::{Playlist, Song, UserProfile};

/// Error code returned with 401 when the bearer access token is missing,
/// malformed or expired. The client treats it as the refresh trigger.
pub const ERROR_CODE_TOKEN_INVALID: &str = "TOKEN_INVALID";

/// Default page size for paginated listings
pub const DEFAULT_PAGE_SIZE: i64 = 20;

/// Upper bound on a requested page size
pub const MAX_PAGE_SIZE: i64 = 100;

// ========================================
// Authentication
// ========================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub display_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Body of `POST /auth/refresh`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshRequest {
    pub user_id: String,
    pub refresh_token: String,
}

/// Short-lived signed access token plus opaque single-use refresh token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Response of register, login and refresh
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub user: UserProfile,
    #[serde(flatten)]
    pub tokens: TokenPair,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

// ========================================
// Users
// ========================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateUserRequest {
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub preferences: Option<Value>,
}

// ========================================
// Songs
// ========================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSongRequest {
    pub title: String,
    #[serde(default)]
    pub artist: String,
    #[serde(default)]
    pub album: Option<String>,
    #[serde(default)]
    pub cover_path: Option<String>,
    #[serde(default)]
    pub duration: Option<i64>,
    #[serde(default)]
    pub explicit: Option<bool>,
    pub file_path: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateSongRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub artist: Option<String>,
    #[serde(default)]
    pub album: Option<String>,
    #[serde(default)]
    pub cover_path: Option<String>,
    #[serde(default)]
    pub duration: Option<i64>,
    #[serde(default)]
    pub explicit: Option<bool>,
    #[serde(default)]
    pub file_path: Option<String>,
}

/// Query string of `GET /songs/search`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SongSearchQuery {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub artist: Option<String>,
    #[serde(default)]
    pub album: Option<String>,
    #[serde(default)]
    pub page: Option<i64>,
    #[serde(default)]
    pub page_size: Option<i64>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct PageQuery {
    #[serde(default)]
    pub page: Option<i64>,
    #[serde(default)]
    pub page_size: Option<i64>,
}

/// One page of results
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paginated<T> {
    pub data: Vec<T>,
    pub page: i64,
    pub page_size: i64,
    pub total: i64,
    pub total_pages: i64,
}

// ========================================
// Playlists
// ========================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePlaylistRequest {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Optional first song (placed at position 1)
    #[serde(default)]
    pub song_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddPlaylistSongRequest {
    pub song_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReorderPlaylistRequest {
    pub song_ids: Vec<String>,
}

// ========================================
// Comments
// ========================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCommentRequest {
    pub song_id: String,
    pub content: String,
    #[serde(default)]
    pub rating: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateCommentRequest {
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub rating: Option<i64>,
}

// ========================================
// Media, analytics, search
// ========================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaResponse {
    pub id: String,
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayCountQuery {
    pub song_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayCountResponse {
    pub song_id: String,
    pub play_count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    pub songs: Vec<Song>,
    pub playlists: Vec<Playlist>,
}

// ========================================
// Error Response Types
// ========================================

/// Error body returned by every failing endpoint
///
/// ```json
/// {"error": {"code": "NOT_FOUND", "message": "Song not found"}}
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_response_flattens_tokens() {
        let response = AuthResponse {
            user: UserProfile {
                id: "u1".to_string(),
                email: "a@example.com".to_string(),
                display_name: "A".to_string(),
                avatar_url: None,
                is_verified: false,
                preferences: None,
                created_at: "2025-01-01T00:00:00.000Z".to_string(),
                updated_at: "2025-01-01T00:00:00.000Z".to_string(),
            },
            tokens: TokenPair {
                access_token: "access".to_string(),
                refresh_token: "refresh".to_string(),
            },
        };

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["access_token"], "access");
        assert_eq!(json["refresh_token"], "refresh");
        assert_eq!(json["user"]["email"], "a@example.com");
        assert!(json["user"].get("refresh_token").is_none());
    }

    #[test]
    fn test_create_song_request_defaults_artist() {
        let req: CreateSongRequest =
            serde_json::from_str(r#"{"title": "T", "file_path": "uploads/songs/x.mp3"}"#).unwrap();
        assert_eq!(req.artist, "");
        assert!(req.explicit.is_none());
    }
}
