//! Resource models shared by the server (as query rows) and the client (as
//! response bodies)
//!
//! Timestamps are RFC 3339 strings, ids are UUIDv4 strings.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Uploaded or registered song
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Song {
    pub id: String,
    pub title: String,
    pub artist: String,
    pub album: Option<String>,
    /// Server-side path of the audio file (None for metadata-only rows)
    pub file_path: Option<String>,
    pub cover_path: Option<String>,
    /// Duration in whole seconds
    pub duration: Option<i64>,
    pub explicit: bool,
    pub owner_id: String,
    pub play_count: i64,
    pub uploaded_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Playlist {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub owner_id: String,
    pub created_at: String,
    pub updated_at: String,
}

/// One song inside a playlist, with its 1-based position
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct PlaylistEntry {
    pub position: i64,
    pub added_at: String,
    #[cfg_attr(feature = "sqlx", sqlx(flatten))]
    pub song: Song,
}

/// Playlist with its songs ordered by position
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaylistDetail {
    #[serde(flatten)]
    pub playlist: Playlist,
    pub songs: Vec<PlaylistEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Comment {
    pub id: String,
    pub song_id: String,
    pub author_id: String,
    pub content: String,
    /// Optional 1-5 star rating
    pub rating: Option<i64>,
    pub is_flagged: bool,
    pub created_at: String,
    pub updated_at: String,
}

/// User as exposed over the API: never carries the password hash or the
/// refresh token
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    pub email: String,
    pub display_name: String,
    pub avatar_url: Option<String>,
    pub is_verified: bool,
    pub preferences: Option<Value>,
    pub created_at: String,
    pub updated_at: String,
}
