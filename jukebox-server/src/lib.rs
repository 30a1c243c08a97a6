//! jukebox-server library
//!
//! REST service for the jukebox music library: accounts and token
//! refresh, songs and uploads, playlists, comments, likes, search and
//! recommendations. Exposed as a library so integration tests can drive the
//! router directly.

pub mod api;
pub mod auth;
pub mod db;
pub mod error;
pub mod metadata;
pub mod pagination;
pub mod services;

pub use crate::error::{ApiError, ApiResult};

use axum::Router;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use std::path::PathBuf;
use tower_http::trace::TraceLayer;

use crate::auth::TokenKeys;
use crate::metadata::{MetadataResolver, MusicBrainzClient};
use crate::services::storage::Storage;

/// Largest accepted request body (uploads carry audio files)
pub const MAX_UPLOAD_BYTES: usize = 100 * 1024 * 1024;

/// Runtime settings resolved by the binary from CLI, env and TOML
pub struct ServerSettings {
    pub root_folder: PathBuf,
    pub jwt_secret: String,
    pub access_token_ttl_secs: u64,
    pub bcrypt_cost: u32,
    /// Prefix for `GET /media/:id` URLs
    pub media_base_url: String,
    /// `None` disables the MusicBrainz lookup during upload
    pub musicbrainz: Option<MusicBrainzClient>,
}

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
    /// Access token signing keys
    pub tokens: TokenKeys,
    pub bcrypt_cost: u32,
    pub resolver: MetadataResolver,
    /// Upload directories under the root folder
    pub storage: Storage,
    pub media_base_url: String,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(db: SqlitePool, settings: ServerSettings) -> Self {
        Self {
            db,
            tokens: TokenKeys::new(settings.jwt_secret.as_bytes(), settings.access_token_ttl_secs),
            bcrypt_cost: settings.bcrypt_cost,
            resolver: MetadataResolver::new(settings.musicbrainz),
            storage: Storage::new(settings.root_folder),
            media_base_url: settings.media_base_url.trim_end_matches('/').to_string(),
            startup_time: Utc::now(),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::auth_routes())
        .merge(api::user_routes())
        .merge(api::song_routes())
        .merge(api::upload_routes())
        .merge(api::playlist_routes())
        .merge(api::comment_routes())
        .merge(api::media_routes())
        .merge(api::analytics_routes())
        .merge(api::search_routes())
        .merge(api::recommendation_routes())
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
