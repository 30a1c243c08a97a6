//! HTTP API handlers for jukebox-server
//!
//! Handlers stay thin: extract, call into [`crate::services`], wrap the
//! result in JSON. Each submodule exposes a `*_routes()` builder merged by
//! [`crate::build_router`].

pub mod auth;
pub mod comments;
pub mod health;
pub mod media;
pub mod playlists;
pub mod search;
pub mod songs;
pub mod upload;
pub mod users;

pub use auth::auth_routes;
pub use comments::comment_routes;
pub use health::health_routes;
pub use media::{analytics_routes, media_routes};
pub use playlists::playlist_routes;
pub use search::{recommendation_routes, search_routes};
pub use songs::song_routes;
pub use upload::upload_routes;
pub use users::user_routes;
