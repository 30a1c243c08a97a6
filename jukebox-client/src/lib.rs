//! jukebox-client
//!
//! HTTP client for the jukebox server:
//! - [`ApiClient`] attaches the bearer token and, when a request comes back
//!   401, refreshes the session once and retries
//! - [`SessionStore`] holds the tokens, optionally persisted to a JSON file
//! - [`PlayerQueue`] is the playback queue with repeat and shuffle

pub mod client;
pub mod error;
pub mod player;
pub mod refresh;
pub mod session;

pub use client::ApiClient;
pub use error::{ClientError, Result};
pub use player::{PlayerQueue, Repeat, Track};
pub use refresh::RefreshCoordinator;
pub use session::{Session, SessionStore};
