//! Error types for jukebox-client

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    /// Transport failure (connection refused, timeout, bad body)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success answer from the server
    #[error("API error ({status}): {message}")]
    Api {
        status: u16,
        /// `error.code` from the body, when the server sent one
        code: Option<String>,
        message: String,
    },

    /// Token refresh failed; the session has been cleared
    #[error("Session expired")]
    SessionExpired,

    /// Operation needs a signed-in session
    #[error("Not authenticated")]
    NotAuthenticated,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ClientError {
    /// HTTP status of an API error
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            ClientError::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;
