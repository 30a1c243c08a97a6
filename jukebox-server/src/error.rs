//! Error types for jukebox-server
//!
//! Every failing handler answers with
//! `{"error": {"code": "...", "message": "..."}}` and a status derived from
//! the variant.

use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use jukebox_common::api::{ErrorDetail, ErrorResponse, ERROR_CODE_TOKEN_INVALID};
use thiserror::Error;
use tracing::error;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Validation or ownership failure (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Bad credentials or rejected refresh token (401)
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Missing, malformed or expired bearer access token (401, code
    /// `TOKEN_INVALID`)
    #[error("Invalid access token: {0}")]
    TokenInvalid(String),

    /// Resource not found (404)
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Conflict (409), e.g. email already registered
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Internal server error (500)
    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error
    #[error(transparent)]
    Other(#[from] anyhow::Error),

    /// jukebox-common error
    #[error("Common error: {0}")]
    Common(#[from] jukebox_common::Error),
}

impl ApiError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            ApiError::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            ApiError::TokenInvalid(_) => (StatusCode::UNAUTHORIZED, ERROR_CODE_TOKEN_INVALID),
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            ApiError::Conflict(_) => (StatusCode::CONFLICT, "CONFLICT"),
            ApiError::Internal(_) | ApiError::Other(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
            }
            ApiError::Database(_) => (StatusCode::INTERNAL_SERVER_ERROR, "DATABASE_ERROR"),
            ApiError::Io(_) => (StatusCode::INTERNAL_SERVER_ERROR, "IO_ERROR"),
            ApiError::Common(err) => match err {
                jukebox_common::Error::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
                jukebox_common::Error::InvalidInput(_) => {
                    (StatusCode::BAD_REQUEST, "BAD_REQUEST")
                }
                _ => (StatusCode::INTERNAL_SERVER_ERROR, "COMMON_ERROR"),
            },
        }
    }

    /// Message shown to the client
    ///
    /// Client-caused errors carry their own text; server-side failures are
    /// logged in full and reported generically.
    fn public_message(&self) -> String {
        match self {
            ApiError::BadRequest(msg)
            | ApiError::Unauthorized(msg)
            | ApiError::TokenInvalid(msg)
            | ApiError::NotFound(msg)
            | ApiError::Conflict(msg) => msg.clone(),
            ApiError::Common(jukebox_common::Error::NotFound(msg))
            | ApiError::Common(jukebox_common::Error::InvalidInput(msg)) => msg.clone(),
            _ => "Internal server error".to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        if status.is_server_error() {
            error!(error = %self, "Request failed");
        }

        let body = Json(ErrorResponse {
            error: ErrorDetail {
                code: code.to_string(),
                message: self.public_message(),
            },
        });

        (status, body).into_response()
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        ApiError::BadRequest(format!("Malformed multipart body: {}", err))
    }
}

/// Result type for API handlers and services
pub type ApiResult<T> = Result<T, ApiError>;
