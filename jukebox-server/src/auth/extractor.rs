//! Bearer token extractor
//!
//! Handlers that take an [`AuthUser`] argument require
//! `Authorization: Bearer <access token>`. Any failure answers 401 with code
//! `TOKEN_INVALID`, which is what the client watches for to start a refresh.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};

use crate::error::ApiError;
use crate::AppState;

/// Authenticated caller, taken from verified access token claims
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub id: String,
    pub email: String,
}

/// Pull the token out of an `Authorization` header value
pub fn bearer_token(header_value: &str) -> Option<&str> {
    let (scheme, token) = header_value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .ok_or_else(|| ApiError::TokenInvalid("Missing bearer token".to_string()))?
            .to_str()
            .map_err(|_| ApiError::TokenInvalid("Malformed Authorization header".to_string()))?;

        let token = bearer_token(header)
            .ok_or_else(|| ApiError::TokenInvalid("Expected Bearer scheme".to_string()))?;

        let claims = state.tokens.verify_access_token(token)?;

        Ok(AuthUser {
            id: claims.sub,
            email: claims.email,
        })
    }
}
