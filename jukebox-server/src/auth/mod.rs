//! Access/refresh token handling, password hashing and the bearer extractor

pub mod extractor;
pub mod password;
pub mod tokens;

pub use extractor::AuthUser;
pub use tokens::{generate_refresh_token, Claims, TokenKeys};
