//! `users` table queries

use jukebox_common::models::UserProfile;
use serde_json::Value;
use sqlx::SqlitePool;

/// Full user row, including credentials
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserRow {
    pub id: String,
    pub email: String,
    pub password_hash: String,
    pub display_name: String,
    pub avatar_url: Option<String>,
    pub refresh_token: Option<String>,
    pub is_verified: bool,
    /// JSON text
    pub preferences: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl UserRow {
    /// Strip credentials for API output
    pub fn into_profile(self) -> UserProfile {
        UserProfile {
            id: self.id,
            email: self.email,
            display_name: self.display_name,
            avatar_url: self.avatar_url,
            is_verified: self.is_verified,
            preferences: self
                .preferences
                .and_then(|p| serde_json::from_str::<Value>(&p).ok()),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Fields for a new user row
pub struct NewUser<'a> {
    pub id: &'a str,
    pub email: &'a str,
    pub password_hash: &'a str,
    pub display_name: &'a str,
    pub refresh_token: &'a str,
    pub now: &'a str,
}

pub async fn insert(db: &SqlitePool, user: &NewUser<'_>) -> sqlx::Result<()> {
    sqlx::query(
        r#"
        INSERT INTO users (id, email, password_hash, display_name, refresh_token, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(user.id)
    .bind(user.email)
    .bind(user.password_hash)
    .bind(user.display_name)
    .bind(user.refresh_token)
    .bind(user.now)
    .bind(user.now)
    .execute(db)
    .await?;

    Ok(())
}

pub async fn find_by_id(db: &SqlitePool, id: &str) -> sqlx::Result<Option<UserRow>> {
    sqlx::query_as("SELECT * FROM users WHERE id = ?")
        .bind(id)
        .fetch_optional(db)
        .await
}

pub async fn find_by_email(db: &SqlitePool, email: &str) -> sqlx::Result<Option<UserRow>> {
    sqlx::query_as("SELECT * FROM users WHERE email = ?")
        .bind(email)
        .fetch_optional(db)
        .await
}

/// Overwrite (or clear, with `None`) the stored refresh token
pub async fn set_refresh_token(
    db: &SqlitePool,
    id: &str,
    token: Option<&str>,
) -> sqlx::Result<bool> {
    let result = sqlx::query("UPDATE users SET refresh_token = ? WHERE id = ?")
        .bind(token)
        .bind(id)
        .execute(db)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Replace the refresh token only if it still equals `expected`
///
/// Compare-and-swap in one statement, so two concurrent refreshes with the
/// same token cannot both succeed.
pub async fn rotate_refresh_token(
    db: &SqlitePool,
    id: &str,
    expected: &str,
    replacement: &str,
) -> sqlx::Result<bool> {
    let result = sqlx::query(
        "UPDATE users SET refresh_token = ? WHERE id = ? AND refresh_token IS NOT NULL AND refresh_token = ?",
    )
    .bind(replacement)
    .bind(id)
    .bind(expected)
    .execute(db)
    .await?;

    Ok(result.rows_affected() == 1)
}

/// Update profile fields; `None` leaves a column unchanged
pub async fn update_profile(
    db: &SqlitePool,
    id: &str,
    display_name: Option<&str>,
    avatar_url: Option<&str>,
    preferences: Option<&str>,
    now: &str,
) -> sqlx::Result<()> {
    sqlx::query(
        r#"
        UPDATE users SET
            display_name = COALESCE(?, display_name),
            avatar_url = COALESCE(?, avatar_url),
            preferences = COALESCE(?, preferences),
            updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(display_name)
    .bind(avatar_url)
    .bind(preferences)
    .bind(now)
    .bind(id)
    .execute(db)
    .await?;

    Ok(())
}
