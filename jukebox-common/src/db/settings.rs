//! Key-value settings stored in the `settings` table

use crate::Result;
use sqlx::SqlitePool;
use tracing::info;

/// Settings key holding the generated access-token signing secret
pub const JWT_SECRET_KEY: &str = "jwt_secret";

/// Read a setting value
pub async fn get_setting(db: &SqlitePool, key: &str) -> Result<Option<String>> {
    let value: Option<Option<String>> =
        sqlx::query_scalar("SELECT value FROM settings WHERE key = ?")
            .bind(key)
            .fetch_optional(db)
            .await?;

    Ok(value.flatten())
}

/// Insert or replace a setting value
pub async fn set_setting(db: &SqlitePool, key: &str, value: &str) -> Result<()> {
    sqlx::query(
        "INSERT OR REPLACE INTO settings (key, value, updated_at) VALUES (?, ?, CURRENT_TIMESTAMP)",
    )
    .bind(key)
    .bind(value)
    .execute(db)
    .await?;

    Ok(())
}

/// Load the signing secret for access tokens, generating it on first use
///
/// The secret survives restarts so previously issued access tokens remain
/// valid until they expire.
pub async fn load_or_init_jwt_secret(db: &SqlitePool) -> Result<String> {
    match get_setting(db, JWT_SECRET_KEY).await? {
        Some(secret) if !secret.is_empty() => Ok(secret),
        _ => initialize_jwt_secret(db).await,
    }
}

/// Generate and store a fresh random secret (64 hex chars)
pub async fn initialize_jwt_secret(db: &SqlitePool) -> Result<String> {
    use rand::RngCore;

    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    let secret: String = bytes.iter().map(|b| format!("{:02x}", b)).collect();

    set_setting(db, JWT_SECRET_KEY, &secret).await?;
    info!("Generated new access token signing secret");

    Ok(secret)
}
