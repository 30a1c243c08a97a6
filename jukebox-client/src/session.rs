//! Signed-in session state
//!
//! Memory is the source of truth; the optional JSON file lets a session
//! survive restarts. Locks are never held across an await.

use jukebox_common::models::UserProfile;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, warn};

use crate::error::Result;

/// Tokens and profile of the signed-in user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub user_id: String,
    /// `None` after a restart that only kept the refresh token
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub user: Option<UserProfile>,
}

/// `<data_local_dir>/jukebox/session.json`
pub fn default_session_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("jukebox")
        .join("session.json")
}

#[derive(Debug, Default)]
pub struct SessionStore {
    session: RwLock<Option<Session>>,
    path: Option<PathBuf>,
}

impl SessionStore {
    /// Memory-only store
    pub fn new() -> Self {
        Self::default()
    }

    /// Store backed by `path`, starting from its contents if present
    ///
    /// An unreadable or corrupt file starts an empty session.
    pub async fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let session = match tokio::fs::read_to_string(&path).await {
            Ok(content) => match serde_json::from_str::<Session>(&content) {
                Ok(session) => Some(session),
                Err(e) => {
                    warn!(file = %path.display(), error = %e, "Ignoring corrupt session file");
                    None
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => {
                warn!(file = %path.display(), error = %e, "Failed to read session file");
                None
            }
        };

        Self {
            session: RwLock::new(session),
            path: Some(path),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn read(&self) -> RwLockReadGuard<'_, Option<Session>> {
        self.session.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Option<Session>> {
        self.session.write().unwrap_or_else(|e| e.into_inner())
    }

    pub fn get(&self) -> Option<Session> {
        self.read().clone()
    }

    pub fn access_token(&self) -> Option<String> {
        self.read().as_ref().and_then(|s| s.access_token.clone())
    }

    pub fn refresh_token(&self) -> Option<String> {
        self.read().as_ref().and_then(|s| s.refresh_token.clone())
    }

    pub fn is_signed_in(&self) -> bool {
        self.read().is_some()
    }

    pub async fn set(&self, session: Session) -> Result<()> {
        *self.write() = Some(session);
        self.persist().await
    }

    /// Replace both tokens after a refresh; no-op without a session
    pub async fn update_tokens(&self, access_token: String, refresh_token: String) -> Result<()> {
        {
            let mut guard = self.write();
            match guard.as_mut() {
                Some(session) => {
                    session.access_token = Some(access_token);
                    session.refresh_token = Some(refresh_token);
                }
                None => return Ok(()),
            }
        }
        self.persist().await
    }

    pub async fn set_user(&self, user: UserProfile) -> Result<()> {
        {
            let mut guard = self.write();
            match guard.as_mut() {
                Some(session) => session.user = Some(user),
                None => return Ok(()),
            }
        }
        self.persist().await
    }

    /// Forget the session and delete the file
    pub async fn clear(&self) -> Result<()> {
        *self.write() = None;

        if let Some(path) = &self.path {
            match tokio::fs::remove_file(path).await {
                Ok(()) => debug!(file = %path.display(), "Removed session file"),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }

    /// Write the current session (temp file + rename)
    async fn persist(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let Some(session) = self.get() else {
            return Ok(());
        };

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let json = serde_json::to_string_pretty(&session)?;
        let tmp_path = path.with_extension("json.tmp");
        tokio::fs::write(&tmp_path, json).await?;
        tokio::fs::rename(&tmp_path, path).await?;

        Ok(())
    }
}
