//! Typed API client with silent token refresh
//!
//! Every authenticated request carries `Authorization: Bearer <access>`.
//! A 401 answer triggers at most one refresh (shared across concurrent
//! requests through [`RefreshCoordinator`]) and one retry; a second 401 is
//! returned to the caller. A failed refresh clears the session.

use jukebox_common::api::{
    AuthResponse, CreateCommentRequest, CreatePlaylistRequest, ErrorResponse, LoginRequest,
    Paginated, RefreshRequest, RegisterRequest, ReorderPlaylistRequest, SearchResponse,
    SongSearchQuery, UpdateUserRequest,
};
use jukebox_common::models::{Comment, Playlist, PlaylistDetail, Song, UserProfile};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::error::{ClientError, Result};
use crate::refresh::{RefreshCoordinator, Ticket};
use crate::session::{Session, SessionStore};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// One logical API call, rebuildable for the retry
#[derive(Debug, Clone)]
struct ApiRequest {
    method: Method,
    path: String,
    query: Vec<(String, String)>,
    body: Option<Value>,
    authenticated: bool,
}

impl ApiRequest {
    fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
            authenticated: true,
        }
    }

    fn json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    fn query(mut self, key: &str, value: Option<impl ToString>) -> Self {
        if let Some(value) = value {
            self.query.push((key.to_string(), value.to_string()));
        }
        self
    }

    fn anonymous(mut self) -> Self {
        self.authenticated = false;
        self
    }
}

#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    session: Arc<SessionStore>,
    refresh: Arc<RefreshCoordinator>,
}

impl ApiClient {
    /// Client with a memory-only session
    pub fn new(base_url: &str) -> Result<Self> {
        Self::with_session(base_url, SessionStore::new())
    }

    pub fn with_session(base_url: &str, session: SessionStore) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            session: Arc::new(session),
            refresh: Arc::new(RefreshCoordinator::new()),
        })
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// URL the audio element would play
    pub fn stream_url(&self, song_id: &str) -> String {
        format!("{}/songs/{}/stream", self.base_url, song_id)
    }

    async fn send_once(&self, request: &ApiRequest, token: Option<&str>) -> Result<reqwest::Response> {
        let url = format!("{}{}", self.base_url, request.path);
        let mut builder = self.http.request(request.method.clone(), &url);

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }
        if let Some(token) = token {
            builder = builder.bearer_auth(token);
        }

        debug!(method = %request.method, url = %url, "Sending request");
        Ok(builder.send().await?)
    }

    /// Send with bearer, refresh-and-retry once on 401
    async fn execute(&self, request: ApiRequest) -> Result<reqwest::Response> {
        if !request.authenticated {
            return check(self.send_once(&request, None).await?).await;
        }

        let used = self.session.access_token();
        let response = self.send_once(&request, used.as_deref()).await?;
        if response.status() != StatusCode::UNAUTHORIZED {
            return check(response).await;
        }

        debug!(path = %request.path, "Access token rejected, refreshing");
        let fresh = self.refreshed_token(used.as_deref().unwrap_or_default()).await?;

        // Second failure goes to the caller as-is
        check(self.send_once(&request, Some(&fresh)).await?).await
    }

    /// Token to retry with after `used` was rejected
    async fn refreshed_token(&self, used: &str) -> Result<String> {
        let session = Arc::clone(&self.session);
        match self.refresh.join(used, move || session.access_token()) {
            Ticket::Ready(token) => Ok(token),
            Ticket::Waiter(rx) => rx.await.ok().flatten().ok_or(ClientError::SessionExpired),
            Ticket::Leader(guard) => match self.perform_refresh().await {
                Ok(token) => {
                    guard.finish(Some(token.clone()));
                    Ok(token)
                }
                Err(e) => {
                    warn!(error = %e, "Token refresh failed, signing out");
                    if let Err(clear_err) = self.session.clear().await {
                        warn!(error = %clear_err, "Failed to clear session");
                    }
                    guard.finish(None);
                    Err(ClientError::SessionExpired)
                }
            },
        }
    }

    /// Exchange the stored refresh token; the session holds the new pair
    /// before this returns
    async fn perform_refresh(&self) -> Result<String> {
        let session = self.session.get().ok_or(ClientError::NotAuthenticated)?;
        let refresh_token = session.refresh_token.ok_or(ClientError::NotAuthenticated)?;

        let request = ApiRequest::new(Method::POST, "/auth/refresh")
            .anonymous()
            .json(serde_json::to_value(RefreshRequest {
                user_id: session.user_id,
                refresh_token,
            })?);
        let auth: AuthResponse = decode(Box::pin(self.execute(request)).await?).await?;

        self.session
            .update_tokens(auth.tokens.access_token.clone(), auth.tokens.refresh_token)
            .await?;
        info!(user_id = %auth.user.id, "Access token refreshed");

        Ok(auth.tokens.access_token)
    }

    async fn call<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T> {
        decode(self.execute(request).await?).await
    }

    async fn start_session(&self, auth: AuthResponse) -> Result<UserProfile> {
        self.session
            .set(Session {
                user_id: auth.user.id.clone(),
                access_token: Some(auth.tokens.access_token),
                refresh_token: Some(auth.tokens.refresh_token),
                user: Some(auth.user.clone()),
            })
            .await?;
        Ok(auth.user)
    }

    // ========================================
    // Auth
    // ========================================

    pub async fn register(&self, email: &str, password: &str, display_name: &str) -> Result<UserProfile> {
        let body = serde_json::to_value(RegisterRequest {
            email: email.to_string(),
            password: password.to_string(),
            display_name: display_name.to_string(),
        })?;
        let auth = self
            .call(ApiRequest::new(Method::POST, "/auth/register").anonymous().json(body))
            .await?;
        self.start_session(auth).await
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<UserProfile> {
        let body = serde_json::to_value(LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        })?;
        let auth = self
            .call(ApiRequest::new(Method::POST, "/auth/login").anonymous().json(body))
            .await?;
        self.start_session(auth).await
    }

    /// Revoke the refresh token; the local session is cleared either way
    pub async fn logout(&self) -> Result<()> {
        let result = self.execute(ApiRequest::new(Method::POST, "/auth/logout")).await;
        self.session.clear().await?;
        result.map(|_| ())
    }

    /// Bring a persisted session back to life
    ///
    /// A refresh token without an access token triggers a refresh; either
    /// way the profile is fetched if missing. Returns `None` when there is
    /// nothing to restore.
    pub async fn restore(&self) -> Result<Option<UserProfile>> {
        let Some(session) = self.session.get() else {
            return Ok(None);
        };

        if session.access_token.is_none() {
            if session.refresh_token.is_none() {
                self.session.clear().await?;
                return Ok(None);
            }
            self.refreshed_token("").await?;
        } else if let Some(user) = session.user {
            return Ok(Some(user));
        }

        let user = self.me().await?;
        self.session.set_user(user.clone()).await?;
        Ok(Some(user))
    }

    // ========================================
    // Users
    // ========================================

    pub async fn me(&self) -> Result<UserProfile> {
        self.call(ApiRequest::new(Method::GET, "/users/me")).await
    }

    pub async fn update_me(&self, changes: &UpdateUserRequest) -> Result<UserProfile> {
        let user: UserProfile = self
            .call(ApiRequest::new(Method::PUT, "/users/me").json(serde_json::to_value(changes)?))
            .await?;
        self.session.set_user(user.clone()).await?;
        Ok(user)
    }

    // ========================================
    // Songs
    // ========================================

    pub async fn song(&self, song_id: &str) -> Result<Song> {
        self.call(ApiRequest::new(Method::GET, format!("/songs/{}", song_id)))
            .await
    }

    pub async fn search_songs(&self, query: &SongSearchQuery) -> Result<Paginated<Song>> {
        let request = ApiRequest::new(Method::GET, "/songs/search")
            .query("title", query.title.as_deref())
            .query("artist", query.artist.as_deref())
            .query("album", query.album.as_deref())
            .query("page", query.page)
            .query("page_size", query.page_size);
        self.call(request).await
    }

    pub async fn liked_songs(&self, page: Option<i64>, page_size: Option<i64>) -> Result<Paginated<Song>> {
        let request = ApiRequest::new(Method::GET, "/songs/liked")
            .query("page", page)
            .query("page_size", page_size);
        self.call(request).await
    }

    pub async fn like_song(&self, song_id: &str) -> Result<()> {
        self.execute(ApiRequest::new(Method::POST, format!("/songs/{}/like", song_id)))
            .await
            .map(|_| ())
    }

    pub async fn unlike_song(&self, song_id: &str) -> Result<()> {
        self.execute(ApiRequest::new(Method::DELETE, format!("/songs/{}/like", song_id)))
            .await
            .map(|_| ())
    }

    /// Whole audio body of a song (counts as a play)
    pub async fn stream_song(&self, song_id: &str) -> Result<Vec<u8>> {
        let response = self
            .execute(ApiRequest::new(Method::GET, format!("/songs/{}/stream", song_id)))
            .await?;
        Ok(response.bytes().await?.to_vec())
    }

    // ========================================
    // Playlists
    // ========================================

    pub async fn playlists(&self) -> Result<Vec<Playlist>> {
        self.call(ApiRequest::new(Method::GET, "/playlists")).await
    }

    pub async fn playlist(&self, playlist_id: &str) -> Result<PlaylistDetail> {
        self.call(ApiRequest::new(Method::GET, format!("/playlists/{}", playlist_id)))
            .await
    }

    pub async fn create_playlist(&self, request: &CreatePlaylistRequest) -> Result<PlaylistDetail> {
        self.call(ApiRequest::new(Method::POST, "/playlists").json(serde_json::to_value(request)?))
            .await
    }

    pub async fn add_song_to_playlist(&self, playlist_id: &str, song_id: &str) -> Result<PlaylistDetail> {
        let request = ApiRequest::new(Method::POST, format!("/playlists/{}/songs", playlist_id))
            .json(json!({ "song_id": song_id }));
        self.call(request).await
    }

    pub async fn remove_song_from_playlist(
        &self,
        playlist_id: &str,
        song_id: &str,
    ) -> Result<PlaylistDetail> {
        self.call(ApiRequest::new(
            Method::DELETE,
            format!("/playlists/{}/songs/{}", playlist_id, song_id),
        ))
        .await
    }

    pub async fn reorder_playlist(&self, playlist_id: &str, song_ids: Vec<String>) -> Result<PlaylistDetail> {
        let body = serde_json::to_value(ReorderPlaylistRequest { song_ids })?;
        self.call(ApiRequest::new(Method::PUT, format!("/playlists/{}/reorder", playlist_id)).json(body))
            .await
    }

    pub async fn delete_playlist(&self, playlist_id: &str) -> Result<()> {
        self.execute(ApiRequest::new(Method::DELETE, format!("/playlists/{}", playlist_id)))
            .await
            .map(|_| ())
    }

    // ========================================
    // Comments, search, recommendations
    // ========================================

    pub async fn add_comment(&self, request: &CreateCommentRequest) -> Result<Comment> {
        self.call(ApiRequest::new(Method::POST, "/comments").json(serde_json::to_value(request)?))
            .await
    }

    pub async fn search(&self, q: &str) -> Result<SearchResponse> {
        self.call(ApiRequest::new(Method::GET, "/search").anonymous().query("q", Some(q)))
            .await
    }

    pub async fn recommendations(&self) -> Result<Vec<Song>> {
        self.call(ApiRequest::new(Method::GET, "/recommendations")).await
    }
}

/// Pass successes through; turn error statuses into [`ClientError::Api`]
async fn check(response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let text = response.text().await.unwrap_or_default();
    let (code, message) = match serde_json::from_str::<ErrorResponse>(&text) {
        Ok(body) => (Some(body.error.code), body.error.message),
        Err(_) if text.is_empty() => (None, status.to_string()),
        Err(_) => (None, text),
    };

    Err(ClientError::Api {
        status: status.as_u16(),
        code,
        message,
    })
}

async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    let bytes = response.bytes().await?;
    Ok(serde_json::from_slice(&bytes)?)
}
