//! Shared setup for router integration tests

#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    response::Response,
    Router,
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

use jukebox_common::db::init_database;
use jukebox_server::metadata::MusicBrainzClient;
use jukebox_server::{build_router, AppState, ServerSettings};

/// Lowest cost bcrypt accepts
pub const TEST_BCRYPT_COST: u32 = 4;

pub const TEST_PASSWORD: &str = "correct-horse";

/// Router plus its state, backed by a temp root folder
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub root: TempDir,
}

/// Registered user with the tokens from registration
#[derive(Debug, Clone)]
pub struct TestUser {
    pub id: String,
    pub email: String,
    pub access_token: String,
    pub refresh_token: String,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_musicbrainz(None).await
    }

    pub async fn with_musicbrainz(musicbrainz: Option<MusicBrainzClient>) -> Self {
        let root = TempDir::new().expect("temp dir");
        let db = init_database(&root.path().join("jukebox.db"))
            .await
            .expect("database");

        let settings = ServerSettings {
            root_folder: root.path().to_path_buf(),
            jwt_secret: "test-secret".to_string(),
            access_token_ttl_secs: 900,
            bcrypt_cost: TEST_BCRYPT_COST,
            media_base_url: "https://media.test".to_string(),
            musicbrainz,
        };

        let state = AppState::new(db, settings);
        state.storage.ensure_directories().expect("upload dirs");

        Self {
            router: build_router(state.clone()),
            state,
            root,
        }
    }

    pub async fn send(&self, request: Request<Body>) -> Response {
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible")
    }

    /// Send a JSON request and decode the JSON answer (`Value::Null` for an
    /// empty body)
    pub async fn json(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }

        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("request");

        let response = self.send(request).await;
        let status = response.status();
        let bytes = body_bytes(response).await;
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("JSON body")
        };
        (status, value)
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.json(Method::GET, uri, token, None).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.json(Method::POST, uri, token, Some(body)).await
    }

    pub async fn put(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.json(Method::PUT, uri, token, Some(body)).await
    }

    pub async fn delete(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.json(Method::DELETE, uri, token, None).await
    }

    pub async fn register(&self, email: &str) -> TestUser {
        let (status, body) = self
            .post(
                "/auth/register",
                None,
                json!({"email": email, "password": TEST_PASSWORD, "display_name": "Tester"}),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "register failed: {}", body);
        user_from_auth(&body)
    }

    /// Create a song row through `POST /songs`
    pub async fn create_song(&self, token: &str, title: &str, artist: &str) -> String {
        let (status, body) = self
            .post(
                "/songs",
                Some(token),
                json!({
                    "title": title,
                    "artist": artist,
                    "file_path": format!("uploads/songs/{}.mp3", title.replace(' ', "_")),
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "create song failed: {}", body);
        body["id"].as_str().expect("song id").to_string()
    }

    /// Write a file under the root folder and return its stored path
    pub fn write_upload(&self, name: &str, contents: &[u8]) -> String {
        let relative = format!("uploads/songs/{}", name);
        std::fs::write(self.root.path().join(&relative), contents).expect("write upload");
        relative
    }

    pub async fn create_playlist(&self, token: &str, title: &str) -> String {
        let (status, body) = self.post("/playlists", Some(token), json!({"title": title})).await;
        assert_eq!(status, StatusCode::CREATED, "create playlist failed: {}", body);
        body["id"].as_str().expect("playlist id").to_string()
    }
}

pub fn user_from_auth(body: &Value) -> TestUser {
    TestUser {
        id: body["user"]["id"].as_str().expect("user id").to_string(),
        email: body["user"]["email"].as_str().expect("email").to_string(),
        access_token: body["access_token"].as_str().expect("access token").to_string(),
        refresh_token: body["refresh_token"].as_str().expect("refresh token").to_string(),
    }
}

pub async fn body_bytes(response: Response) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .expect("body")
        .to_bytes()
        .to_vec()
}

/// Song ids of a playlist detail body, in position order
pub fn playlist_song_ids(body: &Value) -> Vec<String> {
    body["songs"]
        .as_array()
        .expect("songs array")
        .iter()
        .map(|s| s["id"].as_str().expect("song id").to_string())
        .collect()
}

pub fn playlist_positions(body: &Value) -> Vec<i64> {
    body["songs"]
        .as_array()
        .expect("songs array")
        .iter()
        .map(|s| s["position"].as_i64().expect("position"))
        .collect()
}
