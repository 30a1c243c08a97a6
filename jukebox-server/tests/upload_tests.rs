//! Multipart upload and metadata resolution

mod helpers;

use axum::{
    body::Body,
    extract::Query,
    http::{header, Method, Request, StatusCode},
    routing::get,
    Json, Router,
};
use helpers::{body_bytes, TestApp};
use jukebox_common::config::MusicBrainzConfig;
use jukebox_server::metadata::MusicBrainzClient;
use serde_json::{json, Value};
use std::collections::HashMap;

const BOUNDARY: &str = "jukebox-test-boundary";

enum Part<'a> {
    Text(&'a str, &'a str),
    File {
        name: &'a str,
        content_type: &'a str,
        bytes: &'a [u8],
    },
}

fn multipart_body(parts: &[Part<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        match part {
            Part::Text(name, value) => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n", name, value)
                        .as_bytes(),
                );
            }
            Part::File {
                name,
                content_type,
                bytes,
            } => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"files\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
                        name, content_type
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(bytes);
                body.extend_from_slice(b"\r\n");
            }
        }
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

async fn upload(app: &TestApp, token: &str, parts: &[Part<'_>]) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(Method::POST)
        .uri("/songs/upload")
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(multipart_body(parts)))
        .unwrap();

    let response = app.send(request).await;
    let status = response.status();
    let body = serde_json::from_slice(&body_bytes(response).await).unwrap_or(Value::Null);
    (status, body)
}

fn files_in(app: &TestApp, dir: &str) -> usize {
    std::fs::read_dir(app.root.path().join(dir))
        .map(|entries| entries.count())
        .unwrap_or(0)
}

#[tokio::test]
async fn test_upload_without_title_uses_filename_stem() {
    let app = TestApp::new().await;
    let user = app.register("uploader@example.com").await;

    let (status, body) = upload(
        &app,
        &user.access_token,
        &[
            Part::Text("title", "   "),
            Part::File {
                name: "my_track.mp3",
                content_type: "audio/mpeg",
                bytes: b"not really audio",
            },
            Part::File {
                name: "cover.png",
                content_type: "image/png",
                bytes: b"png-bytes",
            },
        ],
    )
    .await;

    assert_eq!(status, StatusCode::CREATED, "{}", body);
    assert_eq!(body["title"], "my_track");
    assert_eq!(body["artist"], "");
    assert_eq!(body["owner_id"], user.id.as_str());

    let file_path = body["file_path"].as_str().unwrap();
    assert!(file_path.starts_with("uploads/songs/"));
    assert!(file_path.ends_with(".mp3"));
    let stored = std::fs::read(app.root.path().join(file_path)).unwrap();
    assert_eq!(stored, b"not really audio");

    let cover_path = body["cover_path"].as_str().unwrap();
    assert!(cover_path.starts_with("uploads/thumbnails/"));
}

#[tokio::test]
async fn test_upload_keeps_supplied_title_offline() {
    let app = TestApp::new().await;
    let user = app.register("uploader@example.com").await;

    let (status, body) = upload(
        &app,
        &user.access_token,
        &[
            Part::Text("title", "Given Title"),
            Part::Text("explicit", "true"),
            Part::File {
                name: "x.flac",
                content_type: "audio/flac",
                bytes: b"fLaC",
            },
        ],
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["title"], "Given Title");
    assert_eq!(body["explicit"], true);
    assert!(body["cover_path"].is_null());
}

#[tokio::test]
async fn test_upload_requires_audio_and_cleans_up() {
    let app = TestApp::new().await;
    let user = app.register("uploader@example.com").await;

    let (status, body) = upload(
        &app,
        &user.access_token,
        &[Part::File {
            name: "cover.jpg",
            content_type: "image/jpeg",
            bytes: b"jpeg",
        }],
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["message"], "Song file is required");
    assert_eq!(files_in(&app, "uploads/thumbnails"), 0);
}

#[tokio::test]
async fn test_upload_rejects_invalid_type_and_extra_files() {
    let app = TestApp::new().await;
    let user = app.register("uploader@example.com").await;

    let (status, body) = upload(
        &app,
        &user.access_token,
        &[Part::File {
            name: "notes.pdf",
            content_type: "application/pdf",
            bytes: b"%PDF",
        }],
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["message"], "Invalid file type");

    let audio = Part::File {
        name: "a.mp3",
        content_type: "audio/mpeg",
        bytes: b"a",
    };
    let image = Part::File {
        name: "b.png",
        content_type: "image/png",
        bytes: b"b",
    };
    let extra = Part::File {
        name: "c.png",
        content_type: "image/png",
        bytes: b"c",
    };
    let (status, _) = upload(&app, &user.access_token, &[audio, image, extra]).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(files_in(&app, "uploads/songs"), 0);
    assert_eq!(files_in(&app, "uploads/thumbnails"), 0);
}

#[tokio::test]
async fn test_upload_requires_bearer() {
    let app = TestApp::new().await;

    let (status, body) = upload(&app, "garbage", &[]).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "TOKEN_INVALID");
}

/// Minimal stand-in for the MusicBrainz recording search
async fn spawn_musicbrainz_mock() -> String {
    async fn recordings(Query(params): Query<HashMap<String, String>>) -> Json<Value> {
        assert_eq!(params.get("fmt").map(String::as_str), Some("json"));
        Json(json!({
            "recordings": [{
                "id": "rec-1",
                "title": "Billie Jean",
                "length": 294000,
                "artist-credit": [{"name": "Michael Jackson"}],
                "releases": [
                    {
                        "id": "rel-anniv",
                        "title": "Thriller 25",
                        "status": "Official",
                        "date": "2008-02-08",
                        "release-group": {
                            "id": "rg-2",
                            "title": "Thriller 25th Anniversary Edition",
                            "primary-type": "Album",
                            "secondary-types": []
                        }
                    },
                    {
                        "id": "rel-orig",
                        "title": "Thriller",
                        "status": "Official",
                        "date": "1982-11-30",
                        "release-group": {
                            "id": "rg-1",
                            "title": "Thriller",
                            "primary-type": "Album",
                            "secondary-types": []
                        }
                    }
                ]
            }]
        }))
    }

    let router = Router::new().route("/recording/", get(recordings));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    format!("http://{}", addr)
}

#[tokio::test]
async fn test_upload_resolves_metadata_from_musicbrainz() {
    let base_url = spawn_musicbrainz_mock().await;
    let client = MusicBrainzClient::new(&MusicBrainzConfig {
        enabled: true,
        base_url,
        user_agent: "jukebox-tests/0.1".to_string(),
        min_interval_ms: 0,
    })
    .unwrap();

    let app = TestApp::with_musicbrainz(Some(client)).await;
    let user = app.register("uploader@example.com").await;

    let (status, body) = upload(
        &app,
        &user.access_token,
        &[
            Part::Text("title", "billie jean"),
            Part::Text("artist", "michael jackson"),
            Part::File {
                name: "bj.mp3",
                content_type: "audio/mpeg",
                bytes: b"audio",
            },
        ],
    )
    .await;

    assert_eq!(status, StatusCode::CREATED, "{}", body);
    assert_eq!(body["title"], "Billie Jean");
    assert_eq!(body["artist"], "Michael Jackson");
    assert_eq!(body["album"], "Thriller");
    assert_eq!(body["duration"], 294);
}
