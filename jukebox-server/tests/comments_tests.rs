//! Comments, ratings and flagging

mod helpers;

use axum::http::StatusCode;
use helpers::TestApp;
use serde_json::json;

#[tokio::test]
async fn test_rating_out_of_range_rejected() {
    let app = TestApp::new().await;
    let user = app.register("rater@example.com").await;
    let token = user.access_token.as_str();
    let song = app.create_song(token, "Rated", "X").await;

    for rating in [0, 6] {
        let (status, _) = app
            .post(
                "/comments",
                Some(token),
                json!({"song_id": song, "content": "meh", "rating": rating}),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "rating {}", rating);
    }

    let (status, body) = app
        .post(
            "/comments",
            Some(token),
            json!({"song_id": song, "content": "great", "rating": 5}),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["rating"], 5);
    assert_eq!(body["author_id"], user.id.as_str());
    assert_eq!(body["is_flagged"], false);
}

#[tokio::test]
async fn test_comment_on_missing_song_not_found() {
    let app = TestApp::new().await;
    let user = app.register("lost@example.com").await;

    let (status, _) = app
        .post(
            "/comments",
            Some(&user.access_token),
            json!({"song_id": "missing", "content": "hello"}),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_only_author_edits_and_deletes() {
    let app = TestApp::new().await;
    let author = app.register("author@example.com").await;
    let other = app.register("other@example.com").await;
    let song = app.create_song(&author.access_token, "Topic", "X").await;

    let (_, body) = app
        .post(
            "/comments",
            Some(&author.access_token),
            json!({"song_id": song, "content": "draft"}),
        )
        .await;
    let id = body["id"].as_str().unwrap().to_string();

    let (status, _) = app
        .put(&format!("/comments/{}", id), Some(&other.access_token), json!({"content": "hijack"}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app.delete(&format!("/comments/{}", id), Some(&other.access_token)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app
        .put(
            &format!("/comments/{}", id),
            Some(&author.access_token),
            json!({"content": "final", "rating": 4}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["content"], "final");
    assert_eq!(body["rating"], 4);

    let (status, _) = app
        .put(&format!("/comments/{}", id), Some(&author.access_token), json!({"rating": 9}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app.delete(&format!("/comments/{}", id), Some(&author.access_token)).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app.get(&format!("/comments/{}", id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_any_user_may_flag() {
    let app = TestApp::new().await;
    let author = app.register("author@example.com").await;
    let reader = app.register("reader@example.com").await;
    let song = app.create_song(&author.access_token, "Topic", "X").await;

    let (_, body) = app
        .post(
            "/comments",
            Some(&author.access_token),
            json!({"song_id": song, "content": "spam"}),
        )
        .await;
    let id = body["id"].as_str().unwrap().to_string();

    let (status, body) = app
        .post(&format!("/comments/{}/flag", id), Some(&reader.access_token), json!({}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["is_flagged"], true);

    let (status, _) = app.post("/comments/missing/flag", Some(&reader.access_token), json!({})).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_deleting_song_removes_its_comments() {
    let app = TestApp::new().await;
    let user = app.register("owner@example.com").await;
    let token = user.access_token.as_str();
    let song = app.create_song(token, "Short-lived", "X").await;

    let (_, body) = app
        .post("/comments", Some(token), json!({"song_id": song, "content": "bye"}))
        .await;
    let id = body["id"].as_str().unwrap().to_string();

    app.delete(&format!("/songs/{}", song), Some(token)).await;

    let (status, _) = app.get(&format!("/comments/{}", id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
