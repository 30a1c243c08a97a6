//! Registration, login, refresh rotation and logout

mod helpers;

use axum::http::StatusCode;
use helpers::{user_from_auth, TestApp, TEST_PASSWORD};
use serde_json::json;

#[tokio::test]
async fn test_register_returns_safe_user_and_tokens() {
    let app = TestApp::new().await;

    let (status, body) = app
        .post(
            "/auth/register",
            None,
            json!({"email": "Alice@Example.com", "password": TEST_PASSWORD, "display_name": "Alice"}),
        )
        .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["user"]["email"], "alice@example.com");
    assert_eq!(body["user"]["display_name"], "Alice");
    assert_eq!(body["user"]["is_verified"], false);
    assert!(body["user"].get("password_hash").is_none());
    assert!(body["user"].get("refresh_token").is_none());
    assert_eq!(body["refresh_token"].as_str().unwrap().len(), 64);
    assert!(!body["access_token"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn test_register_rejects_short_password() {
    let app = TestApp::new().await;

    let (status, body) = app
        .post(
            "/auth/register",
            None,
            json!({"email": "bob@example.com", "password": "1234567", "display_name": "Bob"}),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_register_duplicate_email_conflicts() {
    let app = TestApp::new().await;
    app.register("carol@example.com").await;

    let (status, _) = app
        .post(
            "/auth/register",
            None,
            json!({"email": "CAROL@example.com", "password": TEST_PASSWORD, "display_name": "C"}),
        )
        .await;

    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_login_wrong_password_is_unauthorized() {
    let app = TestApp::new().await;
    app.register("dave@example.com").await;

    let (status, body) = app
        .post(
            "/auth/login",
            None,
            json!({"email": "dave@example.com", "password": "wrong-password"}),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["message"], "Invalid credentials");

    let (status, _) = app
        .post(
            "/auth/login",
            None,
            json!({"email": "nobody@example.com", "password": TEST_PASSWORD}),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_login_invalidates_previous_refresh_token() {
    let app = TestApp::new().await;
    let registered = app.register("erin@example.com").await;

    let (status, body) = app
        .post(
            "/auth/login",
            None,
            json!({"email": "erin@example.com", "password": TEST_PASSWORD}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let logged_in = user_from_auth(&body);
    assert_ne!(logged_in.refresh_token, registered.refresh_token);

    let (status, _) = app
        .post(
            "/auth/refresh",
            None,
            json!({"user_id": registered.id, "refresh_token": registered.refresh_token}),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app
        .post(
            "/auth/refresh",
            None,
            json!({"user_id": logged_in.id, "refresh_token": logged_in.refresh_token}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_refresh_rotates_and_stale_token_fails() {
    let app = TestApp::new().await;
    let user = app.register("frank@example.com").await;

    let (status, body) = app
        .post(
            "/auth/refresh",
            None,
            json!({"user_id": user.id, "refresh_token": user.refresh_token}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let rotated = user_from_auth(&body);
    assert_ne!(rotated.refresh_token, user.refresh_token);

    // The rotated-out token is single use
    let (status, body) = app
        .post(
            "/auth/refresh",
            None,
            json!({"user_id": user.id, "refresh_token": user.refresh_token}),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["message"], "Invalid refresh token");

    let (status, _) = app.get("/users/me", Some(&rotated.access_token)).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_refresh_after_logout_fails() {
    let app = TestApp::new().await;
    let user = app.register("gina@example.com").await;

    let (status, body) = app
        .json(axum::http::Method::POST, "/auth/logout", Some(&user.access_token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Logged out");

    let (status, _) = app
        .post(
            "/auth/refresh",
            None,
            json!({"user_id": user.id, "refresh_token": user.refresh_token}),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_bearer_failures_use_token_invalid_code() {
    let app = TestApp::new().await;

    let (status, body) = app.get("/users/me", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "TOKEN_INVALID");

    let (status, body) = app.get("/users/me", Some("not-a-jwt")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "TOKEN_INVALID");
}

#[tokio::test]
async fn test_concurrent_refresh_with_same_token_succeeds_once() {
    let app = TestApp::new().await;
    let user = app.register("hank@example.com").await;
    let body = json!({"user_id": user.id, "refresh_token": user.refresh_token});

    let (a, b) = tokio::join!(
        app.post("/auth/refresh", None, body.clone()),
        app.post("/auth/refresh", None, body.clone()),
    );

    let successes = [a.0, b.0].iter().filter(|s| **s == StatusCode::OK).count();
    assert_eq!(successes, 1, "exactly one rotation may win");
}
