//! Authentication API Tests

use std::time::Duration;

use axum::http::{Method, StatusCode};
use pretty_assertions::assert_eq;
use serde_json::json;

use crate::common::{request, unique_email, unique_username, TestApp, PASSWORD};

#[tokio::test]
async fn test_login_returns_tokens_and_session() {
    let app = TestApp::new();
    let email = unique_email();
    app.register(&unique_username(), &email, PASSWORD).await;

    let response = app.login(&email, PASSWORD).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["token_type"], "Bearer");
    assert_eq!(response.body["user"]["email"], email.as_str());
    for key in ["access_token", "refresh_token"] {
        assert!(response.body[key].as_str().unwrap().starts_with("v4.local."));
    }
    assert!(response.body["session_id"].is_string());
}

#[tokio::test]
async fn test_login_failures_are_indistinguishable() {
    let app = TestApp::new();
    let email = unique_email();
    app.register(&unique_username(), &email, PASSWORD).await;

    let wrong_password = app.login(&email, "not-the-password").await;
    let unknown_email = app.login(&unique_email(), PASSWORD).await;

    assert_eq!(wrong_password.status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_email.status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_password.body, unknown_email.body);
}

#[tokio::test]
async fn test_login_with_malformed_email_is_validation_error() {
    let app = TestApp::new();

    let response = app.login("not-an-email", PASSWORD).await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["errors"][0]["field"], "email");
}

#[tokio::test]
async fn test_garbage_token_is_rejected() {
    let app = TestApp::new();

    let response = app.get("/api/v1/users/me", Some("v4.local.garbage")).await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.body["message"], "Invalid token");
}

#[tokio::test]
async fn test_token_from_another_instance_is_rejected() {
    let issuer = TestApp::new();
    let verifier = TestApp::new();
    let user = issuer.logged_in_user().await;

    let response = verifier
        .get("/api/v1/users/me", Some(&user.access_token))
        .await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_refresh_token_is_not_an_access_token() {
    let app = TestApp::new();
    let email = unique_email();
    app.register(&unique_username(), &email, PASSWORD).await;
    let login = app.login(&email, PASSWORD).await;
    let refresh_token = login.body["refresh_token"].as_str().unwrap();
    let session_id = login.body["session_id"].as_str().unwrap();

    let me = app.get("/api/v1/users/me", Some(refresh_token)).await;
    let session = app
        .get(&format!("/api/v1/sessions/{session_id}"), Some(refresh_token))
        .await;

    assert_eq!(me.status, StatusCode::UNAUTHORIZED);
    assert_eq!(me.body["message"], "Invalid token");
    assert_eq!(session.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_expired_token_is_reported_distinctly() {
    let app = TestApp::with_token_durations("50ms", "24h");
    let user = app.logged_in_user().await;

    tokio::time::sleep(Duration::from_millis(100)).await;
    let expired = app
        .get("/api/v1/users/me", Some(&user.access_token))
        .await;
    let invalid = app.get("/api/v1/users/me", Some("v4.local.garbage")).await;

    assert_eq!(expired.status, StatusCode::UNAUTHORIZED);
    assert_ne!(expired.body["code"], invalid.body["code"]);
}

#[tokio::test]
async fn test_non_bearer_authorization_is_rejected() {
    let app = TestApp::new();

    let response = app
        .send(request(
            Method::GET,
            "/api/v1/users/me",
            None,
            &[("authorization", "Basic dXNlcjpwYXNz")],
            None,
        ))
        .await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_malformed_json_body_is_rejected() {
    let app = TestApp::new();

    let response = app
        .post_json("/api/v1/users/login", json!({ "email": "a@b.io" }))
        .await;

    assert!(response.status.is_client_error());
}
