//! Session API Tests

use axum::http::{Method, StatusCode};
use pretty_assertions::assert_eq;
use uuid::Uuid;

use crate::common::{request, unique_email, unique_username, TestApp, PASSWORD};

fn session_uri(id: &str) -> String {
    format!("/api/v1/sessions/{id}")
}

#[tokio::test]
async fn test_login_records_client_metadata() {
    let app = TestApp::new();
    let email = unique_email();
    app.register(&unique_username(), &email, PASSWORD).await;

    let login = app
        .send(request(
            Method::POST,
            "/api/v1/users/login",
            None,
            &[
                ("user-agent", "integration-test/1.0"),
                ("x-forwarded-for", "203.0.113.9, 10.0.0.1"),
            ],
            Some(serde_json::json!({ "email": email, "password": PASSWORD })),
        ))
        .await;
    assert_eq!(login.status, StatusCode::OK);

    let token = login.body["access_token"].as_str().unwrap();
    let session_id = login.body["session_id"].as_str().unwrap();
    let session = app.get(&session_uri(session_id), Some(token)).await;

    assert_eq!(session.status, StatusCode::OK);
    assert_eq!(session.body["user_agent"], "integration-test/1.0");
    assert_eq!(session.body["client_ip"], "203.0.113.9");
    assert_eq!(session.body["is_blocked"], false);
    assert_eq!(session.body["expires_at"], login.body["refresh_token_expires_at"]);
    assert!(session.body.get("refresh_token").is_none());
}

#[tokio::test]
async fn test_other_users_session_reads_as_missing() {
    let app = TestApp::new();
    let alice = app.logged_in_user().await;
    let bob = app.logged_in_user().await;

    let response = app
        .get(&session_uri(&bob.session_id), Some(&alice.access_token))
        .await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_unknown_session_is_not_found() {
    let app = TestApp::new();
    let user = app.logged_in_user().await;

    let response = app
        .get(&session_uri(&Uuid::new_v4().to_string()), Some(&user.access_token))
        .await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_session_logs_out() {
    let app = TestApp::new();
    let user = app.logged_in_user().await;
    let uri = session_uri(&user.session_id);

    let deleted = app.delete(&uri, &user.access_token).await;
    assert_eq!(deleted.status, StatusCode::NO_CONTENT);

    let after = app.get(&uri, Some(&user.access_token)).await;
    assert_eq!(after.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_cannot_delete_other_users_session() {
    let app = TestApp::new();
    let alice = app.logged_in_user().await;
    let bob = app.logged_in_user().await;

    let response = app
        .delete(&session_uri(&bob.session_id), &alice.access_token)
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);

    let still_there = app
        .get(&session_uri(&bob.session_id), Some(&bob.access_token))
        .await;
    assert_eq!(still_there.status, StatusCode::OK);
}
