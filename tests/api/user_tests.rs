//! User API Tests

use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::json;
use uuid::Uuid;

use crate::common::{unique_email, unique_username, TestApp, PASSWORD};

// ============================================================================
// Registration
// ============================================================================

#[tokio::test]
async fn test_register_returns_user_with_etag() {
    let app = TestApp::new();
    let username = unique_username();
    let email = unique_email();

    let response = app.register(&username, &email, PASSWORD).await;

    assert_eq!(response.status, StatusCode::CREATED);
    assert_eq!(response.body["username"], username.as_str());
    assert_eq!(response.body["email"], email.as_str());
    assert_eq!(response.body["role"], "Reader");
    assert_eq!(response.body["etag"], response.etag().as_str());
    assert!(response.body.get("password_hash").is_none());
    assert_eq!(response.body["created_at"], response.body["updated_at"]);
}

#[tokio::test]
async fn test_register_reports_every_invalid_field() {
    let app = TestApp::new();

    let response = app.register("a!", "not-an-email", "short").await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    let fields: Vec<&str> = response.body["errors"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["field"].as_str().unwrap())
        .collect();
    assert!(fields.contains(&"username"));
    assert!(fields.contains(&"email"));
    assert!(fields.contains(&"password"));
}

#[tokio::test]
async fn test_register_duplicate_username_conflicts() {
    let app = TestApp::new();
    let username = unique_username();
    app.register(&username, &unique_email(), PASSWORD).await;

    let response = app.register(&username, &unique_email(), PASSWORD).await;

    assert_eq!(response.status, StatusCode::CONFLICT);
    assert_eq!(response.body["message"], "Username already taken");
}

#[tokio::test]
async fn test_register_duplicate_email_conflicts() {
    let app = TestApp::new();
    let email = unique_email();
    app.register(&unique_username(), &email, PASSWORD).await;

    let response = app.register(&unique_username(), &email, PASSWORD).await;

    assert_eq!(response.status, StatusCode::CONFLICT);
    assert_eq!(response.body["message"], "Email already registered");
}

// ============================================================================
// Reads
// ============================================================================

#[tokio::test]
async fn test_get_current_user_requires_token() {
    let app = TestApp::new();

    let response = app.get("/api/v1/users/me", None).await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_get_current_user() {
    let app = TestApp::new();
    let user = app.logged_in_user().await;

    let response = app
        .get("/api/v1/users/me", Some(&user.access_token))
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["id"], user.id.to_string());
    assert_eq!(response.etag(), user.etag);
}

#[tokio::test]
async fn test_get_other_user_is_forbidden_for_non_admin() {
    let app = TestApp::new();
    let alice = app.logged_in_user().await;
    let bob = app.logged_in_user().await;

    let response = app
        .get(
            &format!("/api/v1/users/{}", bob.id),
            Some(&alice.access_token),
        )
        .await;

    assert_eq!(response.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_admin_reads_any_user_and_missing_is_not_found() {
    let app = TestApp::new();
    let admin = app.logged_in_admin().await;
    let bob = app.logged_in_user().await;

    let found = app
        .get(&format!("/api/v1/users/{}", bob.id), Some(&admin.access_token))
        .await;
    let missing = app
        .get(
            &format!("/api/v1/users/{}", Uuid::new_v4()),
            Some(&admin.access_token),
        )
        .await;

    assert_eq!(found.status, StatusCode::OK);
    assert_eq!(found.etag(), bob.etag);
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
}

// ============================================================================
// Conditional updates
// ============================================================================

#[tokio::test]
async fn test_update_without_if_match_is_precondition_required() {
    let app = TestApp::new();
    let user = app.logged_in_user().await;

    let response = app
        .patch_user(user.id, &user.access_token, None, json!({ "email": unique_email() }))
        .await;

    assert_eq!(response.status, StatusCode::PRECONDITION_REQUIRED);
}

#[tokio::test]
async fn test_update_with_malformed_if_match_is_bad_request() {
    let app = TestApp::new();
    let user = app.logged_in_user().await;

    let response = app
        .patch_user(
            user.id,
            &user.access_token,
            Some("\"not-an-etag\""),
            json!({ "email": unique_email() }),
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_update_advances_etag_and_stale_etag_fails() {
    let app = TestApp::new();
    let user = app.logged_in_user().await;
    let new_email = unique_email();

    let updated = app
        .patch_user(
            user.id,
            &user.access_token,
            Some(&user.etag),
            json!({ "email": new_email }),
        )
        .await;

    assert_eq!(updated.status, StatusCode::OK);
    assert_eq!(updated.body["email"], new_email.as_str());
    assert_ne!(updated.etag(), user.etag);

    let stale = app
        .patch_user(
            user.id,
            &user.access_token,
            Some(&user.etag),
            json!({ "username": unique_username() }),
        )
        .await;

    assert_eq!(stale.status, StatusCode::PRECONDITION_FAILED);

    let current = app
        .get("/api/v1/users/me", Some(&user.access_token))
        .await;
    assert_eq!(current.body["email"], new_email.as_str());
    assert_eq!(current.etag(), updated.etag());
}

#[tokio::test]
async fn test_update_password_allows_login_with_new_password() {
    let app = TestApp::new();
    let user = app.logged_in_user().await;

    let updated = app
        .patch_user(
            user.id,
            &user.access_token,
            Some(&user.etag),
            json!({ "password": "a-brand-new-secret" }),
        )
        .await;

    assert_eq!(updated.status, StatusCode::OK);
    assert_ne!(updated.body["password_changed_at"], updated.body["created_at"]);
    assert_eq!(
        app.login(&user.email, PASSWORD).await.status,
        StatusCode::UNAUTHORIZED
    );
    assert_eq!(
        app.login(&user.email, "a-brand-new-secret").await.status,
        StatusCode::OK
    );
}

#[tokio::test]
async fn test_update_invalid_fields_is_validation_error() {
    let app = TestApp::new();
    let user = app.logged_in_user().await;

    let response = app
        .patch_user(
            user.id,
            &user.access_token,
            Some(&user.etag),
            json!({ "username": "x", "email": "nope" }),
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["errors"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_update_to_taken_username_conflicts() {
    let app = TestApp::new();
    let alice = app.logged_in_user().await;
    let bob_name = unique_username();
    app.register(&bob_name, &unique_email(), PASSWORD).await;

    let response = app
        .patch_user(
            alice.id,
            &alice.access_token,
            Some(&alice.etag),
            json!({ "username": bob_name }),
        )
        .await;

    assert_eq!(response.status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_update_other_user_is_forbidden() {
    let app = TestApp::new();
    let alice = app.logged_in_user().await;
    let bob = app.logged_in_user().await;

    let response = app
        .patch_user(
            bob.id,
            &alice.access_token,
            Some(&bob.etag),
            json!({ "email": unique_email() }),
        )
        .await;

    assert_eq!(response.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_role_change_requires_admin() {
    let app = TestApp::new();
    let user = app.logged_in_user().await;

    let response = app
        .patch_user(user.id, &user.access_token, Some(&user.etag), json!({ "role": 3 }))
        .await;

    assert_eq!(response.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_admin_changes_role_of_other_user() {
    let app = TestApp::new();
    let admin = app.logged_in_admin().await;
    let bob = app.logged_in_user().await;

    let response = app
        .patch_user(bob.id, &admin.access_token, Some(&bob.etag), json!({ "role": 2 }))
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["role"], "Editor");
}

#[tokio::test]
async fn test_admin_role_out_of_range_is_validation_error() {
    let app = TestApp::new();
    let admin = app.logged_in_admin().await;

    let response = app
        .patch_user(admin.id, &admin.access_token, Some(&admin.etag), json!({ "role": 4 }))
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["errors"][0]["field"], "role");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_concurrent_updates_have_exactly_one_winner() {
    let app = TestApp::new();
    let user = app.logged_in_user().await;
    let first_email = unique_email();
    let second_email = unique_email();

    let (first, second) = tokio::join!(
        app.patch_user(
            user.id,
            &user.access_token,
            Some(&user.etag),
            json!({ "email": first_email }),
        ),
        app.patch_user(
            user.id,
            &user.access_token,
            Some(&user.etag),
            json!({ "email": second_email }),
        ),
    );

    let statuses = [first.status, second.status];
    assert_eq!(statuses.iter().filter(|s| **s == StatusCode::OK).count(), 1);
    assert!(statuses.contains(&StatusCode::PRECONDITION_FAILED));

    let winner = if first.status == StatusCode::OK { &first } else { &second };
    let current = app
        .get("/api/v1/users/me", Some(&user.access_token))
        .await;
    assert_eq!(current.body["email"], winner.body["email"]);
    assert_eq!(current.etag(), winner.etag());
}
