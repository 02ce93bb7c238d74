//! Common Test Utilities
//!
//! Shared helpers, fixtures, and test infrastructure.

use axum::{
    body::Body,
    http::{header, HeaderMap, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use identity_server::config::{DatabaseSettings, ServerSettings, Settings, TokenSettings};
use identity_server::domain::{ETag, UpdateFields, UpdateRequest};
use identity_server::presentation::http::routes;
use identity_server::startup::AppState;

pub const PASSWORD: &str = "correct-horse-battery";

/// Decoded response
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

impl TestResponse {
    pub fn etag(&self) -> String {
        self.headers
            .get(header::ETAG)
            .expect("response has no ETag header")
            .to_str()
            .unwrap()
            .to_string()
    }
}

/// A registered user and the tokens of one login
#[derive(Debug, Clone)]
pub struct LoggedInUser {
    pub id: Uuid,
    pub email: String,
    pub etag: String,
    pub access_token: String,
    pub session_id: String,
}

/// Test application builder
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
}

impl TestApp {
    /// Application over an in-memory store with default token lifetimes
    pub fn new() -> Self {
        Self::with_token_durations("15m", "24h")
    }

    pub fn with_token_durations(access: &str, refresh: &str) -> Self {
        let settings = Settings {
            server: ServerSettings {
                host: "127.0.0.1".into(),
                port: 0,
            },
            database: DatabaseSettings {
                url: None,
                max_connections: 1,
                min_connections: 0,
                acquire_timeout: 1,
            },
            token: TokenSettings {
                access_token_duration: access.into(),
                refresh_token_duration: refresh.into(),
            },
            environment: "test".into(),
        };
        let state = AppState::in_memory(settings).expect("build state");

        Self {
            router: routes::create_router(state.clone()),
            state,
        }
    }

    /// Send a request and decode the JSON body (Null when empty or not JSON)
    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

        TestResponse {
            status,
            headers,
            body,
        }
    }

    /// GET a non-JSON endpoint
    pub async fn get_text(&self, uri: &str) -> (StatusCode, String) {
        let response = self
            .router
            .clone()
            .oneshot(request(Method::GET, uri, None, &[], None))
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();

        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> TestResponse {
        self.send(request(Method::GET, uri, token, &[], None)).await
    }

    pub async fn post_json(&self, uri: &str, body: Value) -> TestResponse {
        self.send(request(Method::POST, uri, None, &[], Some(body)))
            .await
    }

    pub async fn patch_user(
        &self,
        id: Uuid,
        token: &str,
        if_match: Option<&str>,
        body: Value,
    ) -> TestResponse {
        let headers: Vec<(&str, &str)> = if_match.map(|v| ("if-match", v)).into_iter().collect();
        self.send(request(
            Method::PATCH,
            &format!("/api/v1/users/{id}"),
            Some(token),
            &headers,
            Some(body),
        ))
        .await
    }

    pub async fn delete(&self, uri: &str, token: &str) -> TestResponse {
        self.send(request(Method::DELETE, uri, Some(token), &[], None))
            .await
    }

    pub async fn register(&self, username: &str, email: &str, password: &str) -> TestResponse {
        self.post_json(
            "/api/v1/users",
            json!({ "username": username, "email": email, "password": password }),
        )
        .await
    }

    pub async fn login(&self, email: &str, password: &str) -> TestResponse {
        self.post_json(
            "/api/v1/users/login",
            json!({ "email": email, "password": password }),
        )
        .await
    }

    /// Register a fresh user and log them in
    pub async fn logged_in_user(&self) -> LoggedInUser {
        let email = unique_email();
        let registered = self.register(&unique_username(), &email, PASSWORD).await;
        assert_eq!(registered.status, StatusCode::CREATED, "{:?}", registered.body);

        let login = self.login(&email, PASSWORD).await;
        assert_eq!(login.status, StatusCode::OK, "{:?}", login.body);

        LoggedInUser {
            id: registered.body["id"].as_str().unwrap().parse().unwrap(),
            email,
            etag: registered.etag(),
            access_token: login.body["access_token"].as_str().unwrap().to_string(),
            session_id: login.body["session_id"].as_str().unwrap().to_string(),
        }
    }

    /// Register a user, promote them to Admin out of band, and log them in
    pub async fn logged_in_admin(&self) -> LoggedInUser {
        let user = self.logged_in_user().await;
        let etag: ETag = user.etag.parse().unwrap();

        let request = UpdateRequest::parse(
            user.id,
            etag,
            UpdateFields {
                role: Some(3),
                ..Default::default()
            },
        )
        .unwrap();
        let promoted = self.state.users.update_user(request).await.unwrap();

        let login = self.login(&user.email, PASSWORD).await;
        assert_eq!(login.status, StatusCode::OK);

        LoggedInUser {
            etag: promoted.etag().to_string(),
            access_token: login.body["access_token"].as_str().unwrap().to_string(),
            session_id: login.body["session_id"].as_str().unwrap().to_string(),
            ..user
        }
    }
}

/// Build a request with optional bearer token, extra headers and JSON body
pub fn request(
    method: Method,
    uri: &str,
    token: Option<&str>,
    headers: &[(&str, &str)],
    body: Option<Value>,
) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }

    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

/// Generate a unique test email
pub fn unique_email() -> String {
    format!("test_{}@example.com", Uuid::new_v4().simple())
}

/// Generate a unique test username (letters, digits and underscores, at most 16 chars)
pub fn unique_username() -> String {
    format!("user_{}", &Uuid::new_v4().simple().to_string()[..8])
}
