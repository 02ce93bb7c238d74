//! Route Configuration
//!
//! Configures all HTTP routes for the API.

use axum::{
    middleware,
    response::IntoResponse,
    routing::{get, post},
    Router,
};

use super::handlers;
use crate::infrastructure::metrics;
use crate::presentation::middleware::{auth_middleware, create_trace_layer, track_metrics};
use crate::startup::AppState;

/// Create the main API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", api_routes(state.clone()))
        // Health check endpoints
        .route("/health", get(handlers::health::health_check))
        .route("/health/live", get(handlers::health::liveness))
        .route("/health/ready", get(handlers::health::readiness))
        // Prometheus metrics endpoint
        .route("/metrics", get(metrics_handler))
        .route_layer(middleware::from_fn(track_metrics))
        .layer(create_trace_layer())
        .with_state(state)
}

/// Prometheus metrics endpoint handler
async fn metrics_handler() -> impl IntoResponse {
    let metrics = metrics::gather_metrics();
    (
        [(
            axum::http::header::CONTENT_TYPE,
            "text/plain; version=0.0.4; charset=utf-8",
        )],
        metrics,
    )
}

/// API v1 routes
fn api_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .merge(public_routes())
        .merge(protected_routes(state))
}

/// Registration and login (public)
fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/users", post(handlers::user::register))
        .route("/users/login", post(handlers::auth::login))
}

/// User and session routes (require a valid access token)
fn protected_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/users/me", get(handlers::user::get_current_user))
        .route(
            "/users/{user_id}",
            get(handlers::user::get_user).patch(handlers::user::update_user),
        )
        .route(
            "/sessions/{session_id}",
            get(handlers::session::get_session).delete(handlers::session::delete_session),
        )
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}
