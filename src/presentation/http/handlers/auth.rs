//! Authentication Handlers

use axum::{extract::State, Json};

use crate::application::dto::{LoginResponse, LoginUserRequest};
use crate::application::services::{LoginError, UserError};
use crate::domain::LoginRequest;
use crate::infrastructure::metrics;
use crate::presentation::http::extractors::ClientInfo;
use crate::shared::error::AppError;
use crate::startup::AppState;

/// Login with credentials, opening a session
pub async fn login(
    State(state): State<AppState>,
    client: ClientInfo,
    Json(body): Json<LoginUserRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let request = LoginRequest::parse(&body.email, &body.password)?;

    let result = state
        .auth
        .login(&request, &client.user_agent, &client.client_ip)
        .await;

    metrics::record_authentication(match &result {
        Ok(_) => "success",
        Err(LoginError::User(UserError::Auth(_))) => "failure",
        Err(_) => "error",
    });

    Ok(Json(LoginResponse::from(result?)))
}
