//! User Handlers

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Extension, Json,
};
use uuid::Uuid;

use super::run_blocking;
use crate::application::dto::{RegisterUserRequest, UpdateUserRequest, UserResponse};
use crate::application::services::UserError;
use crate::domain::{RegistrationRequest, UpdateRequest, User};
use crate::infrastructure::metrics;
use crate::presentation::http::extractors::IfMatch;
use crate::presentation::middleware::AuthUser;
use crate::shared::error::AppError;
use crate::startup::AppState;

/// User body with its `ETag` header.
fn user_with_etag(user: &User) -> impl IntoResponse {
    (
        [(header::ETAG, user.etag().to_string())],
        Json(UserResponse::from(user)),
    )
}

/// Register a new user
pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterUserRequest>,
) -> Result<impl IntoResponse, AppError> {
    let request = run_blocking(move || {
        RegistrationRequest::parse(&body.username, &body.email, &body.password)
    })
    .await?;

    let user = state.users.register(request).await?;

    Ok((StatusCode::CREATED, user_with_etag(&user)))
}

/// Get the authenticated user
pub async fn get_current_user(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> Result<impl IntoResponse, AppError> {
    let user = state.users.get_user(auth_user.user_id).await?;
    Ok(user_with_etag(&user))
}

/// Get a user by ID (self or admin)
pub async fn get_user(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(user_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    if !auth_user.may_act_on(user_id) {
        return Err(AppError::Forbidden("Cannot read another user".into()));
    }

    let user = state.users.get_user(user_id).await?;
    Ok(user_with_etag(&user))
}

/// Partially update a user, conditioned on `If-Match`
pub async fn update_user(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(user_id): Path<Uuid>,
    IfMatch(etag): IfMatch,
    Json(body): Json<UpdateUserRequest>,
) -> Result<impl IntoResponse, AppError> {
    if !auth_user.may_act_on(user_id) {
        return Err(AppError::Forbidden("Cannot update another user".into()));
    }
    if body.role.is_some() && !auth_user.is_admin() {
        return Err(AppError::Forbidden("Only admins may change roles".into()));
    }

    let request = run_blocking(move || UpdateRequest::parse(user_id, etag, body.fields())).await?;

    let user = state.users.update_user(request).await.map_err(|e| {
        if matches!(e, UserError::ConcurrentModification { .. }) {
            metrics::record_user_update_conflict();
        }
        e
    })?;

    Ok(user_with_etag(&user))
}
