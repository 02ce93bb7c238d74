//! Session Handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use uuid::Uuid;

use crate::application::dto::SessionResponse;
use crate::domain::Session;
use crate::presentation::middleware::AuthUser;
use crate::shared::error::AppError;
use crate::startup::AppState;

/// Load a session the caller owns. Other users' sessions read as missing.
async fn owned_session(
    state: &AppState,
    auth_user: &AuthUser,
    session_id: Uuid,
) -> Result<Session, AppError> {
    let session = state.sessions.get_session(session_id).await?;

    if session.user_id != auth_user.user_id {
        return Err(AppError::NotFound("Session not found".into()));
    }

    Ok(session)
}

/// Get a session by ID
pub async fn get_session(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<SessionResponse>, AppError> {
    let session = owned_session(&state, &auth_user, session_id).await?;
    Ok(Json(SessionResponse::from(session)))
}

/// Delete a session (logout)
pub async fn delete_session(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(session_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    owned_session(&state, &auth_user, session_id).await?;
    state.sessions.delete_session(session_id).await?;

    tracing::info!(%session_id, user_id = %auth_user.user_id, "Session deleted");

    Ok(StatusCode::NO_CONTENT)
}
