//! Authentication Middleware
//!
//! PASETO access token validation for protected routes.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
    RequestPartsExt,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use uuid::Uuid;

use crate::application::services::TokenError;
use crate::domain::Role;
use crate::infrastructure::metrics;
use crate::shared::error::AppError;
use crate::startup::AppState;

/// Authenticated caller, inserted into request extensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub role: Role,
    /// Identifier of the access token that authenticated the request.
    pub token_id: Uuid,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Whether the caller may act on `user_id`'s resources.
    pub fn may_act_on(&self, user_id: Uuid) -> bool {
        self.user_id == user_id || self.is_admin()
    }
}

/// Authentication middleware that verifies the bearer access token
pub async fn auth_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let (mut parts, body) = request.into_parts();

    let TypedHeader(Authorization(bearer)) = parts
        .extract::<TypedHeader<Authorization<Bearer>>>()
        .await
        .map_err(|_| AppError::Unauthorized("Missing authorization header".into()))?;

    let payload = match state.tokens.verify_token(bearer.token()) {
        Ok(payload) => {
            metrics::record_token_verification("valid");
            payload
        }
        Err(e) => {
            metrics::record_token_verification(match e {
                TokenError::ExpiredToken { .. } => "expired",
                _ => "invalid",
            });
            return Err(e.into());
        }
    };

    // Tokens carry the role name captured at issue time.
    let role = Role::from_name(&payload.role)
        .ok_or_else(|| AppError::Unauthorized("Invalid token claims".into()))?;

    parts.extensions.insert(AuthUser {
        user_id: payload.user_id,
        role,
        token_id: payload.id,
    });

    Ok(next.run(Request::from_parts(parts, body)).await)
}
