//! Response DTOs
//!
//! Data structures for API response bodies.

use serde::Serialize;

use crate::application::services::LoginOutcome;
use crate::domain::{Session, User};

/// User response. Never carries the password hash.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: String,
    pub username: String,
    pub email: String,
    pub role: String,
    pub created_at: String,
    pub password_changed_at: String,
    pub updated_at: String,
    pub etag: String,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id().to_string(),
            username: user.username().to_string(),
            email: user.email().to_string(),
            role: user.role().to_string(),
            created_at: user.created_at().to_rfc3339(),
            password_changed_at: user.password_changed_at().to_rfc3339(),
            updated_at: user.updated_at().to_rfc3339(),
            etag: user.etag().to_string(),
        }
    }
}

/// Login response (user, both tokens and the opened session)
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub user: UserResponse,
    pub session_id: String,
    pub access_token: String,
    pub access_token_expires_at: String,
    pub refresh_token: String,
    pub refresh_token_expires_at: String,
    pub token_type: String,
}

impl From<LoginOutcome> for LoginResponse {
    fn from(outcome: LoginOutcome) -> Self {
        Self {
            user: UserResponse::from(&outcome.user),
            session_id: outcome.session.id.to_string(),
            access_token: outcome.access_token,
            access_token_expires_at: outcome.access_payload.expired_at.to_rfc3339(),
            refresh_token: outcome.refresh_token,
            refresh_token_expires_at: outcome.refresh_payload.expired_at.to_rfc3339(),
            token_type: "Bearer".to_string(),
        }
    }
}

/// Session response. The refresh token is not echoed back.
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub id: String,
    pub user_id: String,
    pub user_agent: String,
    pub client_ip: String,
    pub is_blocked: bool,
    pub expires_at: String,
    pub created_at: String,
}

impl From<Session> for SessionResponse {
    fn from(session: Session) -> Self {
        Self {
            id: session.id.to_string(),
            user_id: session.user_id.to_string(),
            user_agent: session.user_agent,
            client_ip: session.client_ip,
            is_blocked: session.is_blocked,
            expires_at: session.expires_at.to_rfc3339(),
            created_at: session.created_at.to_rfc3339(),
        }
    }
}
