//! Session entity and repository trait.
//!
//! Maps to the `sessions` table in the database schema. A session binds a
//! refresh token to the user it was issued for.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::Payload;
use crate::domain::errors::RepositoryError;

/// Represents a login session.
///
/// Maps to the `sessions` table:
/// - id: UUID PRIMARY KEY
/// - user_id: UUID NOT NULL REFERENCES users(id)
/// - refresh_token: TEXT NOT NULL
/// - user_agent: TEXT NOT NULL
/// - client_ip: TEXT NOT NULL
/// - is_blocked: BOOLEAN NOT NULL DEFAULT FALSE
/// - expires_at: TIMESTAMPTZ NOT NULL
/// - created_at: TIMESTAMPTZ NOT NULL DEFAULT NOW()
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Session {
    pub id: Uuid,

    /// User this session belongs to
    pub user_id: Uuid,

    /// Refresh token as issued
    #[serde(skip_serializing)]
    pub refresh_token: String,

    pub user_agent: String,

    pub client_ip: String,

    /// Blocked sessions can no longer be refreshed
    pub is_blocked: bool,

    /// Mirrors the refresh token's expiry
    pub expires_at: DateTime<Utc>,

    pub created_at: DateTime<Utc>,
}

impl Session {
    /// Create an unblocked session for the refresh token described by
    /// `payload`.
    pub fn new(
        user_id: Uuid,
        refresh_token: String,
        payload: &Payload,
        user_agent: String,
        client_ip: String,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            refresh_token,
            user_agent,
            client_ip,
            is_blocked: false,
            expires_at: payload.expired_at,
            created_at: now,
        }
    }
}

/// Persistence contract for sessions.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SessionRepository: Send + Sync {
    async fn create_session(&self, session: &Session) -> Result<Session, RepositoryError>;

    /// Fails with [`RepositoryError::NotFound`] when the session is absent.
    async fn get_session(&self, id: Uuid) -> Result<Session, RepositoryError>;

    /// Most recently created session of `user_id`.
    async fn get_session_by_user_id(&self, user_id: Uuid) -> Result<Session, RepositoryError>;

    /// Deleting an absent session is not an error.
    async fn delete_session(&self, id: Uuid) -> Result<(), RepositoryError>;
}
