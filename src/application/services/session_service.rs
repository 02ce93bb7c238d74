//! Session Service
//!
//! Stateless session lifecycle on top of a [`SessionRepository`].

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::domain::{Payload, RepositoryError, Session, SessionRepository, User};

/// Session service trait for dependency injection
#[async_trait]
pub trait SessionService: Send + Sync {
    /// Record a session for the refresh token described by `payload`.
    async fn create_session(
        &self,
        user: &User,
        refresh_token: &str,
        payload: &Payload,
        user_agent: &str,
        client_ip: &str,
    ) -> Result<Session, SessionError>;

    async fn get_session(&self, id: Uuid) -> Result<Session, SessionError>;

    /// Most recent session of a user.
    async fn get_session_by_user_id(&self, user_id: Uuid) -> Result<Session, SessionError>;

    async fn delete_session(&self, id: Uuid) -> Result<(), SessionError>;
}

/// Session service errors
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("session not found")]
    NotFound,

    #[error("{context}: {source}")]
    Infrastructure {
        context: String,
        #[source]
        source: RepositoryError,
    },
}

impl SessionError {
    fn from_repository(context: impl Into<String>, error: RepositoryError) -> Self {
        match error {
            RepositoryError::NotFound => Self::NotFound,
            source => Self::Infrastructure {
                context: context.into(),
                source,
            },
        }
    }
}

/// SessionService implementation
pub struct SessionServiceImpl<S>
where
    S: SessionRepository,
{
    session_repo: Arc<S>,
}

impl<S> SessionServiceImpl<S>
where
    S: SessionRepository,
{
    pub fn new(session_repo: Arc<S>) -> Self {
        Self { session_repo }
    }
}

#[async_trait]
impl<S> SessionService for SessionServiceImpl<S>
where
    S: SessionRepository + 'static,
{
    #[tracing::instrument(skip(self, user, refresh_token, payload), fields(user_id = %user.id()))]
    async fn create_session(
        &self,
        user: &User,
        refresh_token: &str,
        payload: &Payload,
        user_agent: &str,
        client_ip: &str,
    ) -> Result<Session, SessionError> {
        let session = Session::new(
            user.id(),
            refresh_token.to_owned(),
            payload,
            user_agent.to_owned(),
            client_ip.to_owned(),
            Utc::now(),
        );

        let session = self
            .session_repo
            .create_session(&session)
            .await
            .map_err(|e| SessionError::Infrastructure {
                context: format!("create session for user {}", user.id()),
                source: e,
            })?;

        tracing::debug!(session_id = %session.id, "Session created");
        Ok(session)
    }

    async fn get_session(&self, id: Uuid) -> Result<Session, SessionError> {
        self.session_repo
            .get_session(id)
            .await
            .map_err(|e| SessionError::from_repository(format!("get session {id}"), e))
    }

    async fn get_session_by_user_id(&self, user_id: Uuid) -> Result<Session, SessionError> {
        self.session_repo
            .get_session_by_user_id(user_id)
            .await
            .map_err(|e| {
                SessionError::from_repository(format!("get session of user {user_id}"), e)
            })
    }

    #[tracing::instrument(skip(self))]
    async fn delete_session(&self, id: Uuid) -> Result<(), SessionError> {
        self.session_repo
            .delete_session(id)
            .await
            .map_err(|e| SessionError::from_repository(format!("delete session {id}"), e))
    }
}
