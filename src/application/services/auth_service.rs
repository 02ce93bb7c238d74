//! Authentication Service
//!
//! Turns a successful login into an access token, a refresh token and the
//! session bound to the refresh token. Access and refresh tokens are issued
//! under different keys, so neither verifies where the other is expected.

use std::sync::Arc;

use async_trait::async_trait;

use super::{SessionError, SessionService, TokenError, TokenService, UserError, UserService};
use crate::config::TokenSettings;
use crate::domain::{LoginRequest, Payload, Session, User};

/// Authentication service trait for dependency injection
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Authenticate and open a new session.
    async fn login(
        &self,
        request: &LoginRequest,
        user_agent: &str,
        client_ip: &str,
    ) -> Result<LoginOutcome, LoginError>;
}

/// Everything a client receives after logging in.
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub user: User,
    pub session: Session,
    pub access_token: String,
    pub access_payload: Payload,
    pub refresh_token: String,
    pub refresh_payload: Payload,
}

/// Login errors
#[derive(Debug, thiserror::Error)]
pub enum LoginError {
    #[error(transparent)]
    User(#[from] UserError),

    #[error(transparent)]
    Token(#[from] TokenError),

    #[error(transparent)]
    Session(#[from] SessionError),
}

/// AuthService implementation
pub struct AuthServiceImpl {
    users: Arc<dyn UserService>,
    access_tokens: Arc<dyn TokenService>,
    refresh_tokens: Arc<dyn TokenService>,
    sessions: Arc<dyn SessionService>,
    token_settings: TokenSettings,
}

impl AuthServiceImpl {
    pub fn new(
        users: Arc<dyn UserService>,
        access_tokens: Arc<dyn TokenService>,
        refresh_tokens: Arc<dyn TokenService>,
        sessions: Arc<dyn SessionService>,
        token_settings: TokenSettings,
    ) -> Self {
        Self {
            users,
            access_tokens,
            refresh_tokens,
            sessions,
            token_settings,
        }
    }
}

#[async_trait]
impl AuthService for AuthServiceImpl {
    #[tracing::instrument(skip(self, request), fields(email = %request.email()))]
    async fn login(
        &self,
        request: &LoginRequest,
        user_agent: &str,
        client_ip: &str,
    ) -> Result<LoginOutcome, LoginError> {
        let user = self.users.authenticate(request).await?;

        let (access_token, access_payload) = self
            .access_tokens
            .create_token(&user, &self.token_settings.access_token_duration)?;
        let (refresh_token, refresh_payload) = self
            .refresh_tokens
            .create_token(&user, &self.token_settings.refresh_token_duration)?;

        let session = self
            .sessions
            .create_session(&user, &refresh_token, &refresh_payload, user_agent, client_ip)
            .await?;

        tracing::info!(user_id = %user.id(), session_id = %session.id, "User logged in");

        Ok(LoginOutcome {
            user,
            session,
            access_token,
            access_payload,
            refresh_token,
            refresh_payload,
        })
    }
}
