//! Application Startup
//!
//! Application building and server initialization.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::Router;
use sqlx::PgPool;
use tokio::net::TcpListener;

use crate::application::services::{
    AuthService, AuthServiceImpl, PasetoTokenService, SessionService, SessionServiceImpl,
    TokenError, TokenService, UserService, UserServiceImpl,
};
use crate::config::Settings;
use crate::domain::{SessionRepository, UserRepository};
use crate::infrastructure::database;
use crate::infrastructure::repositories::{InMemoryStore, PgSessionRepository, PgUserRepository};
use crate::presentation::http::{handlers, routes};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserService>,
    pub sessions: Arc<dyn SessionService>,
    /// Verifies access tokens only; refresh tokens use a separate key.
    pub tokens: Arc<dyn TokenService>,
    pub auth: Arc<dyn AuthService>,
    pub settings: Arc<Settings>,
    /// Present when running against PostgreSQL; used by readiness checks.
    pub db: Option<PgPool>,
}

impl AppState {
    /// Wire the services over the given repositories.
    ///
    /// Generates one symmetric key for access tokens and another for refresh
    /// tokens; every clone of the state shares them.
    pub fn new<U, S>(
        user_repo: Arc<U>,
        session_repo: Arc<S>,
        settings: Settings,
        db: Option<PgPool>,
    ) -> Result<Self, TokenError>
    where
        U: UserRepository + 'static,
        S: SessionRepository + 'static,
    {
        let users: Arc<dyn UserService> = Arc::new(UserServiceImpl::new(user_repo));
        let sessions: Arc<dyn SessionService> = Arc::new(SessionServiceImpl::new(session_repo));
        let tokens: Arc<dyn TokenService> = Arc::new(PasetoTokenService::new()?);
        let refresh_tokens: Arc<dyn TokenService> = Arc::new(PasetoTokenService::new()?);
        let auth: Arc<dyn AuthService> = Arc::new(AuthServiceImpl::new(
            users.clone(),
            tokens.clone(),
            refresh_tokens,
            sessions.clone(),
            settings.token.clone(),
        ));

        Ok(Self {
            users,
            sessions,
            tokens,
            auth,
            settings: Arc::new(settings),
            db,
        })
    }

    /// State backed by a fresh [`InMemoryStore`].
    pub fn in_memory(settings: Settings) -> Result<Self, TokenError> {
        let store = Arc::new(InMemoryStore::new());
        Self::new(store.clone(), store, settings, None)
    }
}

/// Application instance
pub struct Application {
    listener: TcpListener,
    router: Router,
}

impl Application {
    /// Build the application from settings
    pub async fn build(settings: Settings) -> Result<Self> {
        handlers::health::init_server_start();

        let state = match settings.database.url.clone() {
            Some(url) => {
                let db = database::create_pool(&settings.database, &url).await?;
                tracing::info!("Database connection pool created");

                database::run_migrations(&db).await?;
                tracing::info!("Database migrations applied");

                AppState::new(
                    Arc::new(PgUserRepository::new(db.clone())),
                    Arc::new(PgSessionRepository::new(db.clone())),
                    settings.clone(),
                    Some(db),
                )?
            }
            None => {
                tracing::warn!("No database configured, using the in-memory store");
                AppState::in_memory(settings.clone())?
            }
        };

        let router = routes::create_router(state);

        let listener = TcpListener::bind(settings.server_addr()).await?;
        tracing::info!("Listening on {}", listener.local_addr()?);

        Ok(Self { listener, router })
    }

    /// Run the server until stopped
    pub async fn run_until_stopped(self) -> Result<()> {
        axum::serve(self.listener, self.router).await?;
        Ok(())
    }

    /// Get the bound address
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }
}
