//! User Service
//!
//! Registration, authentication and optimistic-concurrency updates of users.
//! Repository failures are translated into [`UserError`] here; no raw
//! constraint names or row counts leave this module.

use std::error::Error as StdError;
use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{
    compare, AuthError, ETag, LoginRequest, PasswordHash, RegistrationRequest, RepositoryError,
    RequestParseError, UpdateRequest, User, UserRepository, ValidationErrors,
    EMAIL_UNIQUE_CONSTRAINT, USERNAME_UNIQUE_CONSTRAINT,
};

/// Verifies a password candidate against a stored hash.
pub type PasswordComparator = fn(&PasswordHash, &str) -> Result<(), AuthError>;

/// User service trait
#[async_trait]
pub trait UserService: Send + Sync {
    /// Create a user from a validated registration.
    async fn register(&self, request: RegistrationRequest) -> Result<User, UserError>;

    /// Get user by ID
    async fn get_user(&self, id: Uuid) -> Result<User, UserError>;

    /// Check a login attempt. Unknown emails and wrong passwords fail the
    /// same way.
    async fn authenticate(&self, request: &LoginRequest) -> Result<User, UserError>;

    /// Apply a partial update if the caller's ETag is still current.
    async fn update_user(&self, request: UpdateRequest) -> Result<User, UserError>;
}

/// User service errors
#[derive(Debug, thiserror::Error)]
pub enum UserError {
    #[error(transparent)]
    Validation(#[from] ValidationErrors),

    #[error("user not found")]
    NotFound,

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("username is already taken")]
    DuplicateUsername,

    #[error("email is already registered")]
    DuplicateEmail,

    #[error("user {id} was modified concurrently; {etag} is no longer current")]
    ConcurrentModification { id: Uuid, etag: ETag },

    #[error("{context}: {source}")]
    Infrastructure {
        context: String,
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },
}

impl UserError {
    pub fn infrastructure(
        context: impl Into<String>,
        source: impl Into<Box<dyn StdError + Send + Sync>>,
    ) -> Self {
        Self::Infrastructure {
            context: context.into(),
            source: source.into(),
        }
    }

    /// Map a repository failure, resolving unique violations to the
    /// duplicate kind of the constraint that fired.
    fn from_repository(context: impl Into<String>, error: RepositoryError) -> Self {
        match error {
            RepositoryError::NotFound => Self::NotFound,
            RepositoryError::UniqueViolation { constraint }
                if constraint == USERNAME_UNIQUE_CONSTRAINT =>
            {
                Self::DuplicateUsername
            }
            RepositoryError::UniqueViolation { constraint }
                if constraint == EMAIL_UNIQUE_CONSTRAINT =>
            {
                Self::DuplicateEmail
            }
            other => Self::infrastructure(context, other),
        }
    }
}

impl From<RequestParseError> for UserError {
    fn from(error: RequestParseError) -> Self {
        match error {
            RequestParseError::Invalid(errors) => Self::Validation(errors),
            RequestParseError::Hashing(e) => Self::infrastructure("hash password", e),
        }
    }
}

/// UserService implementation
pub struct UserServiceImpl<U>
where
    U: UserRepository,
{
    user_repo: Arc<U>,
    compare_password: PasswordComparator,
}

impl<U> UserServiceImpl<U>
where
    U: UserRepository,
{
    pub fn new(user_repo: Arc<U>) -> Self {
        Self::with_comparator(user_repo, compare)
    }

    pub fn with_comparator(user_repo: Arc<U>, compare_password: PasswordComparator) -> Self {
        Self {
            user_repo,
            compare_password,
        }
    }
}

#[async_trait]
impl<U> UserService for UserServiceImpl<U>
where
    U: UserRepository + 'static,
{
    #[tracing::instrument(skip_all, fields(username = %request.username()))]
    async fn register(&self, request: RegistrationRequest) -> Result<User, UserError> {
        let user = self
            .user_repo
            .create_user(&request)
            .await
            .map_err(|e| UserError::from_repository("create user", e))?;

        tracing::info!(user_id = %user.id(), "User registered");
        Ok(user)
    }

    async fn get_user(&self, id: Uuid) -> Result<User, UserError> {
        self.user_repo
            .get_user_by_id(id)
            .await
            .map_err(|e| UserError::from_repository(format!("get user {id}"), e))
    }

    #[tracing::instrument(skip_all)]
    async fn authenticate(&self, request: &LoginRequest) -> Result<User, UserError> {
        let user = match self.user_repo.get_user_by_email(request.email()).await {
            Ok(user) => user,
            Err(RepositoryError::NotFound) => return Err(AuthError.into()),
            Err(e) => return Err(UserError::infrastructure("get user by email", e)),
        };

        let compare_password = self.compare_password;
        let hash = user.password_hash().clone();
        let candidate = request.password().to_owned();
        tokio::task::spawn_blocking(move || compare_password(&hash, &candidate))
            .await
            .map_err(|e| UserError::infrastructure("compare password", e))??;

        tracing::debug!(user_id = %user.id(), "User authenticated");
        Ok(user)
    }

    #[tracing::instrument(skip_all, fields(user_id = %request.user_id()))]
    async fn update_user(&self, request: UpdateRequest) -> Result<User, UserError> {
        let (id, etag, changes) = request.into_parts();

        let exists = self
            .user_repo
            .user_exists(id)
            .await
            .map_err(|e| UserError::infrastructure(format!("check user {id} exists"), e))?;
        if !exists {
            return Err(UserError::NotFound);
        }

        match self.user_repo.update_user(id, &changes, &etag).await {
            Ok(user) => {
                tracing::info!(etag = %user.etag(), "User updated");
                Ok(user)
            }
            Err(RepositoryError::NoRowsAffected) => {
                tracing::warn!(%etag, "Stale ETag rejected");
                Err(UserError::ConcurrentModification { id, etag })
            }
            Err(e) => Err(UserError::from_repository(format!("update user {id}"), e)),
        }
    }
}
