//! User aggregate and repository trait.
//!
//! Maps to the `users` table in the database schema.

use async_trait::async_trait;
use chrono::{DateTime, DurationRound, TimeDelta, Utc};
use uuid::Uuid;

use crate::domain::errors::RepositoryError;
use crate::domain::requests::RegistrationRequest;
use crate::domain::value_objects::{ETag, EmailAddress, PasswordHash, Role, Username};

/// Unique constraint on `users.username`.
pub const USERNAME_UNIQUE_CONSTRAINT: &str = "users_username_key";

/// Unique constraint on `users.email`.
pub const EMAIL_UNIQUE_CONSTRAINT: &str = "users_email_key";

/// A registered user.
///
/// Fields are read-only outside the domain layer; a `User` is obtained from
/// the repository and changed only through [`UserRepository::update_user`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    id: Uuid,
    username: Username,
    email: EmailAddress,
    password_hash: PasswordHash,
    role: Role,
    created_at: DateTime<Utc>,
    password_changed_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Every column of a stored user, used by repositories to rehydrate a
/// [`User`].
#[derive(Debug, Clone)]
pub struct UserParts {
    pub id: Uuid,
    pub username: Username,
    pub email: EmailAddress,
    pub password_hash: PasswordHash,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub password_changed_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<UserParts> for User {
    fn from(parts: UserParts) -> Self {
        Self {
            id: parts.id,
            username: parts.username,
            email: parts.email,
            password_hash: parts.password_hash,
            role: parts.role,
            created_at: parts.created_at,
            password_changed_at: parts.password_changed_at,
            updated_at: parts.updated_at,
        }
    }
}

impl User {
    /// Build a freshly registered user with the default role.
    pub fn register(id: Uuid, request: RegistrationRequest, now: DateTime<Utc>) -> Self {
        let now = truncate_to_micros(now);
        let (username, email, password_hash) = request.into_parts();

        Self {
            id,
            username,
            email,
            password_hash,
            role: Role::default(),
            created_at: now,
            password_changed_at: now,
            updated_at: now,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn username(&self) -> &Username {
        &self.username
    }

    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    pub fn password_hash(&self) -> &PasswordHash {
        &self.password_hash
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn password_changed_at(&self) -> DateTime<Utc> {
        self.password_changed_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Current version tag of this user.
    pub fn etag(&self) -> ETag {
        ETag::new(self.id, self.updated_at)
    }

    /// Apply a partial update and advance the version timestamp.
    ///
    /// Absent fields keep their current value.
    pub fn apply(&mut self, changes: UserChanges, now: DateTime<Utc>) {
        if let Some(username) = changes.username {
            self.username = username;
        }
        if let Some(email) = changes.email {
            self.email = email;
        }
        if let Some(password_hash) = changes.password_hash {
            self.password_hash = password_hash;
            self.password_changed_at = truncate_to_micros(now);
        }
        if let Some(role) = changes.role {
            self.role = role;
        }
        self.updated_at = next_updated_at(self.updated_at, now);
    }
}

#[cfg(test)]
impl User {
    /// A stored-looking user with a cheap, non-verifiable password hash.
    pub(crate) fn fixture(username: &str, role: Role) -> Self {
        let now = truncate_to_micros(Utc::now());
        Self {
            id: Uuid::new_v4(),
            username: Username::parse(username).expect("fixture username"),
            email: EmailAddress::parse(&format!("{username}@example.com"))
                .expect("fixture email"),
            password_hash: PasswordHash::from_trusted_source(b"fixture".to_vec()),
            role,
            created_at: now,
            password_changed_at: now,
            updated_at: now,
        }
    }
}

/// Fields to overwrite in a partial user update. `None` leaves the stored
/// value unchanged; there is no way to clear a field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserChanges {
    pub username: Option<Username>,
    pub email: Option<EmailAddress>,
    pub password_hash: Option<PasswordHash>,
    pub role: Option<Role>,
}

/// Timestamp a mutation stamps on a user last modified at `previous`.
///
/// Truncated to microseconds to match `timestamptz`, and always strictly
/// after `previous` so consecutive writes never share an ETag.
pub fn next_updated_at(previous: DateTime<Utc>, now: DateTime<Utc>) -> DateTime<Utc> {
    truncate_to_micros(now).max(previous + TimeDelta::microseconds(1))
}

fn truncate_to_micros(at: DateTime<Utc>) -> DateTime<Utc> {
    at.duration_trunc(TimeDelta::microseconds(1)).unwrap_or(at)
}

/// Persistence contract for users.
///
/// Every call is cancelled by dropping its future.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Fails with [`RepositoryError::NotFound`] when no user has this id.
    async fn get_user_by_id(&self, id: Uuid) -> Result<User, RepositoryError>;

    /// Fails with [`RepositoryError::NotFound`] when no user has this email.
    async fn get_user_by_email(&self, email: &EmailAddress) -> Result<User, RepositoryError>;

    async fn user_exists(&self, id: Uuid) -> Result<bool, RepositoryError>;

    /// Insert a new user. A taken username or email fails with
    /// [`RepositoryError::UniqueViolation`] naming the constraint.
    async fn create_user(&self, request: &RegistrationRequest) -> Result<User, RepositoryError>;

    /// Apply `changes` only if the stored version still matches `expected`.
    ///
    /// The comparison and the write are one atomic step. A version mismatch
    /// fails with [`RepositoryError::NoRowsAffected`].
    async fn update_user(
        &self,
        id: Uuid,
        changes: &UserChanges,
        expected: &ETag,
    ) -> Result<User, RepositoryError>;
}
