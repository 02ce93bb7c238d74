//! Domain error taxonomy.
//!
//! Field-tagged validation errors produced by the value-object parsers, the
//! aggregate that request parsers accumulate them into, and the error
//! contract of the persistence collaborators.

use std::fmt;

use serde::Serialize;

use super::value_objects::{
    PASSWORD_MAX_LEN, PASSWORD_MIN_LEN, USERNAME_MAX_LEN, USERNAME_MIN_LEN,
};

/// Input field a validation error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Username,
    Email,
    Password,
    Role,
}

impl Field {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Username => "username",
            Self::Email => "email",
            Self::Password => "password",
            Self::Role => "role",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single rejected input value.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("username must be at least {} characters long", USERNAME_MIN_LEN)]
    UsernameTooShort,

    #[error("username must be at most {} characters long", USERNAME_MAX_LEN)]
    UsernameTooLong,

    #[error("username may only contain letters, digits and underscores")]
    UsernameFormat,

    #[error("{0:?} is not a valid email address")]
    EmailAddressFormat(String),

    #[error("password must be at least {} characters long", PASSWORD_MIN_LEN)]
    PasswordTooShort,

    #[error("password must be at most {} characters long", PASSWORD_MAX_LEN)]
    PasswordTooLong,

    #[error("role {0} is out of range")]
    RoleOutOfRange(i32),
}

impl ValidationError {
    /// The field this error is tagged with.
    pub fn field(&self) -> Field {
        match self {
            Self::UsernameTooShort | Self::UsernameTooLong | Self::UsernameFormat => {
                Field::Username
            }
            Self::EmailAddressFormat(_) => Field::Email,
            Self::PasswordTooShort | Self::PasswordTooLong => Field::Password,
            Self::RoleOutOfRange(_) => Field::Role,
        }
    }
}

/// Every validation failure found while parsing one request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors(Vec<ValidationError>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, error: ValidationError) {
        self.0.push(error);
    }

    /// Keep the value of a successful parse, or record its error.
    pub fn collect<T>(&mut self, result: Result<T, ValidationError>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(error) => {
                self.push(error);
                None
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ValidationError> {
        self.0.iter()
    }

    /// Whether any error is tagged with `field`.
    pub fn contains_field(&self, field: Field) -> bool {
        self.0.iter().any(|e| e.field() == field)
    }
}

impl From<ValidationError> for ValidationErrors {
    fn from(error: ValidationError) -> Self {
        Self(vec![error])
    }
}

impl IntoIterator for ValidationErrors {
    type Item = ValidationError;
    type IntoIter = std::vec::IntoIter<ValidationError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("validation errors:")?;
        for error in &self.0 {
            write!(f, "\n\t- {}: {}", error.field(), error)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

/// Hashing a password candidate failed for reasons unrelated to its content.
#[derive(Debug, thiserror::Error)]
#[error("hash password: {0}")]
pub struct HashingError(#[from] pub argon2::password_hash::Error);

/// Failure of [`parse_password`](super::value_objects::parse_password).
#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    #[error(transparent)]
    Invalid(#[from] ValidationError),

    #[error(transparent)]
    Hashing(#[from] HashingError),
}

/// Failure to turn raw request input into a validated request.
#[derive(Debug, thiserror::Error)]
pub enum RequestParseError {
    #[error(transparent)]
    Invalid(#[from] ValidationErrors),

    #[error(transparent)]
    Hashing(#[from] HashingError),
}

/// Authentication failed.
///
/// Carries no detail: an unknown identity and a wrong secret
/// are indistinguishable to whoever receives it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("authentication failed")]
pub struct AuthError;

/// Errors reported by the persistence collaborators.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record not found")]
    NotFound,

    #[error("unique constraint {constraint:?} violated")]
    UniqueViolation { constraint: String },

    /// A conditional write matched no row.
    #[error("no rows affected")]
    NoRowsAffected,

    #[error("corrupt record: {0}")]
    CorruptRecord(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}
