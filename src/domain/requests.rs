//! Validated request types.
//!
//! Each parser checks every field before failing, so the caller sees all
//! problems at once. Passwords are only hashed once every other field is
//! known to be valid.

use std::fmt;

use uuid::Uuid;

use super::entities::UserChanges;
use super::errors::{HashingError, RequestParseError, ValidationErrors};
use super::value_objects::{
    hash_password, validate_password, ETag, EmailAddress, PasswordHash, Role, Username,
};

/// A validated registration: the password is already hashed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationRequest {
    username: Username,
    email: EmailAddress,
    password_hash: PasswordHash,
}

impl RegistrationRequest {
    pub fn parse(username: &str, email: &str, password: &str) -> Result<Self, RequestParseError> {
        Self::parse_with(username, email, password, hash_password)
    }

    /// [`RegistrationRequest::parse`] with a caller-provided hasher.
    pub fn parse_with<H>(
        username: &str,
        email: &str,
        password: &str,
        hasher: H,
    ) -> Result<Self, RequestParseError>
    where
        H: FnOnce(&str) -> Result<PasswordHash, HashingError>,
    {
        let mut errors = ValidationErrors::new();

        let username = errors.collect(Username::parse(username));
        let email = errors.collect(EmailAddress::parse(email));
        let password_ok = errors.collect(validate_password(password));

        match (username, email, password_ok) {
            (Some(username), Some(email), Some(())) => Ok(Self {
                username,
                email,
                password_hash: hasher(password)?,
            }),
            _ => Err(errors.into()),
        }
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

    pub fn into_parts(self) -> (Username, EmailAddress, PasswordHash) {
        (self.username, self.email, self.password_hash)
    }
}

/// A login attempt. The password is kept as given so it can be compared
/// against the stored hash.
#[derive(Clone)]
pub struct LoginRequest {
    email: EmailAddress,
    password: String,
}

impl LoginRequest {
    pub fn parse(email: &str, password: &str) -> Result<Self, RequestParseError> {
        let email = EmailAddress::parse(email).map_err(ValidationErrors::from)?;

        Ok(Self {
            email,
            password: password.to_owned(),
        })
    }

    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    pub fn password(&self) -> &str {
        &self.password
    }
}

impl fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginRequest")
            .field("email", &self.email)
            .field("password", &"{REDACTED}")
            .finish()
    }
}

impl fmt::Display for LoginRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LoginRequest{{email: {}, password: {{REDACTED}}}}", self.email)
    }
}

/// Raw, optional fields of an update before validation.
#[derive(Debug, Clone, Copy, Default)]
pub struct UpdateFields<'a> {
    pub username: Option<&'a str>,
    pub email: Option<&'a str>,
    pub password: Option<&'a str>,
    pub role: Option<i32>,
}

/// A validated partial update of one user, conditioned on `etag`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateRequest {
    user_id: Uuid,
    etag: ETag,
    changes: UserChanges,
}

impl UpdateRequest {
    pub fn parse(
        user_id: Uuid,
        etag: ETag,
        fields: UpdateFields<'_>,
    ) -> Result<Self, RequestParseError> {
        Self::parse_with(user_id, etag, fields, hash_password)
    }

    /// [`UpdateRequest::parse`] with a caller-provided hasher.
    pub fn parse_with<H>(
        user_id: Uuid,
        etag: ETag,
        fields: UpdateFields<'_>,
        hasher: H,
    ) -> Result<Self, RequestParseError>
    where
        H: FnOnce(&str) -> Result<PasswordHash, HashingError>,
    {
        let mut errors = ValidationErrors::new();

        let username = fields
            .username
            .and_then(|candidate| errors.collect(Username::parse(candidate)));
        let email = fields
            .email
            .and_then(|candidate| errors.collect(EmailAddress::parse(candidate)));
        let password = fields
            .password
            .and_then(|candidate| errors.collect(validate_password(candidate)).map(|()| candidate));
        let role = fields
            .role
            .and_then(|candidate| errors.collect(Role::parse(candidate)));

        if !errors.is_empty() {
            return Err(errors.into());
        }

        let password_hash = password.map(hasher).transpose()?;

        Ok(Self {
            user_id,
            etag,
            changes: UserChanges {
                username,
                email,
                password_hash,
                role,
            },
        })
    }

    pub fn user_id(&self) -> Uuid {
        self.user_id
    }

    pub fn etag(&self) -> &ETag {
        &self.etag
    }

    pub fn changes(&self) -> &UserChanges {
        &self.changes
    }

    pub fn into_parts(self) -> (Uuid, ETag, UserChanges) {
        (self.user_id, self.etag, self.changes)
    }
}
