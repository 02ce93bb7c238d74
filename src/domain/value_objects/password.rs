//! Password hashing and comparison.
//!
//! Candidates are length-checked and then hashed with Argon2id. The resulting
//! [`PasswordHash`] holds the PHC string bytes and can only be compared
//! against a candidate through [`compare`]; it never prints its contents.

use std::fmt;

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{
    PasswordHash as PhcString, PasswordHasher, PasswordVerifier, SaltString,
};
use argon2::Argon2;

use crate::domain::errors::{AuthError, HashingError, PasswordError, ValidationError};

pub const PASSWORD_MIN_LEN: usize = 8;
/// Upper bound on candidate length in bytes.
pub const PASSWORD_MAX_LEN: usize = 72;

const REDACTED: &str = "{REDACTED}";

/// One-way hash of a password.
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordHash(Vec<u8>);

impl PasswordHash {
    /// Rehydrate a hash read back from storage. No hashing or validation
    /// takes place.
    pub fn from_trusted_source(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for PasswordHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PasswordHash(REDACTED)")
    }
}

impl fmt::Display for PasswordHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(REDACTED)
    }
}

/// Check the candidate's length bounds without hashing it.
pub fn validate_password(candidate: &str) -> Result<(), ValidationError> {
    if candidate.len() < PASSWORD_MIN_LEN {
        return Err(ValidationError::PasswordTooShort);
    }
    if candidate.len() > PASSWORD_MAX_LEN {
        return Err(ValidationError::PasswordTooLong);
    }
    Ok(())
}

/// Hash a candidate with Argon2id and a fresh random salt.
pub fn hash_password(candidate: &str) -> Result<PasswordHash, HashingError> {
    let salt = SaltString::generate(&mut OsRng);
    let phc = Argon2::default().hash_password(candidate.as_bytes(), &salt)?;

    Ok(PasswordHash(phc.to_string().into_bytes()))
}

/// Validate and hash a raw password candidate.
pub fn parse_password(candidate: &str) -> Result<PasswordHash, PasswordError> {
    parse_password_with(candidate, hash_password)
}

/// [`parse_password`] with a caller-provided hasher.
///
/// Hashing failures are passed through unchanged as [`PasswordError::Hashing`].
pub fn parse_password_with<H>(candidate: &str, hasher: H) -> Result<PasswordHash, PasswordError>
where
    H: FnOnce(&str) -> Result<PasswordHash, HashingError>,
{
    validate_password(candidate)?;
    Ok(hasher(candidate)?)
}

/// Verify `candidate` against `hash`.
///
/// Every failure, including an unreadable stored hash, is reported as the
/// same [`AuthError`].
pub fn compare(hash: &PasswordHash, candidate: &str) -> Result<(), AuthError> {
    let encoded = std::str::from_utf8(hash.as_bytes()).map_err(|_| AuthError)?;
    let parsed = PhcString::new(encoded).map_err(|_| AuthError)?;

    Argon2::default()
        .verify_password(candidate.as_bytes(), &parsed)
        .map_err(|_| AuthError)
}
