//! Username value object.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::domain::errors::ValidationError;

/// Minimum username length in bytes.
pub const USERNAME_MIN_LEN: usize = 3;

/// Maximum username length in bytes.
pub const USERNAME_MAX_LEN: usize = 16;

static USERNAME_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        "^[a-zA-Z0-9_]{{{},{}}}$",
        USERNAME_MIN_LEN, USERNAME_MAX_LEN
    ))
    .expect("username pattern is a valid regex")
});

/// A validated username.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Username(String);

impl Username {
    /// Parse a raw candidate into a [`Username`].
    pub fn parse(candidate: &str) -> Result<Self, ValidationError> {
        if candidate.len() < USERNAME_MIN_LEN {
            return Err(ValidationError::UsernameTooShort);
        }
        if candidate.len() > USERNAME_MAX_LEN {
            return Err(ValidationError::UsernameTooLong);
        }
        if !USERNAME_REGEX.is_match(candidate) {
            return Err(ValidationError::UsernameFormat);
        }

        Ok(Self(candidate.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Username {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Username> for String {
    fn from(username: Username) -> Self {
        username.0
    }
}
