//! Email address value object.

use std::fmt;

use serde::{Deserialize, Serialize};
use validator::ValidateEmail;

use crate::domain::errors::ValidationError;

/// A syntactically valid mailbox address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Parse a raw candidate, keeping it verbatim on success.
    ///
    /// The error carries the rejected candidate for diagnostics.
    pub fn parse(candidate: &str) -> Result<Self, ValidationError> {
        if !candidate.validate_email() {
            return Err(ValidationError::EmailAddressFormat(candidate.to_owned()));
        }

        Ok(Self(candidate.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for EmailAddress {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<EmailAddress> for String {
    fn from(email: EmailAddress) -> Self {
        email.0
    }
}
