//! Request DTOs
//!
//! Raw API request bodies. Validation happens when these are parsed into
//! domain requests, so every field is accepted here as-is.

use serde::Deserialize;

use crate::domain::UpdateFields;

/// Registration request
#[derive(Debug, Deserialize)]
pub struct RegisterUserRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Login request
#[derive(Deserialize)]
pub struct LoginUserRequest {
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for LoginUserRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginUserRequest")
            .field("email", &self.email)
            .field("password", &"REDACTED")
            .finish()
    }
}

/// Partial user update; absent fields are left unchanged.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateUserRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<i32>,
}

impl UpdateUserRequest {
    pub fn fields(&self) -> UpdateFields<'_> {
        UpdateFields {
            username: self.username.as_deref(),
            email: self.email.as_deref(),
            password: self.password.as_deref(),
            role: self.role,
        }
    }
}
