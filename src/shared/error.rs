//! Application Error Types
//!
//! Centralized error handling with Axum integration. Every service error
//! converts into [`AppError`] through one exhaustive match, which is the only
//! place HTTP status codes are chosen.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::application::services::{LoginError, SessionError, TokenError, UserError};
use crate::domain::{ParseETagError, RequestParseError, ValidationErrors};

/// Application error type
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Token expired: {0}")]
    TokenExpired(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Precondition failed: {0}")]
    PreconditionFailed(String),

    #[error("Precondition required: {0}")]
    PreconditionRequired(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error(transparent)]
    Validation(#[from] ValidationErrors),
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub code: u16,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<FieldError>>,
}

/// Field-level validation error
#[derive(Debug, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl AppError {
    fn status_and_code(&self) -> (StatusCode, u16) {
        match self {
            AppError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, 10000),
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, 10001),
            AppError::BadRequest(_) => (StatusCode::BAD_REQUEST, 10002),
            AppError::Unauthorized(_) => (StatusCode::UNAUTHORIZED, 10003),
            AppError::Forbidden(_) => (StatusCode::FORBIDDEN, 10004),
            AppError::Conflict(_) => (StatusCode::CONFLICT, 10005),
            AppError::Validation(_) => (StatusCode::BAD_REQUEST, 10007),
            AppError::PreconditionFailed(_) => (StatusCode::PRECONDITION_FAILED, 10008),
            AppError::PreconditionRequired(_) => (StatusCode::PRECONDITION_REQUIRED, 10009),
            AppError::TokenExpired(_) => (StatusCode::UNAUTHORIZED, 10010),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status_and_code().0
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        let (message, errors) = match self {
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                ("Internal server error".to_string(), None)
            }
            AppError::Validation(errors) => {
                let fields = errors
                    .iter()
                    .map(|e| FieldError {
                        field: e.field().to_string(),
                        message: e.to_string(),
                    })
                    .collect();
                ("Validation failed".to_string(), Some(fields))
            }
            AppError::NotFound(msg)
            | AppError::BadRequest(msg)
            | AppError::Unauthorized(msg)
            | AppError::TokenExpired(msg)
            | AppError::Forbidden(msg)
            | AppError::Conflict(msg)
            | AppError::PreconditionFailed(msg)
            | AppError::PreconditionRequired(msg) => (msg, None),
        };

        let body = ErrorResponse {
            code,
            message,
            errors,
        };

        (status, Json(body)).into_response()
    }
}

impl From<UserError> for AppError {
    fn from(error: UserError) -> Self {
        match error {
            UserError::Validation(errors) => AppError::Validation(errors),
            UserError::NotFound => AppError::NotFound("User not found".into()),
            UserError::Auth(_) => AppError::Unauthorized("Invalid email or password".into()),
            UserError::DuplicateUsername => AppError::Conflict("Username already taken".into()),
            UserError::DuplicateEmail => AppError::Conflict("Email already registered".into()),
            e @ UserError::ConcurrentModification { .. } => {
                AppError::PreconditionFailed(e.to_string())
            }
            e @ UserError::Infrastructure { .. } => AppError::Internal(e.to_string()),
        }
    }
}

impl From<TokenError> for AppError {
    fn from(error: TokenError) -> Self {
        match error {
            TokenError::InvalidToken => AppError::Unauthorized("Invalid token".into()),
            e @ TokenError::ExpiredToken { .. } => AppError::TokenExpired(e.to_string()),
            e @ (TokenError::InvalidDuration(_) | TokenError::Creation(_)) => {
                AppError::Internal(e.to_string())
            }
        }
    }
}

impl From<SessionError> for AppError {
    fn from(error: SessionError) -> Self {
        match error {
            SessionError::NotFound => AppError::NotFound("Session not found".into()),
            e @ SessionError::Infrastructure { .. } => AppError::Internal(e.to_string()),
        }
    }
}

impl From<LoginError> for AppError {
    fn from(error: LoginError) -> Self {
        match error {
            LoginError::User(e) => e.into(),
            LoginError::Token(e) => e.into(),
            LoginError::Session(e) => e.into(),
        }
    }
}

impl From<RequestParseError> for AppError {
    fn from(error: RequestParseError) -> Self {
        match error {
            RequestParseError::Invalid(errors) => AppError::Validation(errors),
            RequestParseError::Hashing(e) => AppError::Internal(e.to_string()),
        }
    }
}

impl From<ParseETagError> for AppError {
    fn from(error: ParseETagError) -> Self {
        AppError::BadRequest(format!("Invalid If-Match header: {error}"))
    }
}
