//! Custom Extractors
//!
//! Axum extractors for conditional requests and client metadata.

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderMap},
};

use crate::domain::ETag;
use crate::shared::error::AppError;

/// Entity tag a mutation is conditioned on, taken from `If-Match`.
///
/// A missing header is rejected with 428, a malformed one with 400.
#[derive(Debug, Clone, Copy)]
pub struct IfMatch(pub ETag);

impl<S> FromRequestParts<S> for IfMatch
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let value = parts.headers.get(header::IF_MATCH).ok_or_else(|| {
            AppError::PreconditionRequired("If-Match header is required".into())
        })?;

        let value = value
            .to_str()
            .map_err(|_| AppError::BadRequest("Invalid If-Match header".into()))?;

        Ok(IfMatch(value.trim().parse::<ETag>()?))
    }
}

/// User agent and client address recorded on login.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientInfo {
    pub user_agent: String,
    pub client_ip: String,
}

impl ClientInfo {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let header_str = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::trim)
                .filter(|v| !v.is_empty())
        };

        let client_ip = header_str("x-forwarded-for")
            .and_then(|forwarded| forwarded.split(',').next())
            .map(str::trim)
            .or_else(|| header_str("x-real-ip"))
            .unwrap_or_default()
            .to_string();

        Self {
            user_agent: header_str(header::USER_AGENT.as_str())
                .unwrap_or_default()
                .to_string(),
            client_ip,
        }
    }
}

impl<S> FromRequestParts<S> for ClientInfo
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::from_headers(&parts.headers))
    }
}
