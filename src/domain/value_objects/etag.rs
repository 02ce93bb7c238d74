//! Optimistic-concurrency entity tags.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

const SEPARATOR: &str = "::";

/// Version tag of an entity: its id and last-modified timestamp.
///
/// Serialized as `"<uuid>::<rfc3339 timestamp>"`, quotes included, with the
/// full sub-second precision of the timestamp preserved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ETag {
    id: Uuid,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseETagError {
    #[error("etag must be enclosed in double quotes")]
    MissingQuotes,

    #[error("etag must have exactly 2 components, found {0}")]
    ComponentCount(usize),

    #[error("etag id is not a valid UUID: {0}")]
    InvalidId(String),

    #[error("etag timestamp is not a valid RFC 3339 timestamp: {0}")]
    InvalidTimestamp(String),
}

impl ETag {
    pub fn new(id: Uuid, updated_at: DateTime<Utc>) -> Self {
        Self { id, updated_at }
    }

    pub fn parse(candidate: &str) -> Result<Self, ParseETagError> {
        let inner = candidate
            .strip_prefix('"')
            .and_then(|rest| rest.strip_suffix('"'))
            .ok_or(ParseETagError::MissingQuotes)?;

        let components: Vec<&str> = inner.split(SEPARATOR).collect();
        let [id, timestamp] = components[..] else {
            return Err(ParseETagError::ComponentCount(components.len()));
        };

        let id = Uuid::parse_str(id).map_err(|_| ParseETagError::InvalidId(id.to_owned()))?;
        let updated_at = DateTime::parse_from_rfc3339(timestamp)
            .map_err(|_| ParseETagError::InvalidTimestamp(timestamp.to_owned()))?
            .with_timezone(&Utc);

        Ok(Self { id, updated_at })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

impl fmt::Display for ETag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "\"{}{}{}\"",
            self.id,
            SEPARATOR,
            self.updated_at.to_rfc3339_opts(SecondsFormat::AutoSi, true)
        )
    }
}

impl FromStr for ETag {
    type Err = ParseETagError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for ETag {
    type Error = ParseETagError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ETag> for String {
    fn from(etag: ETag) -> Self {
        etag.to_string()
    }
}
