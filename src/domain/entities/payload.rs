//! Token payload.

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::User;

/// Claims carried inside an access or refresh token.
///
/// Built when a token is issued and rebuilt when it is verified; never
/// stored on its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payload {
    /// Unique token identifier.
    pub id: Uuid,
    pub user_id: Uuid,
    /// Role name of the subject at issue time.
    pub role: String,
    pub issued_at: DateTime<Utc>,
    pub expired_at: DateTime<Utc>,
}

impl Payload {
    /// Payload for `user` valid for `duration` from `now`.
    pub fn new(user: &User, duration: TimeDelta, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id: user.id(),
            role: user.role().to_string(),
            issued_at: now,
            expired_at: now + duration,
        }
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expired_at
    }
}
