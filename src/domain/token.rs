//! Single-use login tokens for passwordless authentication.

use chrono::Duration;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::email::Email;
use super::timestamp::Timestamp;

/// Random identifier carried in the emailed login link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenId(Uuid);

impl TokenId {
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }

    /// Generates a random (v4) identifier. Not time-ordered, so not guessable
    /// from the issue time.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for TokenId {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// A pending login for `email`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginToken {
    pub uid: TokenId,
    pub email: Email,
    pub created_at: Timestamp,
}

impl LoginToken {
    #[must_use]
    pub const fn new(uid: TokenId, email: Email, created_at: Timestamp) -> Self {
        Self {
            uid,
            email,
            created_at,
        }
    }

    /// A token is expired once strictly more than `ttl` has passed.
    #[must_use]
    pub fn is_expired(&self, now: &Timestamp, ttl: Duration) -> bool {
        self.created_at.elapsed_until(now) > ttl
    }

    /// Site-relative path that exchanges this token for a session.
    #[must_use]
    pub fn login_path(&self) -> String {
        format!("/accounts/login?token={}", self.uid)
    }
}
