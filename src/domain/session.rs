//! Browser sessions and the one-shot messages they carry.

use chrono::Duration;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::email::Email;
use super::timestamp::Timestamp;

// =============================================================================
// SessionKey
// =============================================================================

/// Opaque session key stored in the session cookie.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionKey(String);

impl SessionKey {
    /// Wraps a key read back from a cookie or the store.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Generates a fresh random key.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SessionKey {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(&self.0)
    }
}

// =============================================================================
// Flash messages
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageLevel {
    Success,
    Error,
}

/// A notice shown on the next rendered page and then discarded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlashMessage {
    pub level: MessageLevel,
    pub text: String,
}

impl FlashMessage {
    #[must_use]
    pub fn new(level: MessageLevel, text: impl Into<String>) -> Self {
        Self {
            level,
            text: text.into(),
        }
    }
}

// =============================================================================
// Session
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub key: SessionKey,
    /// The logged-in user, if any.
    pub user: Option<Email>,
    pub messages: Vec<FlashMessage>,
    pub created_at: Timestamp,
}

impl Session {
    #[must_use]
    pub const fn anonymous(key: SessionKey, created_at: Timestamp) -> Self {
        Self {
            key,
            user: None,
            messages: Vec::new(),
            created_at,
        }
    }

    #[must_use]
    pub const fn authenticated(key: SessionKey, user: Email, created_at: Timestamp) -> Self {
        Self {
            key,
            user: Some(user),
            messages: Vec::new(),
            created_at,
        }
    }

    /// A session expires once strictly more than `max_age` has passed since
    /// it was created.
    #[must_use]
    pub fn is_expired(&self, now: &Timestamp, max_age: Duration) -> bool {
        self.created_at.elapsed_until(now) > max_age
    }

    pub fn push_message(&mut self, level: MessageLevel, text: impl Into<String>) {
        self.messages.push(FlashMessage::new(level, text));
    }

    /// Drains the queued messages.
    pub fn take_messages(&mut self) -> Vec<FlashMessage> {
        std::mem::take(&mut self.messages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn test_generated_keys_are_unique_and_opaque() {
        let first = SessionKey::generate();
        let second = SessionKey::generate();

        assert_ne!(first, second);
        assert_eq!(first.as_str().len(), 32);
        assert!(first.as_str().chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[rstest]
    fn test_anonymous_session_has_no_user() {
        let session = Session::anonymous(SessionKey::generate(), Timestamp::now());
        assert!(session.user.is_none());
    }

    #[rstest]
    #[case(Duration::minutes(59), false)]
    #[case(Duration::minutes(60), false)]
    #[case(Duration::minutes(61), true)]
    fn test_session_expiry(#[case] age: Duration, #[case] expired: bool) {
        let created_at = Timestamp::now();
        let now = Timestamp::from_datetime(*created_at.as_datetime() + age);
        let session = Session::anonymous(SessionKey::generate(), created_at);

        assert_eq!(session.is_expired(&now, Duration::minutes(60)), expired);
    }

    #[rstest]
    fn test_take_messages_drains_queue() {
        let mut session = Session::authenticated(
            SessionKey::generate(),
            Email::parse("edith@example.com").unwrap(),
            Timestamp::now(),
        );
        session.push_message(MessageLevel::Success, "first");
        session.push_message(MessageLevel::Error, "second");

        let messages = session.take_messages();

        assert_eq!(
            messages,
            vec![
                FlashMessage::new(MessageLevel::Success, "first"),
                FlashMessage::new(MessageLevel::Error, "second"),
            ]
        );
        assert!(session.take_messages().is_empty());
    }

    #[rstest]
    fn test_message_level_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&MessageLevel::Success).unwrap(),
            "\"success\""
        );
    }
}
