//! To-do list entity.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::email::Email;
use super::timestamp::Timestamp;

// =============================================================================
// ListId
// =============================================================================

/// Unique identifier for a list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ListId(Uuid);

impl ListId {
    /// Creates a `ListId` from an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the inner UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }

    /// Generates a time-ordered identifier (UUID v7).
    ///
    /// **Note**: reads the clock and the random number generator.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::now_v7())
    }

    /// Parses the textual form used in list URLs.
    ///
    /// # Errors
    ///
    /// Returns the UUID parse error for anything that is not a UUID.
    pub fn parse(value: &str) -> Result<Self, uuid::Error> {
        Uuid::parse_str(value).map(Self)
    }

    /// Canonical page URL of the list.
    #[must_use]
    pub fn url(&self) -> String {
        format!("/lists/{}/", self.0)
    }
}

impl std::fmt::Display for ListId {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

// =============================================================================
// List
// =============================================================================

/// A to-do list, optionally owned, possibly shared with other users.
///
/// Items are stored separately and reference their list by id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct List {
    pub id: ListId,
    /// `None` for lists created by anonymous visitors.
    pub owner: Option<Email>,
    /// Sorted, without duplicates.
    pub shared_with: Vec<Email>,
    pub created_at: Timestamp,
}

impl List {
    #[must_use]
    pub const fn new(id: ListId, owner: Option<Email>, created_at: Timestamp) -> Self {
        Self {
            id,
            owner,
            shared_with: Vec::new(),
            created_at,
        }
    }

    /// Canonical page URL of the list.
    #[must_use]
    pub fn absolute_url(&self) -> String {
        self.id.url()
    }

    #[must_use]
    pub fn is_owned_by(&self, email: &Email) -> bool {
        self.owner.as_ref() == Some(email)
    }

    #[must_use]
    pub fn is_shared_with(&self, email: &Email) -> bool {
        self.shared_with.binary_search(email).is_ok()
    }

    /// Adds `email` to the sharees. Returns `false` if it was already there.
    pub fn share_with(&mut self, email: Email) -> bool {
        match self.shared_with.binary_search(&email) {
            Ok(_) => false,
            Err(position) => {
                self.shared_with.insert(position, email);
                true
            }
        }
    }
}
