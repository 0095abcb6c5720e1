//! List items and the rules their text must satisfy.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::list::ListId;

/// Message shown when an item is submitted with no text.
pub const EMPTY_ITEM_ERROR: &str = "You can't have an empty list item";

/// Message shown when a list already holds an item with the same text.
pub const DUPLICATE_ITEM_ERROR: &str = "You've already got this in your list";

// =============================================================================
// Validation
// =============================================================================

/// The two ways a submitted item can be rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum ItemValidationError {
    #[error("You can't have an empty list item")]
    Empty,

    #[error("You've already got this in your list")]
    Duplicate,
}

impl ItemValidationError {
    /// The user-facing message rendered next to the form input.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::Empty => EMPTY_ITEM_ERROR,
            Self::Duplicate => DUPLICATE_ITEM_ERROR,
        }
    }
}

// =============================================================================
// Value Objects
// =============================================================================

/// Store-assigned identifier of an item.
///
/// Identifiers grow monotonically, so ordering by id is ordering by creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(i64);

impl ItemId {
    #[must_use]
    pub const fn from_raw(value: i64) -> Self {
        Self(value)
    }

    #[must_use]
    pub const fn as_i64(self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for ItemId {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// Trimmed, non-empty item text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemText(String);

impl ItemText {
    /// Trims `value` and rejects it when nothing is left.
    ///
    /// # Errors
    ///
    /// Returns [`ItemValidationError::Empty`] for blank input.
    pub fn parse(value: &str) -> Result<Self, ItemValidationError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ItemValidationError::Empty);
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Wraps text that was validated before it was stored.
    #[must_use]
    pub fn from_stored(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }
}

impl std::fmt::Display for ItemText {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(&self.0)
    }
}

// =============================================================================
// Item
// =============================================================================

/// A single entry on a to-do list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub list_id: ListId,
    pub text: ItemText,
}

impl Item {
    #[must_use]
    pub const fn new(id: ItemId, list_id: ListId, text: ItemText) -> Self {
        Self { id, list_id, text }
    }
}
