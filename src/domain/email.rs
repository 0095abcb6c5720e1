//! Email address value object.
//!
//! Users are identified by their email address alone, so every lookup key in
//! the system goes through [`Email::parse`] first.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Reasons a string is rejected as an email address.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EmailError {
    /// Nothing but whitespace was supplied.
    #[error("Email address is empty")]
    Empty,

    /// The value does not have the `local@domain` shape.
    #[error("Invalid email address: {0}")]
    Invalid(String),
}

/// A syntactically valid, trimmed email address.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Email(String);

impl Email {
    /// Parses user input into an `Email`.
    ///
    /// Surrounding whitespace is removed. The remainder must contain exactly
    /// one `@` with a non-empty part on each side and no inner whitespace.
    ///
    /// # Errors
    ///
    /// Returns [`EmailError::Empty`] for blank input and
    /// [`EmailError::Invalid`] for anything else that is not an address.
    pub fn parse(value: &str) -> Result<Self, EmailError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(EmailError::Empty);
        }

        let Some((local, domain)) = trimmed.split_once('@') else {
            return Err(EmailError::Invalid(trimmed.to_string()));
        };

        if local.is_empty()
            || domain.is_empty()
            || domain.contains('@')
            || trimmed.chars().any(char::is_whitespace)
        {
            return Err(EmailError::Invalid(trimmed.to_string()));
        }

        Ok(Self(trimmed.to_string()))
    }

    /// Wraps a value that was validated before it was stored.
    #[must_use]
    pub fn from_stored(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Email {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(&self.0)
    }
}

impl std::str::FromStr for Email {
    type Err = EmailError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::parse(value)
    }
}
