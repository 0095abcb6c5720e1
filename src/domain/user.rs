//! Registered users.

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use serde::{Deserialize, Serialize};

use super::email::Email;

/// Characters left as-is in a path segment: RFC 3986 unreserved plus `@`.
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~')
    .remove(b'@');

/// A user, known only by email. Created on first successful login.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct User {
    pub email: Email,
}

impl User {
    #[must_use]
    pub const fn new(email: Email) -> Self {
        Self { email }
    }

    /// URL of the page listing this user's own and shared lists.
    ///
    /// The address is percent-encoded, so the result only contains URL-safe
    /// characters and can be emitted into HTML unescaped.
    #[must_use]
    pub fn my_lists_url(&self) -> String {
        let segment = utf8_percent_encode(self.email.as_str(), PATH_SEGMENT);
        format!("/lists/users/{segment}/")
    }
}
