//! Cookie-backed sessions.
//!
//! The `sessionid` cookie holds an opaque key; everything else lives in the
//! session repository.

use axum::extract::FromRequestParts;
use axum::http::HeaderMap;
use axum::http::header::COOKIE;
use axum::http::request::Parts;
use chrono::Duration;

use super::dto::PageContext;
use super::error::PageError;
use super::state::AppState;
use crate::application;
use crate::domain::{Email, Session, SessionKey, User};

pub const SESSION_COOKIE_NAME: &str = "sessionid";

// =============================================================================
// Extractor
// =============================================================================

/// The stored session named by the request cookie, if any.
///
/// A cookie naming an unknown, deleted or expired session yields `None`.
#[derive(Debug, Clone, Default)]
pub struct CurrentSession(pub Option<Session>);

impl CurrentSession {
    #[must_use]
    pub fn user(&self) -> Option<&Email> {
        self.0.as_ref().and_then(|session| session.user.as_ref())
    }
}

impl FromRequestParts<AppState> for CurrentSession {
    type Rejection = PageError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(key) = session_key_from_headers(&parts.headers) else {
            return Ok(Self(None));
        };
        let session = application::load_session(
            state.session_repository.as_ref(),
            &state.accounts,
            &key,
        )
        .await?;
        Ok(Self(session))
    }
}

// =============================================================================
// Cookies
// =============================================================================

/// Reads the session key out of the `Cookie` headers.
#[must_use]
pub fn session_key_from_headers(headers: &HeaderMap) -> Option<SessionKey> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| *name == SESSION_COOKIE_NAME && !value.is_empty())
        .map(|(_, value)| SessionKey::new(value))
}

/// `Set-Cookie` value that stores `key` for `max_age`.
#[must_use]
pub fn session_cookie(key: &SessionKey, max_age: Duration, secure: bool) -> String {
    let max_age = max_age.num_seconds();
    let secure = if secure { "; Secure" } else { "" };
    format!(
        "{SESSION_COOKIE_NAME}={key}; HttpOnly; Path=/; SameSite=Lax; Max-Age={max_age}{secure}"
    )
}

/// `Set-Cookie` value that removes the session cookie.
#[must_use]
pub fn expired_session_cookie() -> String {
    format!("{SESSION_COOKIE_NAME}=; HttpOnly; Path=/; SameSite=Lax; Max-Age=0")
}

// =============================================================================
// Page header
// =============================================================================

/// Builds the header context and consumes the session's flash messages.
///
/// # Errors
///
/// Returns a `PageError` if the drained session cannot be written back.
pub async fn page_context(
    state: &AppState,
    session: Option<Session>,
) -> Result<PageContext, PageError> {
    let Some(mut session) = session else {
        return Ok(PageContext::default());
    };

    let messages = session.take_messages();
    if !messages.is_empty() {
        state.session_repository.save(&session).await?;
    }

    let my_lists_url = session
        .user
        .as_ref()
        .map(|email| User::new(email.clone()).my_lists_url());

    Ok(PageContext {
        user: session.user,
        my_lists_url,
        messages,
    })
}
