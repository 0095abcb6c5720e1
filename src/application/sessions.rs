//! Session lifetime.
//!
//! Sessions expire a fixed time after they were created. Expired sessions are
//! ignored when looked up, and swept from the store whenever a new session is
//! opened.

use super::accounts::AccountSettings;
use super::error::ApplicationError;
use crate::domain::{Email, Session, SessionKey, Timestamp};
use crate::infrastructure::SessionRepository;

/// Finds a live session. An expired one is deleted and reported as absent.
///
/// # Errors
///
/// `ApplicationError::Repository` on storage failure.
pub async fn load_session(
    sessions: &dyn SessionRepository,
    settings: &AccountSettings,
    key: &SessionKey,
) -> Result<Option<Session>, ApplicationError> {
    let Some(session) = sessions.find(key).await? else {
        return Ok(None);
    };

    if session.is_expired(&Timestamp::now(), settings.session_max_age) {
        sessions.delete(key).await?;
        tracing::debug!(created_at = %session.created_at, "Expired session discarded");
        return Ok(None);
    }
    Ok(Some(session))
}

/// Builds a fresh session under a new key, after sweeping expired ones.
///
/// The session is not stored; callers save it once it carries something.
///
/// # Errors
///
/// `ApplicationError::Repository` if the sweep fails.
pub async fn open_session(
    sessions: &dyn SessionRepository,
    settings: &AccountSettings,
    user: Option<Email>,
) -> Result<Session, ApplicationError> {
    let now = Timestamp::now();
    let cutoff = Timestamp::from_datetime(*now.as_datetime() - settings.session_max_age);
    let removed = sessions.delete_created_before(&cutoff).await?;
    if removed > 0 {
        tracing::info!(removed, "Expired sessions removed");
    }

    let key = SessionKey::generate();
    Ok(match user {
        Some(email) => Session::authenticated(key, email, now),
        None => Session::anonymous(key, now),
    })
}
