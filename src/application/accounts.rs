//! Passwordless login: emailed single-use links.

use chrono::Duration;

use super::error::ApplicationError;
use crate::domain::{Email, LoginToken, Timestamp, TokenId, User};
use crate::infrastructure::{AppConfig, EmailMessage, Mailer, TokenRepository, UserRepository};

pub const LOGIN_EMAIL_SUBJECT: &str = "Your login link for Superlists";

pub const CHECK_EMAIL_MESSAGE: &str =
    "Check your email, we've sent you a link you can use to log in.";

pub const INVALID_EMAIL_MESSAGE: &str = "Please enter a valid email address.";

pub const EMAIL_FAILED_MESSAGE: &str =
    "Sorry, we could not send your login email. Please try again.";

/// Settings that shape login emails and token expiry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountSettings {
    /// Absolute base URL, without trailing slash.
    pub site_url: String,
    pub email_from: String,
    pub token_ttl: Duration,
    /// Sessions older than this are discarded.
    pub session_max_age: Duration,
}

impl AccountSettings {
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            site_url: config.site_url.clone(),
            email_from: config.email_from.clone(),
            token_ttl: Duration::minutes(config.login_token_ttl_minutes),
            session_max_age: Duration::hours(config.session_max_age_hours),
        }
    }

    /// Absolute URL that redeems `token`.
    #[must_use]
    pub fn login_url(&self, token: &LoginToken) -> String {
        format!("{}{}", self.site_url.trim_end_matches('/'), token.login_path())
    }

    #[must_use]
    pub fn login_email(&self, token: &LoginToken) -> EmailMessage {
        EmailMessage {
            from: self.email_from.clone(),
            to: token.email.clone(),
            subject: LOGIN_EMAIL_SUBJECT.to_string(),
            body: format!("Use this link to log in:\n\n{}", self.login_url(token)),
        }
    }
}

/// Issues a login token for `email` and mails the link.
///
/// # Errors
///
/// `ApplicationError::InvalidEmail` for a malformed address (nothing is
/// stored), `ApplicationError::Repository` or `ApplicationError::Mailer` when
/// storing or sending fails. A token whose email could not be sent is
/// withdrawn again.
pub async fn send_login_email(
    tokens: &dyn TokenRepository,
    mailer: &dyn Mailer,
    settings: &AccountSettings,
    email: &str,
) -> Result<LoginToken, ApplicationError> {
    let email = Email::parse(email)?;
    let token = LoginToken::new(TokenId::generate(), email, Timestamp::now());
    tokens.save(&token).await?;

    if let Err(error) = mailer.send(settings.login_email(&token)).await {
        tokens.take(&token.uid).await?;
        return Err(error.into());
    }
    tracing::info!(email = %token.email, "Login email sent");

    Ok(token)
}

/// Redeems a login token.
///
/// The token is consumed whether or not it is still fresh. Returns the user,
/// registering them on first login, or `None` for unknown and expired tokens.
///
/// # Errors
///
/// `ApplicationError::Repository` on storage failure.
pub async fn authenticate(
    tokens: &dyn TokenRepository,
    users: &dyn UserRepository,
    settings: &AccountSettings,
    uid: &TokenId,
) -> Result<Option<User>, ApplicationError> {
    let Some(token) = tokens.take(uid).await? else {
        tracing::debug!(%uid, "Unknown login token");
        return Ok(None);
    };

    if token.is_expired(&Timestamp::now(), settings.token_ttl) {
        tracing::debug!(%uid, created_at = %token.created_at, "Expired login token");
        return Ok(None);
    }

    let user = users.get_or_create(&token.email).await?;
    Ok(Some(user))
}
