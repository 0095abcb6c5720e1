//! Passwordless login: send link, redeem token, log out.

use axum::Form;
use axum::extract::{Query, State};
use axum::http::header::SET_COOKIE;
use axum::response::{IntoResponse, Redirect, Response};

use crate::api::dto::{LoginEmailRequest, LoginQuery};
use crate::api::error::PageError;
use crate::api::session::{CurrentSession, expired_session_cookie, session_cookie};
use crate::api::state::AppState;
use crate::application::{
    self, ApplicationError, CHECK_EMAIL_MESSAGE, EMAIL_FAILED_MESSAGE, INVALID_EMAIL_MESSAGE,
};
use crate::domain::{MessageLevel, TokenId};

/// Mails a login link and flashes the result on the home page.
///
/// A visitor without a session gets an anonymous one to carry the message.
///
/// # Errors
///
/// Returns a `PageError` if the session cannot be stored.
pub async fn send_login_email(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    Form(request): Form<LoginEmailRequest>,
) -> Result<Response, PageError> {
    let (mut session, is_new) = match session {
        Some(session) => (session, false),
        None => (
            application::open_session(state.session_repository.as_ref(), &state.accounts, None)
                .await?,
            true,
        ),
    };

    let result = application::send_login_email(
        state.token_repository.as_ref(),
        state.mailer.as_ref(),
        &state.accounts,
        &request.email,
    )
    .await;

    match result {
        Ok(_) => session.push_message(MessageLevel::Success, CHECK_EMAIL_MESSAGE),
        Err(ApplicationError::InvalidEmail(error)) => {
            tracing::debug!(%error, "Login requested for malformed address");
            session.push_message(MessageLevel::Error, INVALID_EMAIL_MESSAGE);
        }
        Err(ApplicationError::Mailer(error)) => {
            tracing::warn!(%error, "Login email could not be sent");
            session.push_message(MessageLevel::Error, EMAIL_FAILED_MESSAGE);
        }
        Err(error) => return Err(error.into()),
    }

    state.session_repository.save(&session).await?;

    if is_new {
        let cookie = session_cookie(
            &session.key,
            state.accounts.session_max_age,
            state.secure_cookies,
        );
        return Ok(([(SET_COOKIE, cookie)], Redirect::to("/")).into_response());
    }
    Ok(Redirect::to("/").into_response())
}

/// Redeems a login token and starts an authenticated session.
///
/// Unknown and expired tokens leave the visitor as they were.
///
/// # Errors
///
/// Returns a `PageError` for storage failures.
pub async fn login(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    Query(query): Query<LoginQuery>,
) -> Result<Response, PageError> {
    let uid = TokenId::from_uuid(query.token);
    let user = application::authenticate(
        state.token_repository.as_ref(),
        state.user_repository.as_ref(),
        &state.accounts,
        &uid,
    )
    .await?;

    let Some(user) = user else {
        return Ok(Redirect::to("/").into_response());
    };

    if let Some(previous) = session {
        state.session_repository.delete(&previous.key).await?;
    }

    let session = application::open_session(
        state.session_repository.as_ref(),
        &state.accounts,
        Some(user.email),
    )
    .await?;
    state.session_repository.save(&session).await?;
    tracing::info!(email = ?session.user, "User logged in");

    let cookie = session_cookie(
        &session.key,
        state.accounts.session_max_age,
        state.secure_cookies,
    );
    Ok(([(SET_COOKIE, cookie)], Redirect::to("/")).into_response())
}

/// Ends the session and clears the cookie.
///
/// # Errors
///
/// Returns a `PageError` if the session cannot be deleted.
pub async fn logout(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
) -> Result<Response, PageError> {
    if let Some(session) = session {
        state.session_repository.delete(&session.key).await?;
        tracing::info!(email = ?session.user, "User logged out");
    }

    Ok(([(SET_COOKIE, expired_session_cookie())], Redirect::to("/")).into_response())
}
