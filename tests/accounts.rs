//! Passwordless login: `/accounts/send_login_email`, `/accounts/login`,
//! `/accounts/logout`.

mod common;

use axum::http::StatusCode;
use axum::http::header::SET_COOKIE;
use chrono::{Duration, Utc};
use rstest::rstest;

use common::{
    SITE_URL, create_test_app, create_test_app_with_mailer, location, session_cookie,
};
use superlists::application::LOGIN_EMAIL_SUBJECT;
use superlists::domain::{Email, LoginToken, Session, SessionKey, Timestamp, TokenId};
use superlists::infrastructure::{
    OutboxMailer, SessionRepository, TokenRepository, UserRepository,
};

// =============================================================================
// POST /accounts/send_login_email
// =============================================================================

#[rstest]
#[tokio::test]
async fn test_sends_login_link_to_address_from_post() {
    let app = create_test_app();

    let response = app
        .post_form("/accounts/send_login_email", "email=edith%40example.com", None)
        .await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), Some("/".to_string()));

    let message = app.outbox.last_message().await.unwrap();
    assert_eq!(message.to, Email::parse("edith@example.com").unwrap());
    assert_eq!(message.subject, LOGIN_EMAIL_SUBJECT);
    assert!(message.from.contains("superlists"));

    let token = app.last_login_token().await.unwrap();
    assert!(
        message
            .body
            .contains(&format!("{SITE_URL}/accounts/login?token={token}"))
    );
}

#[rstest]
#[tokio::test]
async fn test_success_message_is_flashed_once() {
    let app = create_test_app();

    let response = app
        .post_form("/accounts/send_login_email", "email=edith%40example.com", None)
        .await;
    let cookie = session_cookie(&response).unwrap();

    let first = app.page("/", Some(&cookie)).await;
    assert!(first.contains("Check your email"));
    assert!(first.contains("alert-success"));

    let second = app.page("/", Some(&cookie)).await;
    assert!(!second.contains("Check your email"));
}

#[rstest]
#[tokio::test]
async fn test_existing_session_is_reused_for_flash() {
    let app = create_test_app();
    let response = app
        .post_form("/accounts/send_login_email", "email=a%40example.com", None)
        .await;
    let cookie = session_cookie(&response).unwrap();

    let response = app
        .post_form(
            "/accounts/send_login_email",
            "email=b%40example.com",
            Some(&cookie),
        )
        .await;

    assert!(response.headers().get(SET_COOKIE).is_none());
    assert_eq!(app.database.session_count().await, 1);
}

#[rstest]
#[case::malformed("email=not-an-email")]
#[case::blank("email=")]
#[tokio::test]
async fn test_invalid_address_flashes_error_and_sends_nothing(#[case] form: &str) {
    let app = create_test_app();

    let response = app.post_form("/accounts/send_login_email", form, None).await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert!(app.outbox.messages().await.is_empty());

    let cookie = session_cookie(&response).unwrap();
    let html = app.page("/", Some(&cookie)).await;
    assert!(html.contains("alert-danger"));
    assert!(html.contains("Please enter a valid email address."));
}

#[rstest]
#[tokio::test]
async fn test_mailer_failure_flashes_error() {
    let app = create_test_app_with_mailer(OutboxMailer::failing("smtp unavailable"));

    let response = app
        .post_form("/accounts/send_login_email", "email=edith%40example.com", None)
        .await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let cookie = session_cookie(&response).unwrap();
    let html = app.page("/", Some(&cookie)).await;
    assert!(html.contains("Sorry, we could not send your login email"));
    assert!(!html.contains("smtp unavailable"));
    assert_eq!(app.database.token_count().await, 0);
}

// =============================================================================
// GET /accounts/login
// =============================================================================

#[rstest]
#[tokio::test]
async fn test_login_with_valid_token_starts_session() {
    let app = create_test_app();

    let cookie = app.log_in("edith@example.com").await;

    let html = app.page("/", Some(&cookie)).await;
    assert!(html.contains("Logged in as edith@example.com"));
    assert!(html.contains("Log out"));
    assert!(!html.contains(r#"name="email""#));

    let user = app
        .database
        .user_repository()
        .find_by_email(&Email::parse("edith@example.com").unwrap())
        .await
        .unwrap();
    assert!(user.is_some());
}

#[rstest]
#[tokio::test]
async fn test_login_token_works_only_once() {
    let app = create_test_app();
    app.log_in("edith@example.com").await;
    let token = app.last_login_token().await.unwrap();

    let response = app
        .get(&format!("/accounts/login?token={token}"), None)
        .await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), Some("/".to_string()));
    assert!(response.headers().get(SET_COOKIE).is_none());
}

#[rstest]
#[tokio::test]
async fn test_unknown_token_leaves_visitor_logged_out() {
    let app = create_test_app();

    let response = app
        .get(
            &format!("/accounts/login?token={}", TokenId::generate()),
            None,
        )
        .await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert!(response.headers().get(SET_COOKIE).is_none());
    assert_eq!(app.database.user_count().await, 0);
}

#[rstest]
#[tokio::test]
async fn test_expired_token_does_not_log_in() {
    let app = create_test_app();
    let token = LoginToken::new(
        TokenId::generate(),
        Email::parse("edith@example.com").unwrap(),
        Timestamp::from_datetime(Utc::now() - Duration::hours(2)),
    );
    app.database.token_repository().save(&token).await.unwrap();

    let response = app
        .get(&format!("/accounts/login?token={}", token.uid), None)
        .await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert!(response.headers().get(SET_COOKIE).is_none());
    assert_eq!(app.database.user_count().await, 0);
}

#[rstest]
#[case::missing("/accounts/login")]
#[case::malformed("/accounts/login?token=abc123")]
#[tokio::test]
async fn test_bad_token_parameter_is_rejected(#[case] uri: &str) {
    let app = create_test_app();

    let response = app.get(uri, None).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[rstest]
#[tokio::test]
async fn test_login_replaces_previous_session() {
    let app = create_test_app();
    let response = app
        .post_form("/accounts/send_login_email", "email=edith%40example.com", None)
        .await;
    let anonymous = session_cookie(&response).unwrap();
    let token = app.last_login_token().await.unwrap();

    let response = app
        .get(&format!("/accounts/login?token={token}"), Some(&anonymous))
        .await;
    let authenticated = session_cookie(&response).unwrap();

    assert_ne!(anonymous, authenticated);
    assert_eq!(app.database.session_count().await, 1);
    let set_cookie = response.headers().get(SET_COOKIE).unwrap().to_str().unwrap();
    assert!(set_cookie.contains("Max-Age=1209600"));

    let html = app.page("/", Some(&anonymous)).await;
    assert!(!html.contains("Logged in as"));
}

#[rstest]
#[tokio::test]
async fn test_expired_session_is_treated_as_logged_out() {
    let app = create_test_app();
    let session = Session::authenticated(
        SessionKey::generate(),
        Email::parse("edith@example.com").unwrap(),
        Timestamp::from_datetime(Utc::now() - Duration::days(15)),
    );
    app.database.session_repository().save(&session).await.unwrap();

    let html = app
        .page("/", Some(&format!("sessionid={}", session.key)))
        .await;

    assert!(!html.contains("Logged in as"));
    assert!(html.contains(r#"name="email""#));
    assert_eq!(app.database.session_count().await, 0);
}

#[rstest]
#[tokio::test]
async fn test_login_sweeps_expired_sessions() {
    let app = create_test_app();
    let stale = Session::anonymous(
        SessionKey::generate(),
        Timestamp::from_datetime(Utc::now() - Duration::days(30)),
    );
    app.database.session_repository().save(&stale).await.unwrap();

    app.log_in("edith@example.com").await;

    assert!(
        app.database
            .session_repository()
            .find(&stale.key)
            .await
            .unwrap()
            .is_none()
    );
}

// =============================================================================
// /accounts/logout
// =============================================================================

#[rstest]
#[case::get(false)]
#[case::post(true)]
#[tokio::test]
async fn test_logout_ends_session(#[case] use_post: bool) {
    let app = create_test_app();
    let cookie = app.log_in("edith@example.com").await;
    let sessions = app.database.session_count().await;

    let response = if use_post {
        app.post_form("/accounts/logout", "", Some(&cookie)).await
    } else {
        app.get("/accounts/logout", Some(&cookie)).await
    };

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), Some("/".to_string()));
    let set_cookie = response
        .headers()
        .get(SET_COOKIE)
        .unwrap()
        .to_str()
        .unwrap();
    assert!(set_cookie.contains("Max-Age=0"));
    assert_eq!(app.database.session_count().await, sessions - 1);

    let html = app.page("/", Some(&cookie)).await;
    assert!(!html.contains("Logged in as"));
    assert!(html.contains(r#"name="email""#));
}

#[rstest]
#[tokio::test]
async fn test_logout_without_session_still_redirects() {
    let app = create_test_app();

    let response = app.get("/accounts/logout", None).await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
}
