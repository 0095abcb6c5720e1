//! Shared helpers for the HTTP-level tests.
//!
//! Every test drives a fresh router backed by the in-memory database and a
//! recording mailer, calling it in-process with `oneshot`.
//!
//! # Note
//!
//! Each file under `tests/` is its own crate, so helpers used by only some of
//! them would otherwise warn as dead code.

#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::header::{CONTENT_TYPE, COOKIE, LOCATION, SET_COOKIE};
use axum::http::{Method, Request, Response, StatusCode};
use chrono::Duration;
use http_body_util::BodyExt;
use tower::ServiceExt;

use superlists::api::{AppState, Templates, create_router};
use superlists::application::AccountSettings;
use superlists::domain::{Email, User};
use superlists::infrastructure::{InMemoryDatabase, OutboxMailer, Repositories, UserRepository};

pub const SITE_URL: &str = "http://testserver";

// =============================================================================
// Application
// =============================================================================

pub struct TestApp {
    pub router: Router,
    pub database: InMemoryDatabase,
    pub outbox: OutboxMailer,
}

pub fn account_settings() -> AccountSettings {
    AccountSettings {
        site_url: SITE_URL.to_string(),
        email_from: "noreply@superlists".to_string(),
        token_ttl: Duration::minutes(60),
        session_max_age: Duration::hours(336),
    }
}

pub fn create_test_app() -> TestApp {
    create_test_app_with_mailer(OutboxMailer::new())
}

pub fn create_test_app_with_mailer(outbox: OutboxMailer) -> TestApp {
    let database = InMemoryDatabase::new();
    let state = AppState::new(
        Repositories::in_memory(&database),
        Arc::new(outbox.clone()),
        Templates::new().unwrap(),
        account_settings(),
    );

    TestApp {
        router: create_router(state),
        database,
        outbox,
    }
}

// =============================================================================
// Requests
// =============================================================================

impl TestApp {
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        form: Option<&str>,
        cookie: Option<&str>,
    ) -> Response<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(COOKIE, cookie);
        }
        let body = match form {
            Some(form) => {
                builder = builder.header(CONTENT_TYPE, "application/x-www-form-urlencoded");
                Body::from(form.to_string())
            }
            None => Body::empty(),
        };

        self.router
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap()
    }

    pub async fn get(&self, uri: &str, cookie: Option<&str>) -> Response<Body> {
        self.request(Method::GET, uri, None, cookie).await
    }

    pub async fn post_form(&self, uri: &str, form: &str, cookie: Option<&str>) -> Response<Body> {
        self.request(Method::POST, uri, Some(form), cookie).await
    }

    /// GETs `uri` and returns the page body, asserting a 200.
    pub async fn page(&self, uri: &str, cookie: Option<&str>) -> String {
        let response = self.get(uri, cookie).await;
        assert_eq!(response.status(), StatusCode::OK, "GET {uri}");
        body_text(response).await
    }

    /// Starts a list with `first_item` and returns its URL.
    pub async fn create_list(&self, first_item: &str, cookie: Option<&str>) -> String {
        let response = self
            .post_form("/lists/new", &form(&[("text", first_item)]), cookie)
            .await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        location(&response).unwrap()
    }

    pub async fn add_item(&self, list_url: &str, text: &str) -> Response<Body> {
        self.post_form(list_url, &form(&[("text", text)]), None)
            .await
    }

    pub async fn register_user(&self, email: &str) -> User {
        self.database
            .user_repository()
            .get_or_create(&Email::parse(email).unwrap())
            .await
            .unwrap()
    }

    /// Runs the full email login flow and returns the session cookie.
    pub async fn log_in(&self, email: &str) -> String {
        let response = self
            .post_form(
                "/accounts/send_login_email",
                &form(&[("email", email)]),
                None,
            )
            .await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);

        let token = self.last_login_token().await.unwrap();
        let response = self
            .get(&format!("/accounts/login?token={token}"), None)
            .await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        session_cookie(&response).unwrap()
    }

    /// Token from the most recently mailed login link.
    pub async fn last_login_token(&self) -> Option<String> {
        let message = self.outbox.last_message().await?;
        login_token_from_body(&message.body)
    }
}

// =============================================================================
// Responses
// =============================================================================

pub async fn body_text(response: Response<Body>) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub fn location(response: &Response<Body>) -> Option<String> {
    response
        .headers()
        .get(LOCATION)
        .and_then(|value| value.to_str().ok())
        .map(ToString::to_string)
}

/// `name=value` part of the `Set-Cookie` header, usable as a `Cookie` header.
pub fn session_cookie(response: &Response<Body>) -> Option<String> {
    response
        .headers()
        .get(SET_COOKIE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(';').next())
        .map(ToString::to_string)
}

pub fn login_token_from_body(body: &str) -> Option<String> {
    let (_, rest) = body.split_once("token=")?;
    rest.split_whitespace().next().map(ToString::to_string)
}

/// `application/x-www-form-urlencoded` body from field pairs.
pub fn form(fields: &[(&str, &str)]) -> String {
    serde_urlencoded::to_string(fields).unwrap()
}
