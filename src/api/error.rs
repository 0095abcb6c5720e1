//! Error responses for page handlers.
//!
//! Pages answer failures with a status code and a short plain-text body.
//! Internal details are logged, never sent to the client.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::application::ApplicationError;
use crate::infrastructure::RepositoryError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageError {
    pub status: StatusCode,
    pub message: String,
}

impl PageError {
    #[must_use]
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    #[must_use]
    pub fn internal_error() -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
    }
}

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        (self.status, self.message).into_response()
    }
}

impl From<RepositoryError> for PageError {
    fn from(error: RepositoryError) -> Self {
        match error {
            RepositoryError::NotFound(what) => Self::not_found(format!("Not found: {what}")),
            other => {
                tracing::error!(error = %other, "Storage failure");
                Self::internal_error()
            }
        }
    }
}

impl From<ApplicationError> for PageError {
    fn from(error: ApplicationError) -> Self {
        match error {
            ApplicationError::NotFound { entity, .. } => Self::not_found(format!("No such {entity}")),
            ApplicationError::Validation(validation) => Self::bad_request(validation.message()),
            ApplicationError::InvalidEmail(email) => Self::bad_request(email.to_string()),
            ApplicationError::Repository(repository) => repository.into(),
            ApplicationError::Mailer(mailer) => {
                tracing::error!(error = %mailer, "Mail delivery failure");
                Self::internal_error()
            }
        }
    }
}

impl From<minijinja::Error> for PageError {
    fn from(error: minijinja::Error) -> Self {
        tracing::error!(error = %error, "Template rendering failed");
        Self::internal_error()
    }
}
