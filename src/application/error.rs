//! Errors raised by application workflows.

use thiserror::Error;

use crate::domain::{EmailError, ItemValidationError};
use crate::infrastructure::{MailerError, RepositoryError};

#[derive(Debug, Error)]
pub enum ApplicationError {
    /// Submitted item text was rejected; the form is shown again.
    #[error(transparent)]
    Validation(#[from] ItemValidationError),

    #[error(transparent)]
    InvalidEmail(#[from] EmailError),

    #[error("{entity} not found: {identifier}")]
    NotFound {
        entity: &'static str,
        identifier: String,
    },

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error(transparent)]
    Mailer(#[from] MailerError),
}

impl ApplicationError {
    pub(crate) fn not_found(entity: &'static str, identifier: impl ToString) -> Self {
        Self::NotFound {
            entity,
            identifier: identifier.to_string(),
        }
    }
}
