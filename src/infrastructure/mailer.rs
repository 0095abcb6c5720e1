//! Outgoing email.
//!
//! The application only depends on the [`Mailer`] trait. [`LogMailer`] writes
//! messages to the log instead of delivering them; [`OutboxMailer`] keeps them
//! in memory so tests can read the login link back.

use std::sync::Arc;

use futures::future::BoxFuture;
use serde::Serialize;
use thiserror::Error;
use tokio::sync::RwLock;

use crate::domain::Email;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MailerError {
    #[error("Failed to deliver email to {recipient}: {reason}")]
    Delivery { recipient: String, reason: String },
}

/// A plain-text email.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmailMessage {
    pub from: String,
    pub to: Email,
    pub subject: String,
    pub body: String,
}

pub trait Mailer: Send + Sync {
    fn send(&self, message: EmailMessage) -> BoxFuture<'static, Result<(), MailerError>>;
}

// =============================================================================
// LogMailer
// =============================================================================

/// Emits each message as an `info` event and reports success.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogMailer;

impl Mailer for LogMailer {
    fn send(&self, message: EmailMessage) -> BoxFuture<'static, Result<(), MailerError>> {
        Box::pin(async move {
            tracing::info!(
                from = %message.from,
                to = %message.to,
                subject = %message.subject,
                body = %message.body,
                "Sending email"
            );
            Ok(())
        })
    }
}

// =============================================================================
// OutboxMailer
// =============================================================================

/// Records messages instead of sending them. Clones share one outbox.
#[derive(Debug, Clone, Default)]
pub struct OutboxMailer {
    outbox: Arc<RwLock<Vec<EmailMessage>>>,
    failure: Option<String>,
}

impl OutboxMailer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A mailer whose every delivery fails with `reason`.
    #[must_use]
    pub fn failing(reason: impl Into<String>) -> Self {
        Self {
            outbox: Arc::default(),
            failure: Some(reason.into()),
        }
    }

    pub async fn messages(&self) -> Vec<EmailMessage> {
        self.outbox.read().await.clone()
    }

    pub async fn last_message(&self) -> Option<EmailMessage> {
        self.outbox.read().await.last().cloned()
    }
}

impl Mailer for OutboxMailer {
    fn send(&self, message: EmailMessage) -> BoxFuture<'static, Result<(), MailerError>> {
        let outbox = Arc::clone(&self.outbox);
        let failure = self.failure.clone();
        Box::pin(async move {
            if let Some(reason) = failure {
                return Err(MailerError::Delivery {
                    recipient: message.to.to_string(),
                    reason,
                });
            }
            outbox.write().await.push(message);
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn message(to: &str) -> EmailMessage {
        EmailMessage {
            from: "noreply@superlists".to_string(),
            to: Email::parse(to).unwrap(),
            subject: "Hello".to_string(),
            body: "Body".to_string(),
        }
    }

    #[rstest]
    #[tokio::test]
    async fn test_outbox_records_messages_in_order() {
        let mailer = OutboxMailer::new();
        mailer.send(message("a@example.com")).await.unwrap();
        mailer.send(message("b@example.com")).await.unwrap();

        let recipients: Vec<String> = mailer
            .messages()
            .await
            .into_iter()
            .map(|sent| sent.to.to_string())
            .collect();

        assert_eq!(recipients, vec!["a@example.com", "b@example.com"]);
        assert_eq!(
            mailer.last_message().await.unwrap().to.as_str(),
            "b@example.com"
        );
    }

    #[rstest]
    #[tokio::test]
    async fn test_clones_share_the_outbox() {
        let mailer = OutboxMailer::new();
        let clone = mailer.clone();
        clone.send(message("a@example.com")).await.unwrap();

        assert_eq!(mailer.messages().await.len(), 1);
    }

    #[rstest]
    #[tokio::test]
    async fn test_failing_mailer_reports_delivery_error() {
        let mailer = OutboxMailer::failing("smtp down");

        let result = mailer.send(message("a@example.com")).await;

        assert_eq!(
            result,
            Err(MailerError::Delivery {
                recipient: "a@example.com".to_string(),
                reason: "smtp down".to_string(),
            })
        );
        assert!(mailer.messages().await.is_empty());
    }

    #[rstest]
    #[tokio::test]
    async fn test_log_mailer_always_succeeds() {
        assert!(LogMailer.send(message("a@example.com")).await.is_ok());
    }
}
