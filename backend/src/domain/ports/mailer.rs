//! Port for outbound transactional mail.

use async_trait::async_trait;
use tracing::info;

use crate::domain::Email;

use super::define_port_error;

define_port_error! {
    /// Failures raised by mail adapters.
    pub enum MailerError {
        /// The mail service could not be reached or timed out.
        Transport { message: String } => "mail service unreachable: {message}" as unavailable,
        /// The mail service refused the message.
        Rejected { status: u16, message: String } => "mail service rejected message ({status}): {message}" as internal,
    }
}

/// Plain-text message to one recipient.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailMessage {
    /// Recipient.
    pub to: Email,
    /// Subject line.
    pub subject: String,
    /// Plain-text body.
    pub text: String,
}

/// Sends transactional mail.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Deliver `message`.
    async fn send(&self, message: &MailMessage) -> Result<(), MailerError>;
}

/// Mailer used when no mail service is configured; logs and succeeds.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingMailer;

#[async_trait]
impl Mailer for LoggingMailer {
    async fn send(&self, message: &MailMessage) -> Result<(), MailerError> {
        info!(to = %message.to, subject = %message.subject, "mail delivery skipped; no mail service configured");
        Ok(())
    }
}
