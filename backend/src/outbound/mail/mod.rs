//! Reqwest-backed mailer for a JSON mail API (`POST {base}/emails`).

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Serialize;
use zeroize::Zeroizing;

use crate::domain::ports::{MailMessage, Mailer, MailerError};
use crate::outbound::http_preview::status_message;

#[derive(Debug, Serialize)]
struct SendEmailBody<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: &'a str,
    text: &'a str,
}

/// Mailer adapter delivering through one HTTP mail service.
pub struct HttpMailer {
    client: Client,
    endpoint: Url,
    api_key: Zeroizing<String>,
    sender: String,
}

impl HttpMailer {
    /// Build a mailer with an explicit request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the base URL cannot be joined or the reqwest
    /// client cannot be constructed.
    pub fn new(
        base_url: &Url,
        api_key: Zeroizing<String>,
        sender: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, MailerError> {
        let endpoint = base_url
            .join("emails")
            .map_err(|err| MailerError::transport(format!("invalid base url: {err}")))?;
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| MailerError::transport(err.to_string()))?;
        Ok(Self {
            client,
            endpoint,
            api_key,
            sender: sender.into(),
        })
    }
}

#[async_trait]
impl Mailer for HttpMailer {
    async fn send(&self, message: &MailMessage) -> Result<(), MailerError> {
        let body = SendEmailBody {
            from: &self.sender,
            to: [message.to.as_ref()],
            subject: &message.subject,
            text: &message.text,
        };
        let response = self
            .client
            .post(self.endpoint.clone())
            .bearer_auth(self.api_key.as_str())
            .json(&body)
            .send()
            .await
            .map_err(|err| MailerError::transport(err.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let bytes = response.bytes().await.unwrap_or_default();
        let message = status_message(status, bytes.as_ref());
        if status.is_server_error() {
            Err(MailerError::transport(message))
        } else {
            Err(MailerError::rejected(status.as_u16(), message))
        }
    }
}
