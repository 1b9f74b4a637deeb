//! Mail relay adapter. Implements NotificationSender by posting a JSON message to an HTTP mail API.

use super::template::render_reminder_email;
use crate::domain::{DomainError, EventSummary};
use crate::ports::NotificationSender;
use reqwest::Client;
use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

/// JSON body accepted by the relay.
#[derive(Debug, Serialize)]
struct OutgoingMail<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    html: &'a str,
}

/// HTTP mail relay adapter.
///
/// Posts `{from, to, subject, html}` to `api_url` with a bearer token.
/// Any non-2xx status is a failed send; the relay owns retries.
pub struct HttpMailer {
    client: Arc<Client>,
    api_url: String,
    api_key: String,
    from: String,
}

impl HttpMailer {
    /// Create a new mail relay adapter.
    ///
    /// # Arguments
    /// * `api_url` - Relay endpoint that accepts the JSON message
    /// * `api_key` - Bearer token (may be empty for an unauthenticated local relay)
    /// * `from` - Sender address
    pub fn new(api_url: String, api_key: String, from: String) -> Self {
        Self {
            client: Arc::new(Client::new()),
            api_url,
            api_key,
            from,
        }
    }
}

#[async_trait::async_trait]
impl NotificationSender for HttpMailer {
    async fn send(
        &self,
        address: &str,
        display_name: &str,
        summary: &EventSummary,
    ) -> Result<(), DomainError> {
        let email = render_reminder_email(display_name, summary);
        let body = OutgoingMail {
            from: &self.from,
            to: address,
            subject: &email.subject,
            html: &email.html,
        };

        let mut req = self.client.post(&self.api_url).json(&body);
        if !self.api_key.is_empty() {
            req = req.bearer_auth(&self.api_key);
        }

        let res = req
            .send()
            .await
            .map_err(|e| DomainError::Notification(format!("Request failed: {}", e)))?;

        if !res.status().is_success() {
            let status = res.status();
            let text = res.text().await.unwrap_or_else(|_| "unknown".to_string());
            return Err(DomainError::Notification(format!(
                "Mail relay error {}: {}",
                status, text
            )));
        }

        debug!(to = address, subject = %email.subject, "reminder email accepted by relay");
        Ok(())
    }
}
