//! Log-only mailer for development without a mail relay.
//!
//! Renders the message and writes it to the log instead of sending it.

use super::template::render_reminder_email;
use crate::domain::{DomainError, EventSummary};
use crate::ports::NotificationSender;
use tracing::info;

/// Development sender. Always succeeds.
#[derive(Debug, Default)]
pub struct LogMailer;

impl LogMailer {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait::async_trait]
impl NotificationSender for LogMailer {
    async fn send(
        &self,
        address: &str,
        display_name: &str,
        summary: &EventSummary,
    ) -> Result<(), DomainError> {
        let email = render_reminder_email(display_name, summary);
        info!(
            to = address,
            subject = %email.subject,
            html_len = email.html.len(),
            "[LOG MAILER] reminder email not sent (no relay configured)"
        );
        Ok(())
    }
}
