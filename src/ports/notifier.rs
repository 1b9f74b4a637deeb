//! Notification outbound port. Deliver a reminder to a user (e.g. by email).

use crate::domain::{DomainError, EventSummary};

/// Port for delivering one reminder notification.
///
/// Treated as a black box: any retrying or queueing is the transport's business.
/// The dispatcher calls it at most once per due reminder per pass.
#[async_trait::async_trait]
pub trait NotificationSender: Send + Sync {
    /// Send a reminder for `summary` to `address`.
    ///
    /// # Arguments
    /// * `address` - Recipient address (email)
    /// * `display_name` - Name used in the greeting
    /// * `summary` - Event name, formatted date, category and description
    ///
    /// # Errors
    /// Returns `DomainError::Notification` if delivery was not accepted.
    async fn send(
        &self,
        address: &str,
        display_name: &str,
        summary: &EventSummary,
    ) -> Result<(), DomainError>;
}
