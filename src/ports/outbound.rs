//! Outbound ports. Application calls into infrastructure.
//!
//! Implemented by adapters.

use crate::domain::{
    DomainError, Event, EventId, FailureRecord, NewEventRecord, SentRecord, User, UserId,
};
use chrono::{DateTime, Utc};

/// Event store. Events own their reminders; the store persists both together.
#[async_trait::async_trait]
pub trait EventStore: Send + Sync {
    /// Events having at least one reminder with `time <= now` and `sent == false`.
    ///
    /// Implementations must select through an index on (reminder time, sent) rather than
    /// loading every reminder. Returned events carry all their reminders.
    async fn find_due_unsent(&self, now: DateTime<Utc>) -> Result<Vec<Event>, DomainError>;

    /// Current state of one event. `None` if it no longer exists.
    async fn find_event(&self, id: EventId) -> Result<Option<Event>, DomainError>;

    /// Persist the event and its reminders. Touches only this event.
    async fn save_event(&self, event: &Event) -> Result<(), DomainError>;

    /// Insert a new event; the store assigns id and timestamps.
    async fn insert_event(&self, record: NewEventRecord) -> Result<Event, DomainError>;

    /// All events owned by a user, in no particular order.
    async fn list_events_for_user(&self, user_id: UserId) -> Result<Vec<Event>, DomainError>;

    /// Remove an event and its reminders. Returns false if it did not exist.
    async fn delete_event(&self, id: EventId) -> Result<bool, DomainError>;
}

/// User directory. Read-only lookup of contact details.
#[async_trait::async_trait]
pub trait UserDirectory: Send + Sync {
    async fn find_user_by_id(&self, id: UserId) -> Result<Option<User>, DomainError>;
}

/// Receives one record per dispatched or failed reminder.
///
/// Calls are synchronous and must not fail; implementations log, count, or buffer.
pub trait DispatchObserver: Send + Sync {
    fn on_sent(&self, record: &SentRecord);

    fn on_failure(&self, record: &FailureRecord);
}
