//! Application use cases. Orchestrate domain logic via ports.

pub mod event_service;
pub mod reminder_dispatcher;
pub mod reminder_scanner;
pub mod reminder_scheduler;

#[cfg(test)]
pub(crate) mod test_support;

pub use event_service::{EventQuery, EventService, EventSort, NewEvent};
pub use reminder_dispatcher::ReminderDispatcher;
pub use reminder_scanner::{DueReminder, ReminderScanner, ScanSnapshot};
pub use reminder_scheduler::ReminderScheduler;
