//! Core domain layer. No external I/O dependencies.
//!
//! Entities and business rules live here. Dependencies flow inward.

pub mod dispatch;
pub mod entities;
pub mod errors;

pub use dispatch::{FailureRecord, PassOutcome, PassReport, SentRecord};
pub use entities::{
    Category, Event, EventId, EventSummary, NewEventRecord, Reminder, ReminderInput, User, UserId,
    NO_DESCRIPTION,
};
pub use errors::{DomainError, FailureKind};
