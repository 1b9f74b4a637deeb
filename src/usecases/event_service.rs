//! Event management. Create, list, edit and delete events on behalf of their owner.
//!
//! Reminder input is normalized here, once, before anything reaches the store.

use crate::domain::{
    Category, DomainError, Event, EventId, NewEventRecord, Reminder, ReminderInput, UserId,
};
use crate::ports::EventStore;
use chrono::{DateTime, Utc};
use std::cmp::Ordering;
use std::sync::Arc;
use tracing::info;

/// Caller-supplied event fields.
#[derive(Debug, Clone)]
pub struct NewEvent {
    pub name: String,
    pub description: Option<String>,
    pub category: Category,
    pub date: DateTime<Utc>,
    pub reminders: Vec<ReminderInput>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EventSort {
    #[default]
    Date,
    /// Category name, then date.
    Category,
    /// Earliest reminder, then date. Events without reminders come last.
    Reminder,
}

#[derive(Debug, Clone, Default)]
pub struct EventQuery {
    pub category: Option<Category>,
    /// Keep only events dated at or after the query instant.
    pub upcoming_only: bool,
    pub sort: EventSort,
}

pub struct EventService {
    store: Arc<dyn EventStore>,
}

impl EventService {
    pub fn new(store: Arc<dyn EventStore>) -> Self {
        Self { store }
    }

    pub async fn create_event(&self, user_id: UserId, input: NewEvent) -> Result<Event, DomainError> {
        let (name, description) = clean_text(&input.name, input.description.as_deref())?;
        let record = NewEventRecord {
            user_id,
            name,
            description,
            category: input.category,
            date: input.date,
            reminders: input
                .reminders
                .into_iter()
                .map(ReminderInput::normalize)
                .collect(),
        };
        let event = self.store.insert_event(record).await?;
        info!(
            event_id = event.id,
            user_id,
            reminders = event.reminders.len(),
            "event created"
        );
        Ok(event)
    }

    pub async fn list_events(
        &self,
        user_id: UserId,
        query: &EventQuery,
    ) -> Result<Vec<Event>, DomainError> {
        self.list_events_at(user_id, query, Utc::now()).await
    }

    pub async fn list_events_at(
        &self,
        user_id: UserId,
        query: &EventQuery,
        now: DateTime<Utc>,
    ) -> Result<Vec<Event>, DomainError> {
        let mut events = self.store.list_events_for_user(user_id).await?;
        events.retain(|e| {
            query.category.is_none_or(|c| e.category == c) && (!query.upcoming_only || e.date >= now)
        });
        match query.sort {
            EventSort::Date => events.sort_by_key(|e| (e.date, e.id)),
            EventSort::Category => events.sort_by_key(|e| (e.category.as_str(), e.date, e.id)),
            EventSort::Reminder => events.sort_by(by_earliest_reminder),
        }
        Ok(events)
    }

    /// The event, if `user_id` owns it.
    pub async fn get_event(&self, user_id: UserId, id: EventId) -> Result<Event, DomainError> {
        match self.store.find_event(id).await? {
            Some(event) if event.user_id == user_id => Ok(event),
            _ => Err(DomainError::NotFound(format!("event {}", id))),
        }
    }

    /// Replace all fields and reminders.
    ///
    /// A replacement reminder at the same time as an already-sent one stays sent.
    /// Times are matched at millisecond precision, the precision the store keeps.
    pub async fn update_event(
        &self,
        user_id: UserId,
        id: EventId,
        input: NewEvent,
    ) -> Result<Event, DomainError> {
        let mut event = self.get_event(user_id, id).await?;
        let (name, description) = clean_text(&input.name, input.description.as_deref())?;

        let reminders: Vec<Reminder> = input
            .reminders
            .into_iter()
            .map(|r| {
                let mut r = r.normalize();
                r.sent |= event.reminders.iter().any(|old| {
                    old.sent && old.time.timestamp_millis() == r.time.timestamp_millis()
                });
                r
            })
            .collect();

        event.name = name;
        event.description = description;
        event.category = input.category;
        event.date = input.date;
        event.reminders = reminders;
        event.updated_at = Utc::now();

        self.store.save_event(&event).await?;
        info!(event_id = id, user_id, "event updated");
        Ok(event)
    }

    pub async fn delete_event(&self, user_id: UserId, id: EventId) -> Result<(), DomainError> {
        self.get_event(user_id, id).await?;
        if !self.store.delete_event(id).await? {
            return Err(DomainError::NotFound(format!("event {}", id)));
        }
        info!(event_id = id, user_id, "event deleted");
        Ok(())
    }

    /// Append an unsent reminder.
    pub async fn add_reminder(
        &self,
        user_id: UserId,
        id: EventId,
        time: DateTime<Utc>,
    ) -> Result<Event, DomainError> {
        let mut event = self.get_event(user_id, id).await?;
        event.reminders.push(Reminder::new(time));
        event.updated_at = Utc::now();
        self.store.save_event(&event).await?;
        Ok(event)
    }
}

fn clean_text(name: &str, description: Option<&str>) -> Result<(String, Option<String>), DomainError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(DomainError::Validation("event name is required".into()));
    }
    let description = description
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .map(str::to_string);
    Ok((name.to_string(), description))
}

fn by_earliest_reminder(a: &Event, b: &Event) -> Ordering {
    match (a.earliest_reminder(), b.earliest_reminder()) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
    .then(a.date.cmp(&b.date))
    .then(a.id.cmp(&b.id))
}
