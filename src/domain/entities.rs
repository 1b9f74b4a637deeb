//! Domain entities. Pure data structures for the core business.
//!
//! No storage/transport types here; adapters map into these.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::errors::DomainError;

pub type EventId = i64;
pub type UserId = i64;

/// Fixed set of event categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Category {
    Meeting,
    Birthday,
    Appointment,
    Other,
}

impl Category {
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Meeting => "Meeting",
            Category::Birthday => "Birthday",
            Category::Appointment => "Appointment",
            Category::Other => "Other",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Meeting" => Ok(Category::Meeting),
            "Birthday" => Ok(Category::Birthday),
            "Appointment" => Ok(Category::Appointment),
            "Other" => Ok(Category::Other),
            other => Err(DomainError::Validation(format!(
                "unknown category '{}'",
                other
            ))),
        }
    }
}

/// A due time attached to an event. `sent` only ever goes from false to true.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reminder {
    pub time: DateTime<Utc>,
    #[serde(default)]
    pub sent: bool,
}

impl Reminder {
    pub fn new(time: DateTime<Utc>) -> Self {
        Self { time, sent: false }
    }

    /// Due at `now` and not yet notified.
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.time <= now && !self.sent
    }
}

/// Reminder as accepted from callers: either a bare timestamp or `{time, sent}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ReminderInput {
    At(DateTime<Utc>),
    Detailed {
        time: DateTime<Utc>,
        #[serde(default)]
        sent: Option<bool>,
    },
}

impl ReminderInput {
    /// Canonical form used everywhere past the service boundary.
    pub fn normalize(self) -> Reminder {
        match self {
            ReminderInput::At(time) => Reminder::new(time),
            ReminderInput::Detailed { time, sent } => Reminder {
                time,
                sent: sent.unwrap_or(false),
            },
        }
    }
}

impl From<DateTime<Utc>> for ReminderInput {
    fn from(time: DateTime<Utc>) -> Self {
        ReminderInput::At(time)
    }
}

/// A scheduled occurrence owned by one user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub user_id: UserId,
    pub name: String,
    pub description: Option<String>,
    pub category: Category,
    pub date: DateTime<Utc>,
    pub reminders: Vec<Reminder>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Event {
    /// Indices of reminders due at `now`, in order.
    pub fn due_reminder_indices(&self, now: DateTime<Utc>) -> impl Iterator<Item = usize> + '_ {
        self.reminders
            .iter()
            .enumerate()
            .filter(move |(_, r)| r.is_due(now))
            .map(|(i, _)| i)
    }

    /// Earliest reminder time, if any. Used for reminder-ordered listings.
    pub fn earliest_reminder(&self) -> Option<DateTime<Utc>> {
        self.reminders.iter().map(|r| r.time).min()
    }

    pub fn summary(&self) -> EventSummary {
        EventSummary::from(self)
    }
}

/// Event fields before the store assigns an id and timestamps.
#[derive(Debug, Clone, PartialEq)]
pub struct NewEventRecord {
    pub user_id: UserId,
    pub name: String,
    pub description: Option<String>,
    pub category: Category,
    pub date: DateTime<Utc>,
    pub reminders: Vec<Reminder>,
}

/// Contact details used for notifications. Read-only from the core's point of view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: String,
}

pub const NO_DESCRIPTION: &str = "No description provided";

/// Notification payload for one event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventSummary {
    pub name: String,
    pub date: String,
    pub category: String,
    pub description: String,
}

impl From<&Event> for EventSummary {
    fn from(event: &Event) -> Self {
        Self {
            name: event.name.clone(),
            date: event.date.format("%Y-%m-%d %H:%M UTC").to_string(),
            category: event.category.to_string(),
            description: event
                .description
                .clone()
                .unwrap_or_else(|| NO_DESCRIPTION.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, h, m, 0).unwrap()
    }

    #[test]
    fn test_reminder_input_bare_timestamp() {
        let input: ReminderInput = serde_json::from_str(r#""2024-03-01T09:30:00Z""#).unwrap();
        assert_eq!(input.normalize(), Reminder::new(at(9, 30)));
    }

    #[test]
    fn test_reminder_input_object() {
        let input: ReminderInput =
            serde_json::from_str(r#"{"time": "2024-03-01T09:30:00Z", "sent": true}"#).unwrap();
        let r = input.normalize();
        assert_eq!(r.time, at(9, 30));
        assert!(r.sent);

        let input: ReminderInput =
            serde_json::from_str(r#"{"time": "2024-03-01T09:30:00Z"}"#).unwrap();
        assert!(!input.normalize().sent);
    }

    #[test]
    fn test_is_due_boundary() {
        let now = at(10, 0);
        assert!(Reminder::new(now).is_due(now));
        assert!(!Reminder::new(now + Duration::seconds(1)).is_due(now));
        let sent = Reminder {
            time: now - Duration::minutes(5),
            sent: true,
        };
        assert!(!sent.is_due(now));
    }

    #[test]
    fn test_summary_placeholder_description() {
        let event = Event {
            id: 1,
            user_id: 7,
            name: "Dentist".to_string(),
            description: None,
            category: Category::Appointment,
            date: at(14, 5),
            reminders: vec![],
            created_at: at(8, 0),
            updated_at: at(8, 0),
        };
        let s = event.summary();
        assert_eq!(s.description, NO_DESCRIPTION);
        assert_eq!(s.category, "Appointment");
        assert_eq!(s.date, "2024-03-01 14:05 UTC");
    }

    #[test]
    fn test_category_parse() {
        assert_eq!("Birthday".parse::<Category>().unwrap(), Category::Birthday);
        assert!("Party".parse::<Category>().is_err());
    }
}
