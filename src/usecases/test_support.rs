//! In-memory port fakes for use-case tests.

use crate::domain::{
    DomainError, Event, EventId, EventSummary, FailureRecord, NewEventRecord, SentRecord, User,
    UserId,
};
use crate::ports::{DispatchObserver, EventStore, NotificationSender, UserDirectory};
use chrono::{DateTime, TimeZone, Utc};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Notify;

pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
}

#[derive(Default)]
pub struct MemoryStore {
    events: Mutex<BTreeMap<EventId, Event>>,
    next_id: AtomicUsize,
    pub fail_save_for: Mutex<HashSet<EventId>>,
    pub fail_due_query: Mutex<bool>,
    pub saves: AtomicUsize,
}

impl MemoryStore {
    pub fn event(&self, id: EventId) -> Event {
        self.events.lock().unwrap()[&id].clone()
    }

    pub fn put(&self, event: Event) {
        self.events.lock().unwrap().insert(event.id, event);
    }

    pub fn remove(&self, id: EventId) {
        self.events.lock().unwrap().remove(&id);
    }

    pub fn fail_saves_for(&self, id: EventId) {
        self.fail_save_for.lock().unwrap().insert(id);
    }

    pub fn heal(&self) {
        self.fail_save_for.lock().unwrap().clear();
    }
}

#[async_trait::async_trait]
impl EventStore for MemoryStore {
    async fn find_due_unsent(&self, now: DateTime<Utc>) -> Result<Vec<Event>, DomainError> {
        if *self.fail_due_query.lock().unwrap() {
            return Err(DomainError::Store("query failed".into()));
        }
        Ok(self
            .events
            .lock()
            .unwrap()
            .values()
            .filter(|e| e.reminders.iter().any(|r| r.is_due(now)))
            .cloned()
            .collect())
    }

    async fn find_event(&self, id: EventId) -> Result<Option<Event>, DomainError> {
        Ok(self.events.lock().unwrap().get(&id).cloned())
    }

    async fn save_event(&self, event: &Event) -> Result<(), DomainError> {
        if self.fail_save_for.lock().unwrap().contains(&event.id) {
            return Err(DomainError::Store("disk full".into()));
        }
        self.saves.fetch_add(1, Ordering::SeqCst);
        self.put(event.clone());
        Ok(())
    }

    async fn insert_event(&self, record: NewEventRecord) -> Result<Event, DomainError> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) as EventId + 1;
        let now = Utc::now();
        let event = Event {
            id,
            user_id: record.user_id,
            name: record.name,
            description: record.description,
            category: record.category,
            date: record.date,
            reminders: record.reminders,
            created_at: now,
            updated_at: now,
        };
        self.put(event.clone());
        Ok(event)
    }

    async fn list_events_for_user(&self, user_id: UserId) -> Result<Vec<Event>, DomainError> {
        Ok(self
            .events
            .lock()
            .unwrap()
            .values()
            .filter(|e| e.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn delete_event(&self, id: EventId) -> Result<bool, DomainError> {
        Ok(self.events.lock().unwrap().remove(&id).is_some())
    }
}

#[derive(Default)]
pub struct MemoryUsers {
    users: Mutex<HashMap<UserId, User>>,
}

impl MemoryUsers {
    pub fn with(users: impl IntoIterator<Item = User>) -> Self {
        let me = Self::default();
        for u in users {
            me.users.lock().unwrap().insert(u.id, u);
        }
        me
    }
}

#[async_trait::async_trait]
impl UserDirectory for MemoryUsers {
    async fn find_user_by_id(&self, id: UserId) -> Result<Option<User>, DomainError> {
        Ok(self.users.lock().unwrap().get(&id).cloned())
    }
}

pub fn user(id: UserId, name: &str) -> User {
    User {
        id,
        username: name.to_string(),
        email: format!("{}@example.com", name),
    }
}

/// Records every send. Addresses in `failing` are rejected.
#[derive(Default)]
pub struct RecordingSender {
    pub sent: Mutex<Vec<(String, EventSummary)>>,
    pub failing: Mutex<HashSet<String>>,
    /// When set, each send signals `entered` then waits on `release`.
    pub gate: Option<(Notify, Notify)>,
}

impl RecordingSender {
    pub fn gated() -> Self {
        Self {
            gate: Some((Notify::new(), Notify::new())),
            ..Self::default()
        }
    }

    pub fn count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }

    pub fn fail_for(&self, address: &str) {
        self.failing.lock().unwrap().insert(address.to_string());
    }
}

#[async_trait::async_trait]
impl NotificationSender for RecordingSender {
    async fn send(
        &self,
        address: &str,
        _display_name: &str,
        summary: &EventSummary,
    ) -> Result<(), DomainError> {
        if let Some((entered, release)) = &self.gate {
            entered.notify_one();
            release.notified().await;
        }
        if self.failing.lock().unwrap().contains(address) {
            return Err(DomainError::Notification("relay refused".into()));
        }
        self.sent
            .lock()
            .unwrap()
            .push((address.to_string(), summary.clone()));
        Ok(())
    }
}

#[derive(Default)]
pub struct RecordingObserver {
    pub sent: Mutex<Vec<SentRecord>>,
    pub failures: Mutex<Vec<FailureRecord>>,
}

impl DispatchObserver for RecordingObserver {
    fn on_sent(&self, record: &SentRecord) {
        self.sent.lock().unwrap().push(record.clone());
    }

    fn on_failure(&self, record: &FailureRecord) {
        self.failures.lock().unwrap().push(record.clone());
    }
}

pub fn event(id: EventId, user_id: UserId, reminders: Vec<crate::domain::Reminder>) -> Event {
    Event {
        id,
        user_id,
        name: format!("Event {}", id),
        description: None,
        category: crate::domain::Category::Meeting,
        date: t0() + chrono::Duration::hours(1),
        reminders,
        created_at: t0() - chrono::Duration::days(1),
        updated_at: t0() - chrono::Duration::days(1),
    }
}
