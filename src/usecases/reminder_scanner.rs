//! Due-reminder selection.
//!
//! - Captures `now` once per scan
//! - Asks the EventStore only for events with a due, unsent reminder
//! - Exposes the matches as a lazy, repeatable sequence of (event, reminder index)

use crate::domain::{DomainError, Event, Reminder};
use crate::ports::EventStore;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::debug;

/// Scanner. Read-only; no side effects on the store.
pub struct ReminderScanner {
    store: Arc<dyn EventStore>,
}

impl ReminderScanner {
    pub fn new(store: Arc<dyn EventStore>) -> Self {
        Self { store }
    }

    /// Scan at the current wall-clock time.
    pub async fn scan(&self) -> Result<ScanSnapshot, DomainError> {
        self.scan_at(Utc::now()).await
    }

    pub async fn scan_at(&self, now: DateTime<Utc>) -> Result<ScanSnapshot, DomainError> {
        let events = self.store.find_due_unsent(now).await?;
        let snapshot = ScanSnapshot { now, events };
        debug!(
            %now,
            events = snapshot.events.len(),
            due = snapshot.len(),
            "scan complete"
        );
        Ok(snapshot)
    }
}

/// Events fetched by one scan, frozen at the scan instant.
#[derive(Debug, Clone)]
pub struct ScanSnapshot {
    now: DateTime<Utc>,
    events: Vec<Event>,
}

/// One due, unsent reminder inside a snapshot.
#[derive(Debug, Clone, Copy)]
pub struct DueReminder<'a> {
    pub event: &'a Event,
    pub index: usize,
}

impl DueReminder<'_> {
    pub fn reminder(&self) -> &Reminder {
        &self.event.reminders[self.index]
    }
}

impl ScanSnapshot {
    pub fn now(&self) -> DateTime<Utc> {
        self.now
    }

    /// Due reminders in store order, then reminder order.
    ///
    /// Re-applies the due predicate, so events the store over-selected contribute nothing.
    pub fn due(&self) -> impl Iterator<Item = DueReminder<'_>> + '_ {
        let now = self.now;
        self.events.iter().flat_map(move |event| {
            event
                .due_reminder_indices(now)
                .map(move |index| DueReminder { event, index })
        })
    }

    pub fn len(&self) -> usize {
        self.due().count()
    }

    pub fn is_empty(&self) -> bool {
        self.due().next().is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Reminder;
    use crate::usecases::test_support::{MemoryStore, event, t0};
    use chrono::Duration;

    #[tokio::test]
    async fn test_scan_selects_only_due_unsent() {
        let store = Arc::new(MemoryStore::default());
        let now = t0();
        store.put(event(
            1,
            1,
            vec![
                Reminder::new(now - Duration::minutes(10)),
                Reminder::new(now + Duration::minutes(10)),
                Reminder {
                    time: now - Duration::minutes(30),
                    sent: true,
                },
            ],
        ));
        store.put(event(2, 1, vec![Reminder::new(now + Duration::hours(2))]));
        store.put(event(3, 2, vec![Reminder::new(now)]));

        let scanner = ReminderScanner::new(store);
        let snapshot = scanner.scan_at(now).await.unwrap();

        let pairs: Vec<(i64, usize)> = snapshot.due().map(|d| (d.event.id, d.index)).collect();
        assert_eq!(pairs, vec![(1, 0), (3, 0)]);
        assert_eq!(snapshot.now(), now);
    }

    #[tokio::test]
    async fn test_snapshot_iteration_is_stable() {
        let store = Arc::new(MemoryStore::default());
        let now = t0();
        store.put(event(
            1,
            1,
            vec![
                Reminder::new(now - Duration::minutes(1)),
                Reminder::new(now - Duration::minutes(2)),
            ],
        ));
        let snapshot = ReminderScanner::new(store.clone())
            .scan_at(now)
            .await
            .unwrap();

        // Later store changes do not leak into the snapshot.
        store.put(event(9, 1, vec![Reminder::new(now - Duration::minutes(3))]));

        let first: Vec<_> = snapshot.due().map(|d| (d.event.id, d.index)).collect();
        let second: Vec<_> = snapshot.due().map(|d| (d.event.id, d.index)).collect();
        assert_eq!(first, second);
        assert_eq!(snapshot.len(), 2);
        assert_eq!(
            snapshot.due().next().unwrap().reminder().time,
            now - Duration::minutes(1)
        );
    }

    #[tokio::test]
    async fn test_empty_store() {
        let snapshot = ReminderScanner::new(Arc::new(MemoryStore::default()))
            .scan_at(t0())
            .await
            .unwrap();
        assert!(snapshot.is_empty());
    }
}
