//! Send-then-persist for every due reminder of a scan snapshot.
//!
//! - Resolves the owning user once per event
//! - Reloads the event and re-checks each reminder before sending
//! - Marks `sent` and saves only the owning event, only after a successful send
//! - Never aborts the pass: each failure is reported and the next reminder proceeds

use crate::domain::{Event, EventId, FailureKind, FailureRecord, PassReport, SentRecord, User};
use crate::ports::{DispatchObserver, EventStore, NotificationSender, UserDirectory};
use crate::usecases::reminder_scanner::{DueReminder, ScanSnapshot};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{debug, info, warn};

pub struct ReminderDispatcher {
    store: Arc<dyn EventStore>,
    users: Arc<dyn UserDirectory>,
    sender: Arc<dyn NotificationSender>,
    observer: Arc<dyn DispatchObserver>,
}

impl ReminderDispatcher {
    pub fn new(
        store: Arc<dyn EventStore>,
        users: Arc<dyn UserDirectory>,
        sender: Arc<dyn NotificationSender>,
        observer: Arc<dyn DispatchObserver>,
    ) -> Self {
        Self {
            store,
            users,
            sender,
            observer,
        }
    }

    /// Process every due reminder in `snapshot`, sequentially.
    pub async fn dispatch(&self, snapshot: &ScanSnapshot) -> PassReport {
        let now = snapshot.now();
        let mut report = PassReport::new(now);

        // `due()` yields each event's reminders consecutively.
        let mut due = snapshot.due().peekable();
        while let Some(first) = due.next() {
            let mut candidates = vec![first];
            while let Some(next) = due.next_if(|d| d.event.id == first.event.id) {
                candidates.push(next);
            }
            report.attempted += candidates.len();
            self.dispatch_event(first.event, &candidates, now, &mut report)
                .await;
        }

        info!(
            %now,
            attempted = report.attempted,
            sent = report.sent.len(),
            skipped = report.skipped,
            failed = report.failures.len(),
            "reminder pass complete"
        );
        report
    }

    async fn dispatch_event(
        &self,
        scanned: &Event,
        candidates: &[DueReminder<'_>],
        now: DateTime<Utc>,
        report: &mut PassReport,
    ) {
        let user = match self.resolve_user(scanned).await {
            Ok(user) => user,
            Err(message) => {
                for due in candidates {
                    self.fail(report, scanned.id, due.index, FailureKind::UserNotFound, &message);
                }
                return;
            }
        };

        let mut event = match self.store.find_event(scanned.id).await {
            Ok(Some(current)) => current,
            Ok(None) => {
                debug!(event_id = scanned.id, "event deleted since scan; skipping");
                report.skipped += candidates.len();
                return;
            }
            Err(e) => {
                // The scanned copy is still a valid basis for at-least-once delivery.
                warn!(event_id = scanned.id, error = %e, "reload failed; using scanned copy");
                scanned.clone()
            }
        };

        for due in candidates {
            let index = due.index;
            let scanned_time = due.reminder().time;
            let still_due = event
                .reminders
                .get(index)
                .is_some_and(|r| r.time == scanned_time && r.is_due(now));
            if !still_due {
                debug!(
                    event_id = event.id,
                    reminder_index = index,
                    "reminder no longer due or already sent; skipping"
                );
                report.skipped += 1;
                continue;
            }

            let summary = event.summary();
            if let Err(e) = self
                .sender
                .send(&user.email, &user.username, &summary)
                .await
            {
                self.fail(
                    report,
                    event.id,
                    index,
                    FailureKind::SendFailed,
                    &e.to_string(),
                );
                continue;
            }

            event.reminders[index].sent = true;
            if let Err(e) = self.store.save_event(&event).await {
                // Keep the working copy in line with storage so later saves don't
                // persist a flag this save could not.
                event.reminders[index].sent = false;
                self.fail(
                    report,
                    event.id,
                    index,
                    FailureKind::PersistenceFailed,
                    &e.to_string(),
                );
                continue;
            }

            let record = SentRecord {
                event_id: event.id,
                reminder_index: index,
            };
            self.observer.on_sent(&record);
            report.sent.push(record);
        }
    }

    async fn resolve_user(&self, event: &Event) -> Result<User, String> {
        match self.users.find_user_by_id(event.user_id).await {
            Ok(Some(user)) => Ok(user),
            Ok(None) => Err(format!("user {} not found", event.user_id)),
            Err(e) => Err(e.to_string()),
        }
    }

    fn fail(
        &self,
        report: &mut PassReport,
        event_id: EventId,
        reminder_index: usize,
        kind: FailureKind,
        message: &str,
    ) {
        let record = FailureRecord {
            event_id,
            reminder_index,
            kind,
            message: message.to_string(),
        };
        self.observer.on_failure(&record);
        report.failures.push(record);
    }
}
