//! Scheduler context: owns the scanner and dispatcher and runs one pass per tick.
//!
//! Passes never overlap. A tick that arrives while a pass is in flight is skipped.
//! Uses tokio::time::interval; stops on the owner's CancellationToken.

use crate::domain::{PassOutcome, PassReport};
use crate::ports::{DispatchObserver, EventStore, NotificationSender, ScanTrigger, UserDirectory};
use crate::usecases::reminder_dispatcher::ReminderDispatcher;
use crate::usecases::reminder_scanner::ReminderScanner;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Reminder scheduler. Construct once per process and share via Arc.
pub struct ReminderScheduler {
    scanner: ReminderScanner,
    dispatcher: ReminderDispatcher,
    /// Held for the whole pass.
    in_flight: Mutex<()>,
}

impl ReminderScheduler {
    pub fn new(
        store: Arc<dyn EventStore>,
        users: Arc<dyn UserDirectory>,
        sender: Arc<dyn NotificationSender>,
        observer: Arc<dyn DispatchObserver>,
    ) -> Self {
        Self {
            scanner: ReminderScanner::new(Arc::clone(&store)),
            dispatcher: ReminderDispatcher::new(store, users, sender, observer),
            in_flight: Mutex::new(()),
        }
    }

    /// Run one pass as of `now`, unless another pass is still running.
    pub async fn run_scan_at(&self, now: DateTime<Utc>) -> PassOutcome {
        let Ok(_guard) = self.in_flight.try_lock() else {
            warn!(%now, "previous reminder pass still running; skipping tick");
            return PassOutcome::Skipped;
        };

        let snapshot = match self.scanner.scan_at(now).await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                error!(%now, error = %e, "due reminder query failed");
                return PassOutcome::Failed(e.to_string());
            }
        };

        if snapshot.is_empty() {
            debug!(%now, "no due reminders");
            return PassOutcome::Completed(PassReport::new(now));
        }

        PassOutcome::Completed(self.dispatcher.dispatch(&snapshot).await)
    }

    /// Tick every `every` until `shutdown` is cancelled. A pass in flight finishes first.
    pub async fn run_loop(&self, every: Duration, shutdown: CancellationToken) {
        info!(interval_secs = every.as_secs(), "reminder scheduler started");

        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = ticker.tick() => {}
            }

            match self.run_scan().await {
                PassOutcome::Completed(report) if !report.failures.is_empty() => {
                    warn!(
                        sent = report.sent.len(),
                        failed = report.failures.len(),
                        "reminder pass finished with failures"
                    );
                }
                PassOutcome::Completed(_) | PassOutcome::Skipped => {}
                PassOutcome::Failed(message) => {
                    warn!(error = %message, "reminder pass aborted; retrying next tick");
                }
            }
        }

        info!("reminder scheduler stopped");
    }
}

#[async_trait::async_trait]
impl ScanTrigger for ReminderScheduler {
    async fn run_scan(&self) -> PassOutcome {
        self.run_scan_at(Utc::now()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Reminder;
    use crate::usecases::test_support::{
        MemoryStore, MemoryUsers, RecordingObserver, RecordingSender, event, t0, user,
    };
    use chrono::Duration as ChronoDuration;

    fn scheduler(store: Arc<MemoryStore>, sender: Arc<RecordingSender>) -> ReminderScheduler {
        ReminderScheduler::new(
            store,
            Arc::new(MemoryUsers::with([user(1, "ana")])),
            sender,
            Arc::new(RecordingObserver::default()),
        )
    }

    #[tokio::test]
    async fn test_overlapping_pass_is_skipped() {
        let store = Arc::new(MemoryStore::default());
        let now = t0();
        store.put(event(1, 1, vec![Reminder::new(now - ChronoDuration::minutes(1))]));
        let sender = Arc::new(RecordingSender::gated());
        let sched = Arc::new(scheduler(store.clone(), sender.clone()));

        let first = {
            let sched = Arc::clone(&sched);
            tokio::spawn(async move { sched.run_scan_at(now).await })
        };

        let (entered, release) = sender.gate.as_ref().unwrap();
        entered.notified().await;

        // First pass is blocked inside send.
        assert_eq!(sched.run_scan_at(now).await, PassOutcome::Skipped);

        release.notify_one();
        let outcome = first.await.unwrap();
        assert_eq!(outcome.report().unwrap().sent.len(), 1);
        assert_eq!(sender.count(), 1);

        // Guard released: the next tick runs and finds nothing left.
        let next = sched.run_scan_at(now).await;
        assert_eq!(next.report().unwrap().attempted, 0);
    }

    #[tokio::test]
    async fn test_query_failure_is_not_fatal() {
        let store = Arc::new(MemoryStore::default());
        *store.fail_due_query.lock().unwrap() = true;
        let sched = scheduler(store.clone(), Arc::new(RecordingSender::default()));

        assert!(matches!(sched.run_scan_at(t0()).await, PassOutcome::Failed(_)));

        *store.fail_due_query.lock().unwrap() = false;
        assert!(matches!(
            sched.run_scan_at(t0()).await,
            PassOutcome::Completed(_)
        ));
    }

    #[tokio::test]
    async fn test_run_loop_stops_on_cancel() {
        let store = Arc::new(MemoryStore::default());
        store.put(event(1, 1, vec![Reminder::new(Utc::now() - ChronoDuration::minutes(1))]));
        let sender = Arc::new(RecordingSender::default());
        let sched = Arc::new(scheduler(store.clone(), sender.clone()));
        let shutdown = CancellationToken::new();

        let handle = {
            let sched = Arc::clone(&sched);
            let shutdown = shutdown.clone();
            tokio::spawn(async move {
                sched
                    .run_loop(Duration::from_millis(10), shutdown)
                    .await
            })
        };

        // The first tick fires immediately.
        for _ in 0..100 {
            if sender.count() > 0 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        shutdown.cancel();
        handle.await.unwrap();

        assert_eq!(sender.count(), 1);
        assert!(store.event(1).reminders[0].sent);
    }
}
