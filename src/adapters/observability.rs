//! Tracing-backed dispatch observer. One structured event per reminder outcome.

use crate::domain::{FailureKind, FailureRecord, SentRecord};
use crate::ports::DispatchObserver;
use tracing::{error, info, warn};

#[derive(Debug, Default)]
pub struct TracingObserver;

impl DispatchObserver for TracingObserver {
    fn on_sent(&self, record: &SentRecord) {
        info!(
            event_id = record.event_id,
            reminder_index = record.reminder_index,
            "reminder sent"
        );
    }

    fn on_failure(&self, record: &FailureRecord) {
        match record.kind {
            // Notification already delivered; next pass may deliver it again.
            FailureKind::PersistenceFailed => error!(
                event_id = record.event_id,
                reminder_index = record.reminder_index,
                failure_kind = %record.kind,
                message = %record.message,
                "reminder sent but not marked; duplicate delivery possible"
            ),
            FailureKind::UserNotFound | FailureKind::SendFailed => warn!(
                event_id = record.event_id,
                reminder_index = record.reminder_index,
                failure_kind = %record.kind,
                message = %record.message,
                "reminder not sent"
            ),
        }
    }
}
