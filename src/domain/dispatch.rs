//! Records produced by a scan pass. Reported to the observer and collected in the pass report.

use super::entities::EventId;
use super::errors::FailureKind;
use chrono::{DateTime, Utc};

/// One reminder notified and stored as sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentRecord {
    pub event_id: EventId,
    pub reminder_index: usize,
}

/// One reminder left unsent by this pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailureRecord {
    pub event_id: EventId,
    pub reminder_index: usize,
    pub kind: FailureKind,
    pub message: String,
}

/// Outcome of one complete scan-and-dispatch pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PassReport {
    pub now: DateTime<Utc>,
    /// Candidates selected by the scan.
    pub attempted: usize,
    pub sent: Vec<SentRecord>,
    /// Candidates dropped by the processing-time re-check.
    pub skipped: usize,
    pub failures: Vec<FailureRecord>,
}

impl PassReport {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now,
            attempted: 0,
            sent: Vec::new(),
            skipped: 0,
            failures: Vec::new(),
        }
    }

    pub fn failures_of(&self, kind: FailureKind) -> usize {
        self.failures.iter().filter(|f| f.kind == kind).count()
    }
}

/// What the trigger gets back from `run_scan`. Never an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PassOutcome {
    Completed(PassReport),
    /// Another pass was still in flight; this tick did nothing.
    Skipped,
    /// The due-reminder query itself failed; nothing was dispatched.
    Failed(String),
}

impl PassOutcome {
    pub fn report(&self) -> Option<&PassReport> {
        match self {
            PassOutcome::Completed(r) => Some(r),
            _ => None,
        }
    }
}
