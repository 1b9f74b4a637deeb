//! Domain errors. Used by ports and use cases.
//!
//! Adapters map infrastructure errors into these.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Event store error: {0}")]
    Store(String),

    #[error("User directory error: {0}")]
    Directory(String),

    #[error("Notification send failed: {0}")]
    Notification(String),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Why a single due reminder was not marked sent during a pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// Owning user missing (or unreadable) at dispatch time.
    UserNotFound,
    /// Notification transport returned an error.
    SendFailed,
    /// The notification went out but the sent flag could not be stored.
    /// The reminder stays unsent and may be delivered again next pass.
    PersistenceFailed,
}

impl FailureKind {
    pub fn as_str(self) -> &'static str {
        match self {
            FailureKind::UserNotFound => "user_not_found",
            FailureKind::SendFailed => "send_failed",
            FailureKind::PersistenceFailed => "persistence_failed",
        }
    }
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
