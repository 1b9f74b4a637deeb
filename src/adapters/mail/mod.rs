//! Notification senders.

pub mod http_mailer;
pub mod log_mailer;
pub mod template;

pub use http_mailer::HttpMailer;
pub use log_mailer::LogMailer;
pub use template::{ReminderEmail, render_reminder_email};
