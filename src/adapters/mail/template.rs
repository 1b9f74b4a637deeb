//! Reminder email rendering. Subject plus a small HTML body.

use crate::domain::EventSummary;

/// Rendered message, ready for any mail transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReminderEmail {
    pub subject: String,
    pub html: String,
}

pub fn render_reminder_email(display_name: &str, summary: &EventSummary) -> ReminderEmail {
    let html = format!(
        "<h1>Event Reminder</h1>\n\
         <p>Hello {name},</p>\n\
         <p>This is a reminder for your upcoming event:</p>\n\
         <h2>{event}</h2>\n\
         <p><strong>Date:</strong> {date}</p>\n\
         <p><strong>Category:</strong> {category}</p>\n\
         <p><strong>Description:</strong> {description}</p>\n\
         <p>Thank you for using our Event Planning System!</p>\n",
        name = escape_html(display_name),
        event = escape_html(&summary.name),
        date = escape_html(&summary.date),
        category = escape_html(&summary.category),
        description = escape_html(&summary.description),
    );
    ReminderEmail {
        subject: format!("Reminder: {}", summary.name),
        html,
    }
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
