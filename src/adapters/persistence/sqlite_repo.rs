//! SQLite-backed event store and user directory via libsql.
//!
//! Reminders live in their own table keyed by (event_id, idx) and indexed on (time, sent),
//! so the due-reminder scan touches only due, unsent rows instead of every reminder.
//! Timestamps are stored as UTC epoch milliseconds. All data shares one file: data/events.db

use crate::domain::{
    Category, DomainError, Event, EventId, NewEventRecord, Reminder, User, UserId,
};
use crate::ports::{EventStore, UserDirectory};
use chrono::{DateTime, Utc};
use libsql::{Connection, Database, Row, params};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const EVENTS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS events (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id INTEGER NOT NULL,
    name TEXT NOT NULL,
    description TEXT,
    category TEXT NOT NULL,
    date INTEGER NOT NULL,
    created_at INTEGER NOT NULL,
    updated_at INTEGER NOT NULL
)"#;
const EVENTS_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS idx_events_user_date ON events (user_id, date)";

/// One row per reminder; `idx` is the reminder's position within its event.
const REMINDERS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS reminders (
    event_id INTEGER NOT NULL,
    idx INTEGER NOT NULL,
    time INTEGER NOT NULL,
    sent INTEGER NOT NULL DEFAULT 0,
    PRIMARY KEY (event_id, idx)
)"#;
const REMINDERS_DUE_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS idx_reminders_time_sent ON reminders (time, sent)";

const USERS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY,
    username TEXT NOT NULL,
    email TEXT NOT NULL
)"#;

const EVENT_COLUMNS: &str =
    "id, user_id, name, description, category, date, created_at, updated_at";

const DUE_EVENT_IDS: &str =
    "SELECT DISTINCT event_id FROM reminders WHERE time <= ?1 AND sent = 0";

/// SQLite repository. One database file (events.db) in the given base directory.
pub struct SqliteRepo {
    db: Database,
    db_path: PathBuf,
}

impl SqliteRepo {
    /// Connect to (or create) the SQLite database and ensure the schema exists.
    /// Call this once at startup; the returned repo is safe to share via Arc.
    ///
    /// Sets WAL mode and synchronous=NORMAL so the scan can read while the
    /// event service writes.
    pub async fn connect(base_dir: impl AsRef<Path>) -> Result<Self, DomainError> {
        let base = base_dir.as_ref();
        std::fs::create_dir_all(base).map_err(|e| DomainError::Store(e.to_string()))?;
        let db_path = base.join("events.db");
        let path_str = db_path.to_string_lossy();
        let db = libsql::Builder::new_local(path_str.as_ref())
            .build()
            .await
            .map_err(store_err)?;
        let conn = db.connect().map_err(store_err)?;

        // PRAGMA returns a row (new value); use query and consume rows (execute fails when rows are returned).
        for pragma in ["PRAGMA journal_mode=WAL", "PRAGMA synchronous=NORMAL"] {
            let mut rows = conn
                .query(pragma, ())
                .await
                .map_err(|e| DomainError::Store(format!("{} failed: {}", pragma, e)))?;
            while rows.next().await.map_err(store_err)?.is_some() {}
        }

        for ddl in [
            EVENTS_TABLE,
            EVENTS_INDEX,
            REMINDERS_TABLE,
            REMINDERS_DUE_INDEX,
            USERS_TABLE,
        ] {
            conn.execute(ddl, ()).await.map_err(store_err)?;
        }

        info!(path = %db_path.display(), "SQLite event store connected with WAL mode");

        Ok(Self { db, db_path })
    }

    pub fn path(&self) -> &Path {
        &self.db_path
    }

    /// Insert or replace a user's contact details.
    pub async fn upsert_user(&self, user: &User) -> Result<(), DomainError> {
        let conn = self.conn()?;
        conn.execute(
            r#"
            INSERT INTO users (id, username, email) VALUES (?1, ?2, ?3)
            ON CONFLICT (id) DO UPDATE SET
                username = excluded.username,
                email = excluded.email
            "#,
            params![user.id, user.username.as_str(), user.email.as_str()],
        )
        .await
        .map_err(store_err)?;
        Ok(())
    }

    fn conn(&self) -> Result<Connection, DomainError> {
        self.db.connect().map_err(store_err)
    }

    /// Load events selected by `filter` (a WHERE clause over `events`) plus all their reminders.
    async fn load_events(
        &self,
        conn: &Connection,
        filter: &str,
        param: i64,
    ) -> Result<Vec<Event>, DomainError> {
        let sql = format!("SELECT {} FROM events WHERE {} ORDER BY id", EVENT_COLUMNS, filter);
        let mut rows = conn.query(&sql, params![param]).await.map_err(store_err)?;
        let mut events = Vec::new();
        while let Some(row) = rows.next().await.map_err(store_err)? {
            events.push(event_from_row(&row)?);
        }
        if events.is_empty() {
            return Ok(events);
        }

        let sql = format!(
            "SELECT event_id, idx, time, sent FROM reminders \
             WHERE event_id IN (SELECT id FROM events WHERE {}) \
             ORDER BY event_id, idx",
            filter
        );
        let mut rows = conn.query(&sql, params![param]).await.map_err(store_err)?;
        let mut reminders: HashMap<EventId, Vec<Reminder>> = HashMap::new();
        while let Some(row) = rows.next().await.map_err(store_err)? {
            let event_id: i64 = row.get(0).map_err(store_err)?;
            let time: i64 = row.get(2).map_err(store_err)?;
            let sent: i64 = row.get(3).map_err(store_err)?;
            reminders.entry(event_id).or_default().push(Reminder {
                time: from_millis(time)?,
                sent: sent != 0,
            });
        }

        for event in &mut events {
            event.reminders = reminders.remove(&event.id).unwrap_or_default();
        }
        Ok(events)
    }
}

#[async_trait::async_trait]
impl EventStore for SqliteRepo {
    async fn find_due_unsent(&self, now: DateTime<Utc>) -> Result<Vec<Event>, DomainError> {
        let conn = self.conn()?;
        let filter = format!("id IN ({})", DUE_EVENT_IDS);
        let events = self
            .load_events(&conn, &filter, now.timestamp_millis())
            .await?;
        debug!(count = events.len(), "events with due reminders");
        Ok(events)
    }

    async fn find_event(&self, id: EventId) -> Result<Option<Event>, DomainError> {
        let conn = self.conn()?;
        let mut events = self.load_events(&conn, "id = ?1", id).await?;
        Ok(events.pop())
    }

    async fn save_event(&self, event: &Event) -> Result<(), DomainError> {
        let conn = self.conn()?;
        let tx = conn.transaction().await.map_err(store_err)?;
        let updated = tx
            .execute(
                r#"
                UPDATE events SET
                    user_id = ?2, name = ?3, description = ?4, category = ?5,
                    date = ?6, updated_at = ?7
                WHERE id = ?1
                "#,
                params![
                    event.id,
                    event.user_id,
                    event.name.as_str(),
                    event.description.clone(),
                    event.category.as_str(),
                    event.date.timestamp_millis(),
                    event.updated_at.timestamp_millis()
                ],
            )
            .await
            .map_err(store_err)?;
        if updated == 0 {
            return Err(DomainError::NotFound(format!("event {}", event.id)));
        }
        write_reminders(&tx, event.id, &event.reminders).await?;
        tx.commit().await.map_err(store_err)?;
        Ok(())
    }

    async fn insert_event(&self, record: NewEventRecord) -> Result<Event, DomainError> {
        let now = Utc::now();
        let conn = self.conn()?;
        let tx = conn.transaction().await.map_err(store_err)?;
        tx.execute(
            r#"
            INSERT INTO events (user_id, name, description, category, date, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)
            "#,
            params![
                record.user_id,
                record.name.as_str(),
                record.description.clone(),
                record.category.as_str(),
                record.date.timestamp_millis(),
                now.timestamp_millis()
            ],
        )
        .await
        .map_err(store_err)?;
        let id = tx.last_insert_rowid();
        write_reminders(&tx, id, &record.reminders).await?;
        tx.commit().await.map_err(store_err)?;

        // Round-trip through millis so the returned value matches what a reload yields.
        let stamp = from_millis(now.timestamp_millis())?;
        let reminders = record
            .reminders
            .iter()
            .map(|r| {
                Ok(Reminder {
                    time: from_millis(r.time.timestamp_millis())?,
                    sent: r.sent,
                })
            })
            .collect::<Result<Vec<_>, DomainError>>()?;
        Ok(Event {
            id,
            user_id: record.user_id,
            name: record.name,
            description: record.description,
            category: record.category,
            date: from_millis(record.date.timestamp_millis())?,
            reminders,
            created_at: stamp,
            updated_at: stamp,
        })
    }

    async fn list_events_for_user(&self, user_id: UserId) -> Result<Vec<Event>, DomainError> {
        let conn = self.conn()?;
        self.load_events(&conn, "user_id = ?1", user_id).await
    }

    async fn delete_event(&self, id: EventId) -> Result<bool, DomainError> {
        let conn = self.conn()?;
        let tx = conn.transaction().await.map_err(store_err)?;
        tx.execute("DELETE FROM reminders WHERE event_id = ?1", params![id])
            .await
            .map_err(store_err)?;
        let deleted = tx
            .execute("DELETE FROM events WHERE id = ?1", params![id])
            .await
            .map_err(store_err)?;
        tx.commit().await.map_err(store_err)?;
        Ok(deleted > 0)
    }
}

#[async_trait::async_trait]
impl UserDirectory for SqliteRepo {
    async fn find_user_by_id(&self, id: UserId) -> Result<Option<User>, DomainError> {
        let conn = self
            .db
            .connect()
            .map_err(|e| DomainError::Directory(e.to_string()))?;
        let mut rows = conn
            .query(
                "SELECT id, username, email FROM users WHERE id = ?1",
                params![id],
            )
            .await
            .map_err(|e| DomainError::Directory(e.to_string()))?;

        if let Some(row) = rows
            .next()
            .await
            .map_err(|e| DomainError::Directory(e.to_string()))?
        {
            let user = User {
                id: row.get(0).map_err(|e| DomainError::Directory(e.to_string()))?,
                username: row.get(1).map_err(|e| DomainError::Directory(e.to_string()))?,
                email: row.get(2).map_err(|e| DomainError::Directory(e.to_string()))?,
            };
            Ok(Some(user))
        } else {
            Ok(None)
        }
    }
}

/// Replace all reminder rows of one event.
async fn write_reminders(
    conn: &Connection,
    event_id: EventId,
    reminders: &[Reminder],
) -> Result<(), DomainError> {
    conn.execute("DELETE FROM reminders WHERE event_id = ?1", params![event_id])
        .await
        .map_err(store_err)?;
    for (idx, r) in reminders.iter().enumerate() {
        conn.execute(
            "INSERT INTO reminders (event_id, idx, time, sent) VALUES (?1, ?2, ?3, ?4)",
            params![
                event_id,
                idx as i64,
                r.time.timestamp_millis(),
                i64::from(r.sent)
            ],
        )
        .await
        .map_err(store_err)?;
    }
    Ok(())
}

fn event_from_row(row: &Row) -> Result<Event, DomainError> {
    let category: String = row.get(4).map_err(store_err)?;
    Ok(Event {
        id: row.get(0).map_err(store_err)?,
        user_id: row.get(1).map_err(store_err)?,
        name: row.get(2).map_err(store_err)?,
        description: row.get::<Option<String>>(3).map_err(store_err)?,
        category: category.parse::<Category>()?,
        date: from_millis(row.get(5).map_err(store_err)?)?,
        reminders: Vec::new(),
        created_at: from_millis(row.get(6).map_err(store_err)?)?,
        updated_at: from_millis(row.get(7).map_err(store_err)?)?,
    })
}

fn from_millis(ms: i64) -> Result<DateTime<Utc>, DomainError> {
    DateTime::from_timestamp_millis(ms)
        .ok_or_else(|| DomainError::Store(format!("timestamp out of range: {}", ms)))
}

fn store_err(e: libsql::Error) -> DomainError {
    DomainError::Store(e.to_string())
}
