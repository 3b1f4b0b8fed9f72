//! SQLite-backed notification delivery spool.
//!
//! The desktop rendition of the platform scheduler: scheduled
//! notifications sit in a spool table until the delivery daemon polls
//! [`SpoolNotifier::deliver_due`] and renders the due ones as toasts.
//! Entries leave the pending list when delivered or cancelled, which is
//! exactly what restoration later observes.

use chrono::Utc;
use rusqlite::{params, Connection};

use crate::error::{DatabaseError, ReminderError};
use crate::storage::data_dir;

use super::notifier::{NotificationContent, Notifier, PendingNotification};

/// A spool entry whose trigger time has arrived.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DueNotification {
    pub id: String,
    pub title: String,
    pub body: String,
    pub data: serde_json::Value,
}

/// SQLite spool implementing the [`Notifier`] seam.
pub struct SpoolNotifier {
    conn: Connection,
}

impl SpoolNotifier {
    /// Open the spool at `~/.config/easyday/easyday.db`.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self, DatabaseError> {
        let path = data_dir()
            .map_err(|e| DatabaseError::OpenFailed {
                path: "easyday.db".into(),
                message: e.to_string(),
            })?
            .join("easyday.db");
        let conn = Connection::open(&path).map_err(|e| DatabaseError::OpenFailed {
            path,
            message: e.to_string(),
        })?;
        let spool = Self { conn };
        spool
            .migrate()
            .map_err(|e| DatabaseError::MigrationFailed(e.to_string()))?;
        Ok(spool)
    }

    /// Open an in-memory spool (for tests).
    pub fn open_memory() -> Result<Self, DatabaseError> {
        let conn = Connection::open_in_memory().map_err(|e| DatabaseError::OpenFailed {
            path: ":memory:".into(),
            message: e.to_string(),
        })?;
        let spool = Self { conn };
        spool
            .migrate()
            .map_err(|e| DatabaseError::MigrationFailed(e.to_string()))?;
        Ok(spool)
    }

    fn migrate(&self) -> Result<(), rusqlite::Error> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS notification_spool (
                id         TEXT PRIMARY KEY,
                title      TEXT NOT NULL,
                body       TEXT NOT NULL,
                data       TEXT NOT NULL DEFAULT '{}',
                deliver_at INTEGER NOT NULL,
                created_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_spool_deliver_at
                ON notification_spool(deliver_at);",
        )?;
        Ok(())
    }

    /// Pop every entry due at or before `now_unix`.
    ///
    /// Delivered entries are deleted before being returned, so a daemon
    /// crash between poll and toast loses at most one poll's worth.
    pub fn deliver_due(&self, now_unix: i64) -> Result<Vec<DueNotification>, DatabaseError> {
        let due = {
            let mut stmt = self.conn.prepare(
                "SELECT id, title, body, data FROM notification_spool
                 WHERE deliver_at <= ?1 ORDER BY deliver_at",
            )?;
            let rows = stmt.query_map(params![now_unix], |row| {
                let data: String = row.get(3)?;
                Ok(DueNotification {
                    id: row.get(0)?,
                    title: row.get(1)?,
                    body: row.get(2)?,
                    data: serde_json::from_str(&data).unwrap_or(serde_json::Value::Null),
                })
            })?;
            let mut due = Vec::new();
            for row in rows {
                due.push(row?);
            }
            due
        };

        for entry in &due {
            self.conn.execute(
                "DELETE FROM notification_spool WHERE id = ?1",
                params![entry.id],
            )?;
        }
        Ok(due)
    }
}

impl Notifier for SpoolNotifier {
    fn request_permission(&self) -> Result<bool, ReminderError> {
        // The spool delivers through the user's own session; there is no
        // platform permission prompt to fail.
        Ok(true)
    }

    fn schedule(
        &self,
        trigger_secs_from_now: i64,
        content: &NotificationContent,
    ) -> Result<String, ReminderError> {
        let id = uuid::Uuid::new_v4().to_string();
        let deliver_at = Utc::now().timestamp() + trigger_secs_from_now.max(0);
        let data_json = serde_json::to_string(&content.data)
            .map_err(|e| ReminderError::Scheduling(format!("serialize payload: {e}")))?;
        self.conn
            .execute(
                "INSERT INTO notification_spool (id, title, body, data, deliver_at, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    id,
                    content.title,
                    content.body,
                    data_json,
                    deliver_at,
                    Utc::now().to_rfc3339(),
                ],
            )
            .map_err(|e| ReminderError::Scheduling(e.to_string()))?;
        Ok(id)
    }

    fn cancel(&self, id: &str) -> Result<(), ReminderError> {
        self.conn
            .execute("DELETE FROM notification_spool WHERE id = ?1", params![id])
            .map_err(|e| ReminderError::Scheduling(e.to_string()))?;
        Ok(())
    }

    fn list_scheduled(&self) -> Result<Vec<PendingNotification>, ReminderError> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, deliver_at FROM notification_spool ORDER BY deliver_at")
            .map_err(|e| ReminderError::Scheduling(e.to_string()))?;
        let rows = stmt
            .query_map([], |row| {
                Ok(PendingNotification {
                    id: row.get(0)?,
                    scheduled_at: row.get(1)?,
                })
            })
            .map_err(|e| ReminderError::Scheduling(e.to_string()))?;
        let mut pending = Vec::new();
        for row in rows {
            pending.push(row.map_err(|e| ReminderError::Scheduling(e.to_string()))?);
        }
        Ok(pending)
    }
}
