//! SQLite-based storage for scheduled-notification records.
//!
//! Each row mirrors one notification handed to the platform notifier.
//! Records are a cache of what should be pending, not the source of
//! truth; restoration reconciles them against the notifier on startup.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};

use crate::error::DatabaseError;

use super::data_dir;

/// Which reminder feature a record belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReminderKind {
    /// Phase-end reminders derived from the generated schedule; tracked
    /// as a full set.
    Easy,
    /// The next-feeding reminder; tracked as a single slot.
    Feeding,
}

/// Decode the stored `kind` column; unrecognized values read as Easy.
fn parse_reminder_kind(kind_str: &str) -> ReminderKind {
    match kind_str {
        "feeding" => ReminderKind::Feeding,
        _ => ReminderKind::Easy,
    }
}

/// The string form a kind takes in the `kind` column.
fn format_reminder_kind(kind: ReminderKind) -> &'static str {
    match kind {
        ReminderKind::Easy => "easy",
        ReminderKind::Feeding => "feeding",
    }
}

/// One persisted notification, keyed by the notifier's opaque id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationRecord {
    pub notification_id: String,
    pub kind: ReminderKind,
    /// Trigger time in unix seconds.
    pub scheduled_at: i64,
    /// Opaque payload echoed back when the notification fires.
    pub data: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

fn row_to_record(row: &rusqlite::Row) -> Result<NotificationRecord, rusqlite::Error> {
    let kind: String = row.get(1)?;
    let data: String = row.get(3)?;
    let created_at: String = row.get(4)?;

    Ok(NotificationRecord {
        notification_id: row.get(0)?,
        kind: parse_reminder_kind(&kind),
        scheduled_at: row.get(2)?,
        data: serde_json::from_str(&data).unwrap_or(serde_json::Value::Null),
        created_at: DateTime::parse_from_rfc3339(&created_at)
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|_| Utc::now()),
    })
}

/// SQLite store for notification records.
pub struct ReminderStore {
    conn: Connection,
}

impl ReminderStore {
    /// Open the store at `~/.config/easyday/easyday.db`.
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
        let store = Self { conn };
        store
            .migrate()
            .map_err(|e| DatabaseError::MigrationFailed(e.to_string()))?;
        Ok(store)
    }

    /// Open an in-memory store (for tests).
    pub fn open_memory() -> Result<Self, DatabaseError> {
        let conn = Connection::open_in_memory().map_err(|e| DatabaseError::OpenFailed {
            path: ":memory:".into(),
            message: e.to_string(),
        })?;
        let store = Self { conn };
        store
            .migrate()
            .map_err(|e| DatabaseError::MigrationFailed(e.to_string()))?;
        Ok(store)
    }

    fn migrate(&self) -> Result<(), rusqlite::Error> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS notification_records (
                notification_id TEXT PRIMARY KEY,
                kind            TEXT NOT NULL,
                scheduled_at    INTEGER NOT NULL,
                data            TEXT NOT NULL DEFAULT '{}',
                created_at      TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_notification_records_kind
                ON notification_records(kind);",
        )?;
        Ok(())
    }

    pub fn insert(&self, record: &NotificationRecord) -> Result<(), DatabaseError> {
        let data_json = serde_json::to_string(&record.data)
            .map_err(|e| DatabaseError::QueryFailed(format!("serialize data: {e}")))?;
        self.conn.execute(
            "INSERT OR REPLACE INTO notification_records
             (notification_id, kind, scheduled_at, data, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                record.notification_id,
                format_reminder_kind(record.kind),
                record.scheduled_at,
                data_json,
                record.created_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    pub fn delete(&self, notification_id: &str) -> Result<bool, DatabaseError> {
        let deleted = self.conn.execute(
            "DELETE FROM notification_records WHERE notification_id = ?1",
            params![notification_id],
        )?;
        Ok(deleted > 0)
    }

    /// Delete every record of one kind; returns how many went.
    pub fn delete_kind(&self, kind: ReminderKind) -> Result<usize, DatabaseError> {
        let deleted = self.conn.execute(
            "DELETE FROM notification_records WHERE kind = ?1",
            params![format_reminder_kind(kind)],
        )?;
        Ok(deleted)
    }

    /// All records of one kind, soonest trigger first.
    pub fn list_kind(&self, kind: ReminderKind) -> Result<Vec<NotificationRecord>, DatabaseError> {
        let mut stmt = self.conn.prepare(
            "SELECT notification_id, kind, scheduled_at, data, created_at
             FROM notification_records WHERE kind = ?1
             ORDER BY scheduled_at",
        )?;
        let rows = stmt.query_map(params![format_reminder_kind(kind)], row_to_record)?;
        let mut records = Vec::new();
        for row in rows {
            records.push(row?);
        }
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, kind: ReminderKind, scheduled_at: i64) -> NotificationRecord {
        NotificationRecord {
            notification_id: id.to_string(),
            kind,
            scheduled_at,
            data: serde_json::json!({ "label": "Sleep 1" }),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn insert_and_list_by_kind() {
        let store = ReminderStore::open_memory().unwrap();
        store.insert(&record("n1", ReminderKind::Easy, 200)).unwrap();
        store.insert(&record("n2", ReminderKind::Easy, 100)).unwrap();
        store.insert(&record("n3", ReminderKind::Feeding, 150)).unwrap();

        let easy = store.list_kind(ReminderKind::Easy).unwrap();
        assert_eq!(easy.len(), 2);
        // Soonest first.
        assert_eq!(easy[0].notification_id, "n2");
        assert_eq!(easy[1].notification_id, "n1");

        let feeding = store.list_kind(ReminderKind::Feeding).unwrap();
        assert_eq!(feeding.len(), 1);
        assert_eq!(feeding[0].data["label"], "Sleep 1");
    }

    #[test]
    fn delete_single_record() {
        let store = ReminderStore::open_memory().unwrap();
        store.insert(&record("n1", ReminderKind::Easy, 100)).unwrap();

        assert!(store.delete("n1").unwrap());
        assert!(!store.delete("n1").unwrap());
        assert!(store.list_kind(ReminderKind::Easy).unwrap().is_empty());
    }

    #[test]
    fn delete_kind_leaves_other_kinds() {
        let store = ReminderStore::open_memory().unwrap();
        store.insert(&record("n1", ReminderKind::Easy, 100)).unwrap();
        store.insert(&record("n2", ReminderKind::Easy, 200)).unwrap();
        store.insert(&record("n3", ReminderKind::Feeding, 300)).unwrap();

        let deleted = store.delete_kind(ReminderKind::Easy).unwrap();
        assert_eq!(deleted, 2);
        assert!(store.list_kind(ReminderKind::Easy).unwrap().is_empty());
        assert_eq!(store.list_kind(ReminderKind::Feeding).unwrap().len(), 1);
    }
}
