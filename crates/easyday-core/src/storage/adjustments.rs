//! SQLite-based storage for per-day schedule adjustments.
//!
//! One row per `(baby, date, item_order)`. Adjustments are written when a
//! caregiver drags a phase, read when building "today's" schedule, and
//! swept after seven days.

use chrono::{Days, NaiveDate, Utc};
use rusqlite::{params, Connection};

use crate::clock::ClockTime;
use crate::error::DatabaseError;
use crate::schedule::ScheduleAdjustment;

use super::data_dir;

/// How long an adjustment outlives its day before the sweep removes it.
pub const STALE_AFTER_DAYS: u64 = 7;

fn row_to_adjustment(row: &rusqlite::Row) -> Result<ScheduleAdjustment, rusqlite::Error> {
    let date: String = row.get(1)?;
    let start: String = row.get(3)?;

    Ok(ScheduleAdjustment {
        baby_id: row.get(0)?,
        date: date.parse().unwrap_or_else(|_| Utc::now().date_naive()),
        item_order: row.get(2)?,
        start: ClockTime::parse(&start).unwrap_or(ClockTime::MIDNIGHT),
        duration_min: row.get(4)?,
    })
}

/// SQLite store for schedule adjustments.
pub struct AdjustmentStore {
    conn: Connection,
}

impl AdjustmentStore {
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
            "CREATE TABLE IF NOT EXISTS schedule_adjustments (
                baby_id         TEXT NOT NULL,
                adjustment_date TEXT NOT NULL,
                item_order      INTEGER NOT NULL,
                start_time      TEXT NOT NULL,
                duration_min    INTEGER NOT NULL,
                created_at      TEXT NOT NULL,
                PRIMARY KEY (baby_id, adjustment_date, item_order)
            );

            CREATE INDEX IF NOT EXISTS idx_adjustments_date
                ON schedule_adjustments(adjustment_date);",
        )?;
        Ok(())
    }

    /// All overrides for one baby and day, ordered by item order.
    pub fn for_day(&self, baby_id: &str, date: NaiveDate) -> Result<Vec<ScheduleAdjustment>, DatabaseError> {
        let mut stmt = self.conn.prepare(
            "SELECT baby_id, adjustment_date, item_order, start_time, duration_min
             FROM schedule_adjustments
             WHERE baby_id = ?1 AND adjustment_date = ?2
             ORDER BY item_order",
        )?;
        let rows = stmt.query_map(params![baby_id, date.to_string()], row_to_adjustment)?;
        let mut adjustments = Vec::new();
        for row in rows {
            adjustments.push(row?);
        }
        Ok(adjustments)
    }

    /// Save an override, replacing any prior row with the same
    /// `(baby, date, item_order)` key. Delete-then-insert keeps repeated
    /// saves idempotent.
    pub fn save(&self, adjustment: &ScheduleAdjustment) -> Result<(), DatabaseError> {
        self.conn.execute(
            "DELETE FROM schedule_adjustments
             WHERE baby_id = ?1 AND adjustment_date = ?2 AND item_order = ?3",
            params![
                adjustment.baby_id,
                adjustment.date.to_string(),
                adjustment.item_order
            ],
        )?;
        self.conn.execute(
            "INSERT INTO schedule_adjustments
             (baby_id, adjustment_date, item_order, start_time, duration_min, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                adjustment.baby_id,
                adjustment.date.to_string(),
                adjustment.item_order,
                adjustment.start.to_string(),
                adjustment.duration_min,
                Utc::now().to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// Clear a day's overrides ("reset to default schedule").
    pub fn delete_day(&self, baby_id: &str, date: NaiveDate) -> Result<usize, DatabaseError> {
        let deleted = self.conn.execute(
            "DELETE FROM schedule_adjustments
             WHERE baby_id = ?1 AND adjustment_date = ?2",
            params![baby_id, date.to_string()],
        )?;
        Ok(deleted)
    }

    /// Delete rows whose date is more than [`STALE_AFTER_DAYS`] before
    /// `today`. Meant for the startup hook, not interactive save paths.
    pub fn cleanup_stale(&self, today: NaiveDate) -> Result<usize, DatabaseError> {
        let cutoff = today
            .checked_sub_days(Days::new(STALE_AFTER_DAYS))
            .unwrap_or(today);
        let deleted = self.conn.execute(
            "DELETE FROM schedule_adjustments WHERE adjustment_date < ?1",
            params![cutoff.to_string()],
        )?;
        if deleted > 0 {
            log::info!("swept {deleted} stale schedule adjustment(s) older than {cutoff}");
        }
        Ok(deleted)
    }
}
