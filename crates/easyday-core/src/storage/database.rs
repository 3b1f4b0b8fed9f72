//! SQLite-based storage for baby profiles and formulas.
//!
//! Provides persistent storage for:
//! - Baby profiles (name, birthdate, wake time, formula selection)
//! - Custom formulas, including day-scoped "today only" schedules
//! - Key-value store for application state (active baby pointer)

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, Connection};

use crate::clock::ClockTime;
use crate::error::DatabaseError;
use crate::formula::{find_preset, preset_by_age, Formula, FormulaSelection};
use crate::profile::BabyProfile;

use super::data_dir;
use super::migrations;

const ACTIVE_BABY_KEY: &str = "active_baby";

// === Helper Functions ===

/// Parse an RFC3339 timestamp, falling back to the current time on a
/// malformed row.
fn parse_datetime_fallback(dt_str: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(dt_str)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

/// Parse a stored calendar date, falling back to today.
fn parse_date_fallback(date_str: &str) -> NaiveDate {
    date_str.parse().unwrap_or_else(|_| Utc::now().date_naive())
}

/// Parse a stored HH:MM wall-clock time, falling back to midnight.
fn parse_clock_fallback(time_str: &str) -> ClockTime {
    ClockTime::parse(time_str).unwrap_or(ClockTime::MIDNIGHT)
}

/// Parse a stored formula selection, falling back to age-based.
fn parse_selection_fallback(json: &str) -> FormulaSelection {
    serde_json::from_str(json).unwrap_or_default()
}

/// Build a profile from one `profiles` row.
fn row_to_profile(row: &rusqlite::Row) -> Result<BabyProfile, rusqlite::Error> {
    let birthdate: String = row.get(2)?;
    let wake: String = row.get(3)?;
    let selection: String = row.get(4)?;
    let created_at: String = row.get(5)?;

    Ok(BabyProfile {
        id: row.get(0)?,
        name: row.get(1)?,
        birthdate: parse_date_fallback(&birthdate),
        first_wake: parse_clock_fallback(&wake),
        selection: parse_selection_fallback(&selection),
        created_at: parse_datetime_fallback(&created_at),
    })
}

/// Build a formula from one `formulas` row.
fn row_to_formula(row: &rusqlite::Row) -> Result<Formula, rusqlite::Error> {
    let phases_json: String = row.get(2)?;
    let valid_date: Option<String> = row.get(3)?;
    let created_at: String = row.get(5)?;

    Ok(Formula {
        id: row.get(0)?,
        name: row.get(1)?,
        phases: serde_json::from_str(&phases_json).unwrap_or_default(),
        valid_date: valid_date.map(|d| parse_date_fallback(&d)),
        baby_id: row.get(4)?,
        created_at: parse_datetime_fallback(&created_at),
    })
}

/// SQLite database for profile and formula storage.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Get a reference to the underlying SQLite connection.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Open the database at `~/.config/easyday/easyday.db`.
    ///
    /// Creates the database file and schema if they don't exist.
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
        let db = Self { conn };
        db.migrate()
            .map_err(|e| DatabaseError::MigrationFailed(e.to_string()))?;
        Ok(db)
    }

    /// Open an in-memory database (for tests).
    pub fn open_memory() -> Result<Self, DatabaseError> {
        let conn = Connection::open_in_memory().map_err(|e| DatabaseError::OpenFailed {
            path: ":memory:".into(),
            message: e.to_string(),
        })?;
        let db = Self { conn };
        db.migrate()
            .map_err(|e| DatabaseError::MigrationFailed(e.to_string()))?;
        Ok(db)
    }

    fn migrate(&self) -> Result<(), rusqlite::Error> {
        // Create base tables (v1 schema) first
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS profiles (
                id         TEXT PRIMARY KEY,
                name       TEXT NOT NULL,
                birthdate  TEXT NOT NULL,
                wake_time  TEXT NOT NULL,
                formula_id TEXT,
                created_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS formulas (
                id         TEXT PRIMARY KEY,
                name       TEXT NOT NULL,
                phases     TEXT NOT NULL DEFAULT '[]',
                baby_id    TEXT,
                created_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS kv (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_formulas_baby_id ON formulas(baby_id);",
        )?;

        // Run incremental migrations (v1 -> v2 -> v3)
        migrations::migrate(&self.conn)?;

        Ok(())
    }

    // === Profiles ===

    /// Insert or replace a profile by id.
    pub fn save_profile(&self, profile: &BabyProfile) -> Result<(), DatabaseError> {
        let selection_json = serde_json::to_string(&profile.selection)
            .map_err(|e| DatabaseError::QueryFailed(format!("serialize selection: {e}")))?;
        self.conn.execute(
            "INSERT OR REPLACE INTO profiles (id, name, birthdate, wake_time, selection, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                profile.id,
                profile.name,
                profile.birthdate.to_string(),
                profile.first_wake.to_string(),
                selection_json,
                profile.created_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    pub fn get_profile(&self, id: &str) -> Result<Option<BabyProfile>, DatabaseError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, birthdate, wake_time, selection, created_at
             FROM profiles WHERE id = ?1",
        )?;
        let result = stmt.query_row(params![id], row_to_profile);
        match result {
            Ok(p) => Ok(Some(p)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn list_profiles(&self) -> Result<Vec<BabyProfile>, DatabaseError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, birthdate, wake_time, selection, created_at
             FROM profiles ORDER BY created_at",
        )?;
        let rows = stmt.query_map([], row_to_profile)?;
        let mut profiles = Vec::new();
        for row in rows {
            profiles.push(row?);
        }
        Ok(profiles)
    }

    /// Point the active-baby marker at a profile.
    pub fn set_active_baby(&self, id: &str) -> Result<(), DatabaseError> {
        if self.get_profile(id)?.is_none() {
            return Err(DatabaseError::NotFound(format!("profile {id}")));
        }
        self.kv_set(ACTIVE_BABY_KEY, id)
    }

    /// The currently active profile, if one is set and still exists.
    pub fn active_profile(&self) -> Result<Option<BabyProfile>, DatabaseError> {
        match self.kv_get(ACTIVE_BABY_KEY)? {
            Some(id) => self.get_profile(&id),
            None => Ok(None),
        }
    }

    // === Formulas ===

    /// Insert or replace a formula by id.
    pub fn save_formula(&self, formula: &Formula) -> Result<(), DatabaseError> {
        let phases_json = serde_json::to_string(&formula.phases)
            .map_err(|e| DatabaseError::QueryFailed(format!("serialize phases: {e}")))?;
        self.conn.execute(
            "INSERT OR REPLACE INTO formulas (id, name, phases, valid_date, baby_id, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                formula.id,
                formula.name,
                phases_json,
                formula.valid_date.map(|d| d.to_string()),
                formula.baby_id,
                formula.created_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    pub fn get_formula(&self, id: &str) -> Result<Option<Formula>, DatabaseError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, phases, valid_date, baby_id, created_at
             FROM formulas WHERE id = ?1",
        )?;
        let result = stmt.query_row(params![id], row_to_formula);
        match result {
            Ok(f) => Ok(Some(f)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Custom formulas, optionally narrowed to one baby's.
    pub fn list_formulas(&self, baby_id: Option<&str>) -> Result<Vec<Formula>, DatabaseError> {
        let mut formulas = Vec::new();
        match baby_id {
            Some(baby_id) => {
                let mut stmt = self.conn.prepare(
                    "SELECT id, name, phases, valid_date, baby_id, created_at
                     FROM formulas WHERE baby_id = ?1 OR baby_id IS NULL
                     ORDER BY created_at",
                )?;
                let rows = stmt.query_map(params![baby_id], row_to_formula)?;
                for row in rows {
                    formulas.push(row?);
                }
            }
            None => {
                let mut stmt = self.conn.prepare(
                    "SELECT id, name, phases, valid_date, baby_id, created_at
                     FROM formulas ORDER BY created_at",
                )?;
                let rows = stmt.query_map([], row_to_formula)?;
                for row in rows {
                    formulas.push(row?);
                }
            }
        }
        Ok(formulas)
    }

    /// Resolve the formula in effect for a profile on a given day.
    ///
    /// Built-in preset ids win over stored formulas; a stored formula
    /// scoped to a different day is never reused and resolution falls
    /// back to the age-based preset.
    pub fn formula_for_day(&self, profile: &BabyProfile, date: NaiveDate) -> Result<Formula, DatabaseError> {
        let by_age = || preset_by_age(profile.age_weeks(date)).to_formula();

        let Some(formula_id) = profile.selection.formula_id_for(date) else {
            return Ok(by_age());
        };
        if let Some(preset) = find_preset(formula_id) {
            return Ok(preset.to_formula());
        }
        match self.get_formula(formula_id)? {
            Some(f) if f.valid_date.is_none() || f.valid_date == Some(date) => Ok(f),
            Some(_) => {
                log::debug!("formula {formula_id} is scoped to another day; using age preset");
                Ok(by_age())
            }
            None => {
                log::debug!("formula {formula_id} not found; using age preset");
                Ok(by_age())
            }
        }
    }

    // === Key-value store ===

    /// Get a value from the kv store.
    pub fn kv_get(&self, key: &str) -> Result<Option<String>, DatabaseError> {
        let mut stmt = self.conn.prepare("SELECT value FROM kv WHERE key = ?1")?;
        let result = stmt.query_row(params![key], |row| row.get::<_, String>(0));
        match result {
            Ok(v) => Ok(Some(v)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Set a value in the kv store.
    pub fn kv_set(&self, key: &str, value: &str) -> Result<(), DatabaseError> {
        self.conn.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formula::CyclePhase;

    fn d(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn sample_profile() -> BabyProfile {
        BabyProfile::new("Mika", d("2024-01-01"), ClockTime::parse("07:00").unwrap())
    }

    #[test]
    fn save_and_fetch_profile() {
        let db = Database::open_memory().unwrap();
        let mut p = sample_profile();
        p.selection = FormulaSelection::Recurring {
            formula_id: "easy-4".to_string(),
        };
        db.save_profile(&p).unwrap();

        let loaded = db.get_profile(&p.id).unwrap().unwrap();
        assert_eq!(loaded.name, "Mika");
        assert_eq!(loaded.first_wake.to_string(), "07:00");
        assert_eq!(loaded.selection, p.selection);
    }

    #[test]
    fn active_baby_pointer() {
        let db = Database::open_memory().unwrap();
        assert!(db.active_profile().unwrap().is_none());

        let p = sample_profile();
        db.save_profile(&p).unwrap();
        db.set_active_baby(&p.id).unwrap();
        assert_eq!(db.active_profile().unwrap().unwrap().id, p.id);

        assert!(matches!(
            db.set_active_baby("missing"),
            Err(DatabaseError::NotFound(_))
        ));
    }

    #[test]
    fn save_and_fetch_formula_round_trips_phases() {
        let db = Database::open_memory().unwrap();
        let f = Formula::custom("mine", vec![CyclePhase::new(30, 90, 120)], None);
        db.save_formula(&f).unwrap();

        let loaded = db.get_formula(&f.id).unwrap().unwrap();
        assert_eq!(loaded.phases, f.phases);
        assert!(loaded.valid_date.is_none());
    }

    #[test]
    fn list_formulas_narrows_to_baby() {
        let db = Database::open_memory().unwrap();
        let shared = Formula::custom("shared", vec![CyclePhase::new(30, 60, 90)], None);
        let mine = Formula::custom(
            "mine",
            vec![CyclePhase::new(30, 60, 90)],
            Some("baby-1".to_string()),
        );
        let other = Formula::custom(
            "other",
            vec![CyclePhase::new(30, 60, 90)],
            Some("baby-2".to_string()),
        );
        db.save_formula(&shared).unwrap();
        db.save_formula(&mine).unwrap();
        db.save_formula(&other).unwrap();

        let listed = db.list_formulas(Some("baby-1")).unwrap();
        let names: Vec<_> = listed.iter().map(|f| f.name.as_str()).collect();
        assert!(names.contains(&"shared"));
        assert!(names.contains(&"mine"));
        assert!(!names.contains(&"other"));
    }

    #[test]
    fn formula_for_day_uses_age_preset_by_default() {
        let db = Database::open_memory().unwrap();
        let p = sample_profile();
        // 8 weeks old: still in the newborn band.
        let f = db.formula_for_day(&p, d("2024-03-01")).unwrap();
        assert_eq!(f.id, "easy-3");
    }

    #[test]
    fn formula_for_day_honors_day_override_then_expires_it() {
        let db = Database::open_memory().unwrap();
        let mut p = sample_profile();

        let custom = Formula::custom("today only", vec![CyclePhase::new(20, 40, 60)], Some(p.id.clone()))
            .for_day(d("2024-03-10"));
        db.save_formula(&custom).unwrap();

        p.selection = FormulaSelection::DayOverride {
            formula_id: custom.id.clone(),
            date: d("2024-03-10"),
            recurring: Some("easy-3-5".to_string()),
        };

        let on_day = db.formula_for_day(&p, d("2024-03-10")).unwrap();
        assert_eq!(on_day.id, custom.id);

        let next_day = db.formula_for_day(&p, d("2024-03-11")).unwrap();
        assert_eq!(next_day.id, "easy-3-5");
    }

    #[test]
    fn day_scoped_formula_is_never_reused_even_if_selected() {
        let db = Database::open_memory().unwrap();
        let mut p = sample_profile();

        let custom = Formula::custom("today only", vec![CyclePhase::new(20, 40, 60)], None)
            .for_day(d("2024-03-10"));
        db.save_formula(&custom).unwrap();

        // A stale selection still pointing at the day-scoped formula.
        p.selection = FormulaSelection::Recurring {
            formula_id: custom.id.clone(),
        };
        let f = db.formula_for_day(&p, d("2024-03-12")).unwrap();
        assert_eq!(f.id, "easy-3");
    }

    #[test]
    fn kv_store() {
        let db = Database::open_memory().unwrap();
        assert!(db.kv_get("test").unwrap().is_none());
        db.kv_set("test", "hello").unwrap();
        assert_eq!(db.kv_get("test").unwrap().unwrap(), "hello");
    }
}
