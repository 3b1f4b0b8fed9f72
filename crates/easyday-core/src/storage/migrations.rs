//! Database schema migrations for easyday.
//!
//! Migrations are versioned and applied automatically when opening the database.
//! The `schema_version` table tracks the current migration version.

use rusqlite::{Connection, Result as SqliteResult};

/// Apply all pending migrations to bring the database to the current schema version.
///
/// # Errors
/// Returns an error if migration fails.
pub fn migrate(conn: &Connection) -> SqliteResult<()> {
    // Ensure schema_version table exists
    create_schema_version_table(conn)?;

    // Get current version
    let current_version = get_schema_version(conn);

    // Apply migrations sequentially
    if current_version < 1 {
        migrate_v1(conn)?;
    }
    if current_version < 2 {
        migrate_v2(conn)?;
    }
    if current_version < 3 {
        migrate_v3(conn)?;
    }

    Ok(())
}

/// Create the schema_version table if it doesn't exist.
fn create_schema_version_table(conn: &Connection) -> SqliteResult<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY
        );",
    )
}

/// Get the current schema version from the database.
///
/// Returns 0 if no version is set (initial database).
fn get_schema_version(conn: &Connection) -> i32 {
    conn.query_row("SELECT version FROM schema_version", [], |row| row.get::<_, i32>(0))
        .unwrap_or_else(|e| {
            if matches!(e, rusqlite::Error::QueryReturnedNoRows) {
                0
            } else {
                eprintln!("Warning: failed to read schema_version: {}", e);
                0
            }
        })
}

/// Set the schema version in the database.
fn set_schema_version(conn: &Connection, version: i32) -> SqliteResult<()> {
    conn.execute("DELETE FROM schema_version", [])?;
    conn.execute("INSERT INTO schema_version (version) VALUES (?1)", [version])?;
    Ok(())
}

/// Migration v1: Initial schema (baseline).
///
/// The original tables (profiles with a nullable `formula_id`, formulas,
/// kv) are created by Database::migrate() directly; this only marks them.
fn migrate_v1(conn: &Connection) -> SqliteResult<()> {
    set_schema_version(conn, 1)?;
    Ok(())
}

/// Migration v2: Day-scoped custom formulas.
///
/// Adds `valid_date` to formulas. A formula with a date applies on that
/// day only and is skipped by resolution on any other day.
fn migrate_v2(conn: &Connection) -> SqliteResult<()> {
    let tx = conn.unchecked_transaction()?;

    tx.execute_batch("ALTER TABLE formulas ADD COLUMN valid_date TEXT;")?;

    tx.execute("DELETE FROM schema_version", [])?;
    tx.execute("INSERT INTO schema_version (version) VALUES (?1)", [2])?;

    tx.commit()?;
    Ok(())
}

/// Migration v3: Formula selection as a tagged value.
///
/// Adds `selection` to profiles and backfills it from the legacy
/// `formula_id` column: a non-null id becomes a recurring selection,
/// null becomes age-based. The legacy column stays in place unused.
fn migrate_v3(conn: &Connection) -> SqliteResult<()> {
    let tx = conn.unchecked_transaction()?;

    tx.execute_batch("ALTER TABLE profiles ADD COLUMN selection TEXT NOT NULL DEFAULT '';")?;

    let legacy: Vec<(String, Option<String>)> = {
        let mut stmt = tx.prepare("SELECT id, formula_id FROM profiles")?;
        let rows = stmt.query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        out
    };

    for (id, formula_id) in legacy {
        let selection = match formula_id {
            Some(fid) => serde_json::json!({ "mode": "recurring", "formula_id": fid }).to_string(),
            None => serde_json::json!({ "mode": "by_age" }).to_string(),
        };
        tx.execute(
            "UPDATE profiles SET selection = ?1 WHERE id = ?2",
            rusqlite::params![selection, id],
        )?;
    }

    tx.execute("DELETE FROM schema_version", [])?;
    tx.execute("INSERT INTO schema_version (version) VALUES (?1)", [3])?;

    tx.commit()?;
    Ok(())
}
