//! Database schema definitions.

use rusqlite::{Connection, Result};

/// The complete SQL schema for the tracker database.
///
/// Uniqueness and non-empty rules live here so that races on duplicate
/// names resolve inside `SQLite`; foreign keys are protective (referenced
/// rows cannot be deleted while issues point at them).
pub const SCHEMA_SQL: &str = r"
    -- Referenced identities
    CREATE TABLE IF NOT EXISTS users (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        username TEXT NOT NULL UNIQUE,
        is_superuser INTEGER NOT NULL DEFAULT 0,
        is_staff INTEGER NOT NULL DEFAULT 0,
        is_active INTEGER NOT NULL DEFAULT 1,
        CHECK (length(username) >= 1 AND length(username) <= 150)
    );

    -- Lifecycle states
    CREATE TABLE IF NOT EXISTS states (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL UNIQUE,
        marks_finished INTEGER NOT NULL DEFAULT 0,
        CHECK (length(name) >= 1 AND length(name) <= 50)
    );

    -- Classification tags
    CREATE TABLE IF NOT EXISTS categories (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL UNIQUE,
        CHECK (length(name) >= 1 AND length(name) <= 50)
    );

    -- Issues
    CREATE TABLE IF NOT EXISTS issues (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        creator_id INTEGER NOT NULL REFERENCES users(id),
        responsible_person_id INTEGER NOT NULL REFERENCES users(id),
        description TEXT NOT NULL,
        state_id INTEGER NOT NULL REFERENCES states(id),
        category_id INTEGER NOT NULL REFERENCES categories(id),
        created_at TEXT NOT NULL,
        finished_at TEXT,
        CHECK (length(name) >= 1 AND length(name) <= 50),
        CHECK (length(description) >= 1)
    );

    CREATE INDEX IF NOT EXISTS idx_issues_created_at ON issues(created_at);
    CREATE INDEX IF NOT EXISTS idx_issues_state_id ON issues(state_id);
    CREATE INDEX IF NOT EXISTS idx_issues_category_id ON issues(category_id);
";

/// Apply the schema to the database.
///
/// This uses `execute_batch` to run the entire DDL script.
/// It is idempotent because all statements use `IF NOT EXISTS`.
///
/// # Errors
///
/// Returns an error if the SQL execution fails or pragmas cannot be set.
pub fn apply_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA_SQL)?;

    // Set journal mode to WAL for concurrency
    conn.pragma_update(None, "journal_mode", "WAL")?;

    // Enable foreign keys (protective deletes on referenced rows)
    conn.pragma_update(None, "foreign_keys", "ON")?;

    Ok(())
}
