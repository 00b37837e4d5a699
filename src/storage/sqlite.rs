//! `SQLite` storage implementation.
//!
//! Constraint failures (uniqueness, non-empty CHECKs, protective foreign
//! keys) surface as typed validation failures rather than raw database
//! errors, so callers can fold them into the aggregated error report.

use crate::error::{Result, TrackerError, ValidationError};
use crate::model::{Category, Issue, State, User};
use crate::validation::{ReferenceResolver, ResolvedIssue};
use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use rusqlite::{Connection, OptionalExtension, Transaction, TransactionBehavior};
use std::path::Path;
use std::time::Duration;
use tracing::debug;

/// SQLite-based storage backend.
#[derive(Debug)]
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Open a new connection to the database at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be established or schema
    /// application fails.
    pub fn open(path: &Path) -> Result<Self> {
        Self::open_with_timeout(path, None)
    }

    /// Open a new connection with an optional busy timeout (ms).
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be established or schema
    /// application fails.
    pub fn open_with_timeout(path: &Path, lock_timeout_ms: Option<u64>) -> Result<Self> {
        let conn = Connection::open(path)?;
        if let Some(timeout) = lock_timeout_ms {
            conn.busy_timeout(Duration::from_millis(timeout))?;
        }
        super::schema::apply_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Open an in-memory database for testing.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be established.
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        super::schema::apply_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Execute a mutation inside an immediate transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if any step fails; the transaction is rolled back.
    pub fn mutate<F, R>(&mut self, op: &str, f: F) -> Result<R>
    where
        F: FnOnce(&Transaction) -> Result<R>,
    {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        let result = f(&tx)?;
        tx.commit()?;
        debug!(op, "mutation committed");
        Ok(result)
    }

    // === Users ===

    /// Create a user record.
    ///
    /// # Errors
    ///
    /// Returns a constraint validation failure on duplicate or empty
    /// usernames.
    pub fn create_user(
        &mut self,
        username: &str,
        is_superuser: bool,
        is_staff: bool,
        is_active: bool,
    ) -> Result<User> {
        self.mutate("create_user", |tx| {
            tx.execute(
                "INSERT INTO users (username, is_superuser, is_staff, is_active)
                 VALUES (?, ?, ?, ?)",
                rusqlite::params![
                    username,
                    i32::from(is_superuser),
                    i32::from(is_staff),
                    i32::from(is_active)
                ],
            )
            .map_err(map_constraint_err)?;

            Ok(User {
                id: tx.last_insert_rowid(),
                username: username.to_string(),
                is_superuser,
                is_staff,
                is_active,
            })
        })
    }

    /// Get a user by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn get_user(&self, id: i64) -> Result<Option<User>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, username, is_superuser, is_staff, is_active FROM users WHERE id = ?",
        )?;
        Ok(stmt.query_row([id], user_from_row).optional()?)
    }

    /// Find a user by username.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn find_user_by_username(&self, username: &str) -> Result<Option<User>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, username, is_superuser, is_staff, is_active FROM users WHERE username = ?",
        )?;
        Ok(stmt.query_row([username], user_from_row).optional()?)
    }

    /// List all users in id order.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn list_users(&self) -> Result<Vec<User>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, username, is_superuser, is_staff, is_active FROM users ORDER BY id",
        )?;
        let users = stmt
            .query_map([], user_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(users)
    }

    // === States ===

    /// Create a state record.
    ///
    /// # Errors
    ///
    /// Returns a constraint validation failure on duplicate or empty names.
    pub fn create_state(&mut self, name: &str, marks_finished: bool) -> Result<State> {
        self.mutate("create_state", |tx| {
            tx.execute(
                "INSERT INTO states (name, marks_finished) VALUES (?, ?)",
                rusqlite::params![name, i32::from(marks_finished)],
            )
            .map_err(map_constraint_err)?;

            Ok(State {
                id: tx.last_insert_rowid(),
                name: name.to_string(),
                marks_finished,
            })
        })
    }

    /// Rename a state.
    ///
    /// # Errors
    ///
    /// Returns `RecordNotFound` if absent, or a constraint validation
    /// failure on a duplicate name.
    pub fn rename_state(&mut self, id: i64, name: &str) -> Result<State> {
        self.mutate("rename_state", |tx| {
            let changed = tx
                .execute(
                    "UPDATE states SET name = ? WHERE id = ?",
                    rusqlite::params![name, id],
                )
                .map_err(map_constraint_err)?;
            if changed == 0 {
                return Err(TrackerError::RecordNotFound { entity: "State", id });
            }
            state_in_tx(tx, id)
        })
    }

    /// Delete a state.
    ///
    /// The store's protective foreign keys reject the delete while issues
    /// reference it; that surfaces as a constraint validation failure.
    ///
    /// # Errors
    ///
    /// Returns `RecordNotFound` if absent or a constraint failure if
    /// referenced.
    pub fn delete_state(&mut self, id: i64) -> Result<()> {
        self.mutate("delete_state", |tx| {
            let changed = tx
                .execute("DELETE FROM states WHERE id = ?", [id])
                .map_err(map_constraint_err)?;
            if changed == 0 {
                return Err(TrackerError::RecordNotFound { entity: "State", id });
            }
            Ok(())
        })
    }

    /// Get a state by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn get_state(&self, id: i64) -> Result<Option<State>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name, marks_finished FROM states WHERE id = ?")?;
        Ok(stmt.query_row([id], state_from_row).optional()?)
    }

    /// List all states in id order.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn list_states(&self) -> Result<Vec<State>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name, marks_finished FROM states ORDER BY id")?;
        let states = stmt
            .query_map([], state_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(states)
    }

    // === Categories ===

    /// Create a category record.
    ///
    /// # Errors
    ///
    /// Returns a constraint validation failure on duplicate or empty names.
    pub fn create_category(&mut self, name: &str) -> Result<Category> {
        self.mutate("create_category", |tx| {
            tx.execute("INSERT INTO categories (name) VALUES (?)", [name])
                .map_err(map_constraint_err)?;

            Ok(Category {
                id: tx.last_insert_rowid(),
                name: name.to_string(),
            })
        })
    }

    /// Rename a category.
    ///
    /// # Errors
    ///
    /// Returns `RecordNotFound` if absent, or a constraint validation
    /// failure on a duplicate name.
    pub fn rename_category(&mut self, id: i64, name: &str) -> Result<Category> {
        self.mutate("rename_category", |tx| {
            let changed = tx
                .execute(
                    "UPDATE categories SET name = ? WHERE id = ?",
                    rusqlite::params![name, id],
                )
                .map_err(map_constraint_err)?;
            if changed == 0 {
                return Err(TrackerError::RecordNotFound {
                    entity: "Category",
                    id,
                });
            }
            tx.query_row(
                "SELECT id, name FROM categories WHERE id = ?",
                [id],
                category_from_row,
            )
            .map_err(TrackerError::from)
        })
    }

    /// Delete a category; rejected while issues reference it.
    ///
    /// # Errors
    ///
    /// Returns `RecordNotFound` if absent or a constraint failure if
    /// referenced.
    pub fn delete_category(&mut self, id: i64) -> Result<()> {
        self.mutate("delete_category", |tx| {
            let changed = tx
                .execute("DELETE FROM categories WHERE id = ?", [id])
                .map_err(map_constraint_err)?;
            if changed == 0 {
                return Err(TrackerError::RecordNotFound {
                    entity: "Category",
                    id,
                });
            }
            Ok(())
        })
    }

    /// Get a category by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn get_category(&self, id: i64) -> Result<Option<Category>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name FROM categories WHERE id = ?")?;
        Ok(stmt.query_row([id], category_from_row).optional()?)
    }

    /// List all categories in name order.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn list_categories(&self) -> Result<Vec<Category>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name FROM categories ORDER BY name")?;
        let categories = stmt
            .query_map([], category_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(categories)
    }

    // === Issues ===

    /// Create a new issue from a resolved body.
    ///
    /// # Errors
    ///
    /// Returns a constraint validation failure on schema violations.
    pub fn create_issue(&mut self, body: &ResolvedIssue) -> Result<Issue> {
        self.mutate("create_issue", |tx| {
            tx.execute(
                "INSERT INTO issues (
                    name, creator_id, responsible_person_id, description,
                    state_id, category_id, created_at, finished_at
                ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
                rusqlite::params![
                    body.name,
                    body.creator_id,
                    body.responsible_person_id,
                    body.description,
                    body.state_id,
                    body.category_id,
                    body.created_at.to_rfc3339(),
                    body.finished_at.map(|dt| dt.to_rfc3339()),
                ],
            )
            .map_err(map_constraint_err)?;

            Ok(issue_from_body(tx.last_insert_rowid(), body))
        })
    }

    /// Replace an issue's fields with a resolved body.
    ///
    /// # Errors
    ///
    /// Returns `RecordNotFound` if the issue doesn't exist, or a constraint
    /// validation failure on schema violations.
    pub fn update_issue(&mut self, id: i64, body: &ResolvedIssue) -> Result<Issue> {
        self.mutate("update_issue", |tx| {
            let changed = tx
                .execute(
                    "UPDATE issues SET
                        name = ?, creator_id = ?, responsible_person_id = ?,
                        description = ?, state_id = ?, category_id = ?,
                        created_at = ?, finished_at = ?
                     WHERE id = ?",
                    rusqlite::params![
                        body.name,
                        body.creator_id,
                        body.responsible_person_id,
                        body.description,
                        body.state_id,
                        body.category_id,
                        body.created_at.to_rfc3339(),
                        body.finished_at.map(|dt| dt.to_rfc3339()),
                        id,
                    ],
                )
                .map_err(map_constraint_err)?;
            if changed == 0 {
                return Err(TrackerError::issue_not_found(id));
            }
            Ok(issue_from_body(id, body))
        })
    }

    /// Get an issue by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn get_issue(&self, id: i64) -> Result<Option<Issue>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, creator_id, responsible_person_id, description,
                    state_id, category_id, created_at, finished_at
             FROM issues WHERE id = ?",
        )?;
        Ok(stmt.query_row([id], issue_from_row).optional()?)
    }

    /// List issues ordered by `created_at` descending, then name, then state.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn list_issues(&self) -> Result<Vec<Issue>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, creator_id, responsible_person_id, description,
                    state_id, category_id, created_at, finished_at
             FROM issues
             ORDER BY created_at DESC, name, state_id",
        )?;
        let issues = stmt
            .query_map([], issue_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(issues)
    }

    /// Delete an issue.
    ///
    /// # Errors
    ///
    /// Returns `RecordNotFound` if the issue doesn't exist.
    pub fn delete_issue(&mut self, id: i64) -> Result<()> {
        self.mutate("delete_issue", |tx| {
            let changed = tx.execute("DELETE FROM issues WHERE id = ?", [id])?;
            if changed == 0 {
                return Err(TrackerError::issue_not_found(id));
            }
            Ok(())
        })
    }

    /// Count issues.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn count_issues(&self) -> Result<i64> {
        let count = self
            .conn
            .query_row("SELECT COUNT(*) FROM issues", [], |row| row.get(0))?;
        Ok(count)
    }
}

impl ReferenceResolver for SqliteStorage {
    fn user(&self, id: i64) -> Result<Option<User>> {
        self.get_user(id)
    }

    fn state(&self, id: i64) -> Result<Option<State>> {
        self.get_state(id)
    }

    fn category(&self, id: i64) -> Result<Option<Category>> {
        self.get_category(id)
    }
}

/// Map `SQLite` constraint failures to typed validation failures.
fn map_constraint_err(err: rusqlite::Error) -> TrackerError {
    if let rusqlite::Error::SqliteFailure(ref e, ref msg) = err {
        if e.code == rusqlite::ErrorCode::ConstraintViolation {
            let message = msg
                .clone()
                .unwrap_or_else(|| "constraint failed".to_string());
            let field = constraint_field(&message);
            return TrackerError::Validation(ValidationError::constraint(field, message));
        }
    }
    TrackerError::Database(err)
}

/// Best-effort field name from an `SQLite` constraint message like
/// `UNIQUE constraint failed: states.name`.
fn constraint_field(message: &str) -> String {
    if message.contains("FOREIGN KEY") {
        return "id".to_string();
    }
    message
        .rsplit_once(": ")
        .map(|(_, columns)| columns.split(',').next().unwrap_or(columns))
        .map(|column| {
            column
                .rsplit('.')
                .next()
                .unwrap_or(column)
                .trim()
                .to_string()
        })
        .unwrap_or_else(|| "record".to_string())
}

fn issue_from_body(id: i64, body: &ResolvedIssue) -> Issue {
    Issue {
        id,
        name: body.name.clone(),
        creator_id: body.creator_id,
        responsible_person_id: body.responsible_person_id,
        description: body.description.clone(),
        state_id: body.state_id,
        category_id: body.category_id,
        created_at: body.created_at,
        finished_at: body.finished_at,
    }
}

fn user_from_row(row: &rusqlite::Row) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        username: row.get(1)?,
        is_superuser: row.get::<_, i32>(2)? != 0,
        is_staff: row.get::<_, i32>(3)? != 0,
        is_active: row.get::<_, i32>(4)? != 0,
    })
}

fn state_from_row(row: &rusqlite::Row) -> rusqlite::Result<State> {
    Ok(State {
        id: row.get(0)?,
        name: row.get(1)?,
        marks_finished: row.get::<_, i32>(2)? != 0,
    })
}

fn category_from_row(row: &rusqlite::Row) -> rusqlite::Result<Category> {
    Ok(Category {
        id: row.get(0)?,
        name: row.get(1)?,
    })
}

fn issue_from_row(row: &rusqlite::Row) -> rusqlite::Result<Issue> {
    Ok(Issue {
        id: row.get(0)?,
        name: row.get(1)?,
        creator_id: row.get(2)?,
        responsible_person_id: row.get(3)?,
        description: row.get(4)?,
        state_id: row.get(5)?,
        category_id: row.get(6)?,
        created_at: parse_datetime(&row.get::<_, String>(7)?),
        finished_at: row
            .get::<_, Option<String>>(8)?
            .as_deref()
            .map(parse_datetime),
    })
}

fn state_in_tx(tx: &Transaction, id: i64) -> Result<State> {
    tx.query_row(
        "SELECT id, name, marks_finished FROM states WHERE id = ?",
        [id],
        state_from_row,
    )
    .map_err(TrackerError::from)
}

fn parse_datetime(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|_| {
            NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
                .map(|naive| Utc.from_utc_datetime(&naive))
        })
        .unwrap_or_else(|_| Utc.timestamp_opt(0, 0).unwrap())
}
