//! `SQLite` persistence layer.

pub mod schema;
pub mod sqlite;

pub use sqlite::SqliteStorage;
