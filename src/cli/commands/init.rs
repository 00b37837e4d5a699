use crate::config::{DB_FILENAME, TRACKER_DIR_NAME};
use crate::error::{Result, TrackerError};
use crate::storage::SqliteStorage;
use std::fs;
use std::path::Path;

/// Execute the init command.
///
/// Creates the `.tracker/` workspace, applies the schema, and optionally
/// bootstraps the first superuser (everything afterwards is role-gated, so
/// some superuser must exist before any mutation can run).
///
/// # Errors
///
/// Returns an error if the directory or database cannot be created.
pub fn execute(admin: Option<&str>, force: bool, root_dir: Option<&Path>) -> Result<()> {
    let base_dir = root_dir.unwrap_or_else(|| Path::new("."));
    let tracker_dir = base_dir.join(TRACKER_DIR_NAME);
    let db_path = tracker_dir.join(DB_FILENAME);

    if tracker_dir.exists() {
        if db_path.exists() && !force {
            return Err(TrackerError::AlreadyInitialized { path: db_path });
        }
        if db_path.exists() {
            fs::remove_file(&db_path)?;
        }
    } else {
        fs::create_dir(&tracker_dir)?;
    }

    // Initialize DB (creates file and applies schema)
    let mut storage = SqliteStorage::open(&db_path)?;

    if let Some(username) = admin {
        let user = storage.create_user(username, true, true, true)?;
        println!("Created superuser '{}' (id {})", user.username, user.id);
    }

    // Write config.yaml template
    let config_path = tracker_dir.join("config.yaml");
    if !config_path.exists() {
        let config = r"# Tracker Project Configuration
# actor: admin
# lock_timeout: 30000
";
        fs::write(config_path, config)?;
    }

    // Write .gitignore
    let gitignore_path = tracker_dir.join(".gitignore");
    if !gitignore_path.exists() {
        let gitignore = r"# Database
*.db
*.db-shm
*.db-wal
";
        fs::write(gitignore_path, gitignore)?;
    }

    println!("Initialized tracker workspace in {TRACKER_DIR_NAME}/");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_init_creates_tracker_directory() {
        let temp_dir = TempDir::new().unwrap();
        let result = execute(None, false, Some(temp_dir.path()));

        assert!(result.is_ok());
        assert!(temp_dir.path().join(".tracker").exists());
        assert!(temp_dir.path().join(".tracker/tracker.db").exists());
        assert!(temp_dir.path().join(".tracker/config.yaml").exists());
        assert!(temp_dir.path().join(".tracker/.gitignore").exists());
    }

    #[test]
    fn test_init_with_admin_creates_superuser() {
        let temp_dir = TempDir::new().unwrap();
        execute(Some("admin"), false, Some(temp_dir.path())).unwrap();

        let db_path = temp_dir.path().join(".tracker/tracker.db");
        let storage = SqliteStorage::open(&db_path).unwrap();
        let user = storage.find_user_by_username("admin").unwrap().unwrap();
        assert!(user.is_superuser);
        assert!(user.is_staff);
        assert!(user.is_active);
    }

    #[test]
    fn test_init_fails_if_already_initialized() {
        let temp_dir = TempDir::new().unwrap();

        execute(None, false, Some(temp_dir.path())).unwrap();
        let result = execute(None, false, Some(temp_dir.path()));

        assert!(matches!(
            result.unwrap_err(),
            TrackerError::AlreadyInitialized { .. }
        ));
    }

    #[test]
    fn test_init_force_overwrites_existing() {
        let temp_dir = TempDir::new().unwrap();

        execute(Some("first"), false, Some(temp_dir.path())).unwrap();
        execute(Some("second"), true, Some(temp_dir.path())).unwrap();

        let db_path = temp_dir.path().join(".tracker/tracker.db");
        let storage = SqliteStorage::open(&db_path).unwrap();
        assert!(storage.find_user_by_username("first").unwrap().is_none());
        assert!(storage.find_user_by_username("second").unwrap().is_some());
    }
}
