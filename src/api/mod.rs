//! Request handlers.
//!
//! One function per logical operation, framework-agnostic: the gate
//! authorizes, the validation engine resolves, the repository persists.
//! Authorization runs before anything else; for targeted operations a
//! missing record still wins over validation failures.

use crate::auth::{Operation, authorize};
use crate::error::{Result, TrackerError};
use crate::model::{Category, Issue, State, User};
use crate::storage::SqliteStorage;
use crate::validation::{IssuePayload, IssueValidator};
use tracing::info;

/// List issues ordered by `created_at` descending, then name, then state.
///
/// # Errors
///
/// Returns `Forbidden` for identities without read privilege.
pub fn list_issues(storage: &SqliteStorage, actor: &User) -> Result<Vec<Issue>> {
    authorize(actor, Operation::ListIssues)?;
    storage.list_issues()
}

/// Get a single issue.
///
/// # Errors
///
/// Returns `Forbidden` without read privilege, `RecordNotFound` if absent.
pub fn get_issue(storage: &SqliteStorage, actor: &User, id: i64) -> Result<Issue> {
    authorize(actor, Operation::GetIssue)?;
    storage
        .get_issue(id)?
        .ok_or_else(|| TrackerError::issue_not_found(id))
}

/// Create an issue from a full payload.
///
/// # Errors
///
/// Returns `Forbidden` for non-superusers, aggregated validation errors for
/// an inconsistent payload.
pub fn create_issue(
    storage: &mut SqliteStorage,
    actor: &User,
    payload: &IssuePayload,
) -> Result<Issue> {
    authorize(actor, Operation::CreateIssue)?;
    let resolved = IssueValidator::resolve(payload, None, storage)?;
    let issue = storage.create_issue(&resolved)?;
    info!(actor = %actor.username, issue = issue.id, "issue created");
    Ok(issue)
}

/// Update an issue from a partial or full payload.
///
/// Absent fields keep their persisted values; validation runs on the merged
/// view.
///
/// # Errors
///
/// Returns `Forbidden` for non-superusers, `RecordNotFound` if the id is
/// absent, aggregated validation errors otherwise.
pub fn update_issue(
    storage: &mut SqliteStorage,
    actor: &User,
    id: i64,
    payload: &IssuePayload,
) -> Result<Issue> {
    authorize(actor, Operation::UpdateIssue)?;
    let existing = storage
        .get_issue(id)?
        .ok_or_else(|| TrackerError::issue_not_found(id))?;
    let resolved = IssueValidator::resolve(payload, Some(&existing), storage)?;
    let issue = storage.update_issue(id, &resolved)?;
    info!(actor = %actor.username, issue = id, "issue updated");
    Ok(issue)
}

/// Delete an issue.
///
/// # Errors
///
/// Returns `Forbidden` for non-superusers, `RecordNotFound` if absent.
pub fn delete_issue(storage: &mut SqliteStorage, actor: &User, id: i64) -> Result<()> {
    authorize(actor, Operation::DeleteIssue)?;
    storage.delete_issue(id)?;
    info!(actor = %actor.username, issue = id, "issue deleted");
    Ok(())
}

/// List users.
///
/// # Errors
///
/// Returns `Forbidden` for identities without read privilege.
pub fn list_users(storage: &SqliteStorage, actor: &User) -> Result<Vec<User>> {
    authorize(actor, Operation::ListUsers)?;
    storage.list_users()
}

/// List states in id order.
///
/// # Errors
///
/// Returns `Forbidden` for identities without read privilege.
pub fn list_states(storage: &SqliteStorage, actor: &User) -> Result<Vec<State>> {
    authorize(actor, Operation::ListStates)?;
    storage.list_states()
}

/// List categories in name order.
///
/// # Errors
///
/// Returns `Forbidden` for identities without read privilege.
pub fn list_categories(storage: &SqliteStorage, actor: &User) -> Result<Vec<Category>> {
    authorize(actor, Operation::ListCategories)?;
    storage.list_categories()
}

/// Create a user record (administrator operation).
///
/// # Errors
///
/// Returns `Forbidden` for non-superusers, constraint failures on duplicate
/// usernames.
pub fn create_user(
    storage: &mut SqliteStorage,
    actor: &User,
    username: &str,
    is_superuser: bool,
    is_staff: bool,
    is_active: bool,
) -> Result<User> {
    authorize(actor, Operation::ManageUsers)?;
    let user = storage.create_user(username, is_superuser, is_staff, is_active)?;
    info!(actor = %actor.username, user = %user.username, "user created");
    Ok(user)
}

/// Create a state (administrator operation).
///
/// # Errors
///
/// Returns `Forbidden` for non-superusers, constraint failures on duplicate
/// names.
pub fn create_state(
    storage: &mut SqliteStorage,
    actor: &User,
    name: &str,
    marks_finished: bool,
) -> Result<State> {
    authorize(actor, Operation::ManageStates)?;
    storage.create_state(name, marks_finished)
}

/// Rename a state (administrator operation).
///
/// # Errors
///
/// Returns `Forbidden` for non-superusers, `RecordNotFound` if absent,
/// constraint failures on duplicate names.
pub fn rename_state(
    storage: &mut SqliteStorage,
    actor: &User,
    id: i64,
    name: &str,
) -> Result<State> {
    authorize(actor, Operation::ManageStates)?;
    storage.rename_state(id, name)
}

/// Delete a state (administrator operation); rejected while referenced.
///
/// # Errors
///
/// Returns `Forbidden` for non-superusers, `RecordNotFound` if absent,
/// a constraint failure while issues reference it.
pub fn delete_state(storage: &mut SqliteStorage, actor: &User, id: i64) -> Result<()> {
    authorize(actor, Operation::ManageStates)?;
    storage.delete_state(id)
}

/// Create a category (administrator operation).
///
/// # Errors
///
/// Returns `Forbidden` for non-superusers, constraint failures on duplicate
/// names.
pub fn create_category(storage: &mut SqliteStorage, actor: &User, name: &str) -> Result<Category> {
    authorize(actor, Operation::ManageCategories)?;
    storage.create_category(name)
}

/// Rename a category (administrator operation).
///
/// # Errors
///
/// Returns `Forbidden` for non-superusers, `RecordNotFound` if absent,
/// constraint failures on duplicate names.
pub fn rename_category(
    storage: &mut SqliteStorage,
    actor: &User,
    id: i64,
    name: &str,
) -> Result<Category> {
    authorize(actor, Operation::ManageCategories)?;
    storage.rename_category(id, name)
}

/// Delete a category (administrator operation); rejected while referenced.
///
/// # Errors
///
/// Returns `Forbidden` for non-superusers, `RecordNotFound` if absent,
/// a constraint failure while issues reference it.
pub fn delete_category(storage: &mut SqliteStorage, actor: &User, id: i64) -> Result<()> {
    authorize(actor, Operation::ManageCategories)?;
    storage.delete_category(id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::SqliteStorage;

    fn seeded() -> (SqliteStorage, User, User) {
        let mut storage = SqliteStorage::open_memory().unwrap();
        let root = storage.create_user("root", true, true, true).unwrap();
        let staff = storage.create_user("reader", false, true, true).unwrap();
        storage.create_state("New", false).unwrap();
        storage.create_category("Bug").unwrap();
        (storage, root, staff)
    }

    #[test]
    fn staff_cannot_create_issue() {
        let (mut storage, _root, staff) = seeded();
        let err = create_issue(&mut storage, &staff, &IssuePayload::default()).unwrap_err();
        assert!(matches!(err, TrackerError::Forbidden { .. }));
    }

    #[test]
    fn not_found_wins_over_validation_on_update() {
        let (mut storage, root, _staff) = seeded();
        let payload = IssuePayload {
            creator_id: Some(-1),
            ..Default::default()
        };
        let err = update_issue(&mut storage, &root, 999, &payload).unwrap_err();
        assert!(matches!(err, TrackerError::RecordNotFound { .. }));
    }

    #[test]
    fn forbidden_short_circuits_before_validation() {
        let (mut storage, _root, staff) = seeded();
        // Payload full of dangling references still reports Forbidden.
        let payload = IssuePayload {
            creator_id: Some(-1),
            state_id: Some(-1),
            ..Default::default()
        };
        let err = create_issue(&mut storage, &staff, &payload).unwrap_err();
        assert!(matches!(err, TrackerError::Forbidden { .. }));
    }
}
