//! Storage CRUD tests with real `SQLite` (no mocks).
//!
//! Covers issue create/get/update/delete, reference-table admin, list
//! ordering, and constraint surfacing.

mod common;

use chrono::Duration;
use common::fixtures::{base_time, seed};
use common::{test_db, test_db_with_dir};
use tracker_rust::TrackerError;
use tracker_rust::error::ViolationKind;
use tracker_rust::storage::SqliteStorage;
use tracker_rust::validation::ResolvedIssue;

fn resolved(seed: &common::fixtures::Seed, name: &str) -> ResolvedIssue {
    ResolvedIssue {
        name: name.to_string(),
        creator_id: seed.root.id,
        responsible_person_id: seed.staff.id,
        description: format!("{name} description"),
        state_id: seed.open_state.id,
        category_id: seed.bug.id,
        created_at: base_time(),
        finished_at: None,
    }
}

// ============================================================================
// CREATE / GET
// ============================================================================

#[test]
fn create_issue_roundtrips() {
    let mut storage = test_db();
    let seed = seed(&mut storage);

    let created = storage.create_issue(&resolved(&seed, "roundtrip")).unwrap();
    assert!(created.id > 0);

    let retrieved = storage.get_issue(created.id).unwrap().expect("issue exists");
    assert_eq!(retrieved, created);
    assert_eq!(retrieved.created_at, base_time());
    assert!(retrieved.finished_at.is_none());
}

#[test]
fn create_issue_persists_finished_at() {
    let mut storage = test_db();
    let seed = seed(&mut storage);

    let mut body = resolved(&seed, "finished");
    body.state_id = seed.finished_state.id;
    body.finished_at = Some(base_time() + Duration::days(4));

    let created = storage.create_issue(&body).unwrap();
    let retrieved = storage.get_issue(created.id).unwrap().expect("issue exists");
    assert_eq!(retrieved.finished_at, Some(base_time() + Duration::days(4)));
}

#[test]
fn get_issue_returns_none_for_nonexistent() {
    let storage = test_db();
    assert!(storage.get_issue(12345).unwrap().is_none());
}

#[test]
fn create_issue_with_dangling_reference_is_constraint_violation() {
    let mut storage = test_db();
    let seed = seed(&mut storage);

    // The engine catches dangling ids first in normal flow; the store's
    // foreign keys are the last line of defense.
    let mut body = resolved(&seed, "dangling");
    body.state_id = 9999;
    let err = storage.create_issue(&body).unwrap_err();
    match err {
        TrackerError::Validation(e) => assert_eq!(e.kind, ViolationKind::ConstraintViolation),
        other => panic!("expected constraint violation, got {other:?}"),
    }
}

#[test]
fn create_issue_with_empty_name_is_constraint_violation() {
    let mut storage = test_db();
    let seed = seed(&mut storage);

    let mut body = resolved(&seed, "x");
    body.name = String::new();
    let err = storage.create_issue(&body).unwrap_err();
    assert!(matches!(err, TrackerError::Validation { .. }));
}

// ============================================================================
// UPDATE
// ============================================================================

#[test]
fn update_issue_replaces_fields() {
    let mut storage = test_db();
    let seed = seed(&mut storage);

    let created = storage.create_issue(&resolved(&seed, "before")).unwrap();

    let mut body = resolved(&seed, "after");
    body.description = "changed".to_string();
    body.state_id = seed.progress_state.id;
    let updated = storage.update_issue(created.id, &body).unwrap();

    assert_eq!(updated.id, created.id);
    assert_eq!(updated.name, "after");

    let retrieved = storage.get_issue(created.id).unwrap().expect("issue exists");
    assert_eq!(retrieved.description, "changed");
    assert_eq!(retrieved.state_id, seed.progress_state.id);
}

#[test]
fn update_nonexistent_issue_fails() {
    let mut storage = test_db();
    let seed = seed(&mut storage);

    let err = storage.update_issue(999, &resolved(&seed, "ghost")).unwrap_err();
    assert!(matches!(err, TrackerError::RecordNotFound { .. }));
}

#[test]
fn update_issue_can_clear_finished_at() {
    let mut storage = test_db();
    let seed = seed(&mut storage);

    let mut body = resolved(&seed, "clearable");
    body.state_id = seed.finished_state.id;
    body.finished_at = Some(base_time() + Duration::hours(2));
    let created = storage.create_issue(&body).unwrap();

    body.state_id = seed.open_state.id;
    body.finished_at = None;
    storage.update_issue(created.id, &body).unwrap();

    let retrieved = storage.get_issue(created.id).unwrap().expect("issue exists");
    assert!(retrieved.finished_at.is_none());
}

// ============================================================================
// DELETE
// ============================================================================

#[test]
fn delete_issue_removes_row() {
    let mut storage = test_db();
    let seed = seed(&mut storage);

    let created = storage.create_issue(&resolved(&seed, "doomed")).unwrap();
    storage.delete_issue(created.id).unwrap();

    assert!(storage.get_issue(created.id).unwrap().is_none());
    assert_eq!(storage.count_issues().unwrap(), 0);
}

#[test]
fn delete_nonexistent_issue_fails() {
    let mut storage = test_db();

    let err = storage.delete_issue(999).unwrap_err();
    assert!(matches!(err, TrackerError::RecordNotFound { .. }));
}

// ============================================================================
// LIST ORDERING
// ============================================================================

#[test]
fn list_issues_orders_by_created_desc_then_name_then_state() {
    let mut storage = test_db();
    let seed = seed(&mut storage);

    let mut older = resolved(&seed, "older");
    older.created_at = base_time() - Duration::days(1);
    let mut newer_b = resolved(&seed, "bravo");
    newer_b.created_at = base_time();
    let mut newer_a = resolved(&seed, "alpha");
    newer_a.created_at = base_time();
    // Same timestamp and name: state id breaks the tie.
    let mut newer_a2 = resolved(&seed, "alpha");
    newer_a2.created_at = base_time();
    newer_a2.state_id = seed.progress_state.id;

    storage.create_issue(&older).unwrap();
    storage.create_issue(&newer_a2).unwrap();
    storage.create_issue(&newer_b).unwrap();
    storage.create_issue(&newer_a).unwrap();

    let listed = storage.list_issues().unwrap();
    let keys: Vec<(String, i64)> = listed
        .iter()
        .map(|i| (i.name.clone(), i.state_id))
        .collect();

    assert_eq!(
        keys,
        vec![
            ("alpha".to_string(), seed.open_state.id),
            ("alpha".to_string(), seed.progress_state.id),
            ("bravo".to_string(), seed.open_state.id),
            ("older".to_string(), seed.open_state.id),
        ]
    );
}

// ============================================================================
// REFERENCE TABLES
// ============================================================================

#[test]
fn duplicate_state_name_rejected() {
    let mut storage = test_db();
    storage.create_state("New", false).unwrap();

    let err = storage.create_state("New", true).unwrap_err();
    match err {
        TrackerError::Validation(e) => assert_eq!(e.kind, ViolationKind::ConstraintViolation),
        other => panic!("expected constraint violation, got {other:?}"),
    }
}

#[test]
fn duplicate_category_name_rejected() {
    let mut storage = test_db();
    storage.create_category("Bug").unwrap();
    assert!(storage.create_category("Bug").is_err());
}

#[test]
fn rename_state_to_existing_name_rejected() {
    let mut storage = test_db();
    let a = storage.create_state("In progress", false).unwrap();
    storage.create_state("Finished", true).unwrap();

    let err = storage.rename_state(a.id, "Finished").unwrap_err();
    assert!(matches!(err, TrackerError::Validation { .. }));
}

#[test]
fn rename_state_updates_name() {
    let mut storage = test_db();
    let state = storage.create_state("New", false).unwrap();

    let renamed = storage.rename_state(state.id, "Nove").unwrap();
    assert_eq!(renamed.name, "Nove");
    assert_eq!(
        storage.get_state(state.id).unwrap().unwrap().name,
        "Nove"
    );
}

#[test]
fn delete_referenced_state_rejected() {
    let mut storage = test_db();
    let seed = seed(&mut storage);
    storage.create_issue(&resolved(&seed, "holder")).unwrap();

    let err = storage.delete_state(seed.open_state.id).unwrap_err();
    match err {
        TrackerError::Validation(e) => assert_eq!(e.kind, ViolationKind::ConstraintViolation),
        other => panic!("expected constraint violation, got {other:?}"),
    }

    // Still present after the rejected delete.
    assert!(storage.get_state(seed.open_state.id).unwrap().is_some());
}

#[test]
fn delete_unreferenced_state_succeeds() {
    let mut storage = test_db();
    let state = storage.create_state("Temporary", false).unwrap();

    storage.delete_state(state.id).unwrap();
    assert!(storage.get_state(state.id).unwrap().is_none());
}

#[test]
fn delete_referenced_category_rejected() {
    let mut storage = test_db();
    let seed = seed(&mut storage);
    storage.create_issue(&resolved(&seed, "holder")).unwrap();

    assert!(storage.delete_category(seed.bug.id).is_err());
}

#[test]
fn list_states_ordered_by_id() {
    let mut storage = test_db();
    let seed = seed(&mut storage);

    let listed = storage.list_states().unwrap();
    let ids: Vec<i64> = listed.iter().map(|s| s.id).collect();
    assert_eq!(
        ids,
        vec![
            seed.open_state.id,
            seed.progress_state.id,
            seed.finished_state.id
        ]
    );
}

#[test]
fn list_categories_ordered_by_name() {
    let mut storage = test_db();
    storage.create_category("Fix").unwrap();
    storage.create_category("Bug").unwrap();
    storage.create_category("Docs").unwrap();

    let names: Vec<String> = storage
        .list_categories()
        .unwrap()
        .iter()
        .map(|c| c.name.clone())
        .collect();
    assert_eq!(names, vec!["Bug", "Docs", "Fix"]);
}

#[test]
fn duplicate_username_rejected() {
    let mut storage = test_db();
    storage.create_user("alice", false, true, true).unwrap();
    assert!(storage.create_user("alice", true, false, true).is_err());
}

#[test]
fn find_user_by_username_roundtrips_flags() {
    let mut storage = test_db();
    storage.create_user("probe", true, false, false).unwrap();

    let user = storage.find_user_by_username("probe").unwrap().unwrap();
    assert!(user.is_superuser);
    assert!(!user.is_staff);
    assert!(!user.is_active);
}

// ============================================================================
// PERSISTENCE
// ============================================================================

#[test]
fn data_persists_across_connections() {
    let (mut storage, dir) = test_db_with_dir();
    let db_path = dir.path().join(".tracker").join("tracker.db");
    let seed = seed(&mut storage);
    let created = storage.create_issue(&resolved(&seed, "durable")).unwrap();
    drop(storage);

    let storage2 = SqliteStorage::open(&db_path).unwrap();
    let retrieved = storage2
        .get_issue(created.id)
        .unwrap()
        .expect("issue exists");
    assert_eq!(retrieved.name, "durable");
    assert_eq!(retrieved.created_at, base_time());
}
