#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use tracker_rust::model::{Category, State, User};
use tracker_rust::storage::SqliteStorage;
use tracker_rust::validation::IssuePayload;

/// Base time for test fixtures, safely in the past so synthesized
/// `finished_at` values always land after it.
pub fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2021, 9, 1, 12, 0, 0).unwrap()
}

/// Reference data seeded into every integration test database.
pub struct Seed {
    pub root: User,
    pub second_root: User,
    pub staff: User,
    pub nobody: User,
    pub inactive: User,
    pub open_state: State,
    pub progress_state: State,
    pub finished_state: State,
    pub bug: Category,
    pub docs: Category,
}

/// Seed users, states, and categories matching the canonical scenario set.
pub fn seed(storage: &mut SqliteStorage) -> Seed {
    let root = storage
        .create_user("first_superuser", true, true, true)
        .unwrap();
    let second_root = storage
        .create_user("second_superuser", true, false, true)
        .unwrap();
    let staff = storage
        .create_user("first_staff", false, true, true)
        .unwrap();
    let nobody = storage
        .create_user("not_allowed", false, false, true)
        .unwrap();
    let inactive = storage
        .create_user("former_admin", true, true, false)
        .unwrap();

    let open_state = storage.create_state("New", false).unwrap();
    let progress_state = storage.create_state("In progress", false).unwrap();
    let finished_state = storage.create_state("Finished", true).unwrap();

    let bug = storage.create_category("Bug").unwrap();
    let docs = storage.create_category("Docs").unwrap();

    Seed {
        root,
        second_root,
        staff,
        nobody,
        inactive,
        open_state,
        progress_state,
        finished_state,
        bug,
        docs,
    }
}

/// A full create payload referencing the seeded records.
pub fn issue_payload(seed: &Seed, name: &str) -> IssuePayload {
    IssuePayload {
        name: Some(name.to_string()),
        creator_id: Some(seed.root.id),
        responsible_person_id: Some(seed.staff.id),
        description: Some(format!("{name} description")),
        state_id: Some(seed.open_state.id),
        category_id: Some(seed.bug.id),
        created_at: Some(base_time()),
        finished_at: None,
    }
}
