//! Core data types for `tracker_rust`.
//!
//! This module defines the fundamental types used throughout the application:
//! - `Issue` - The tracked work item
//! - `State` - Issue lifecycle stage, optionally marking issues finished
//! - `Category` - Issue classification tag
//! - `User` - Referenced identity with privilege flags

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A referenced identity with privilege flags.
///
/// Identity storage itself is out of scope; only the fields the gate and the
/// validation engine consult are carried.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub is_superuser: bool,
    pub is_staff: bool,
    pub is_active: bool,
}

impl User {
    /// True if the identity may read tracker data.
    #[must_use]
    pub const fn can_read(&self) -> bool {
        self.is_active && (self.is_staff || self.is_superuser)
    }

    /// True if the identity may mutate tracker data.
    #[must_use]
    pub const fn can_mutate(&self) -> bool {
        self.is_active && self.is_superuser
    }
}

impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.username)
    }
}

/// A named lifecycle stage for an issue.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct State {
    pub id: i64,
    /// Unique, non-empty (max 50 chars).
    pub name: String,
    /// Issues in this state carry a `finished_at` timestamp.
    pub marks_finished: bool,
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// A named classification tag for an issue.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Category {
    pub id: i64,
    /// Unique, non-empty (max 50 chars).
    pub name: String,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// The primary issue entity.
///
/// `creator_id` must reference a superuser; `finished_at` is derived from
/// the referenced state and is present iff that state marks finished.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Issue {
    pub id: i64,

    /// Title (non-empty, max 50 chars).
    pub name: String,

    /// Creating identity; must be a superuser.
    pub creator_id: i64,

    /// Assigned identity; no privilege restriction.
    pub responsible_person_id: i64,

    /// Detailed description (non-empty).
    pub description: String,

    /// Lifecycle state reference.
    pub state_id: i64,

    /// Classification reference.
    pub category_id: i64,

    /// Creation timestamp (defaults to creation time when omitted).
    pub created_at: DateTime<Utc>,

    /// Completion timestamp; present iff the state marks finished.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} - {}",
            self.created_at.format("%Y-%m-%d %H:%M:%S"),
            self.name
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn user(superuser: bool, staff: bool, active: bool) -> User {
        User {
            id: 1,
            username: "someone".to_string(),
            is_superuser: superuser,
            is_staff: staff,
            is_active: active,
        }
    }

    #[test]
    fn user_capability_flags() {
        assert!(user(true, false, true).can_read());
        assert!(user(true, false, true).can_mutate());
        assert!(user(false, true, true).can_read());
        assert!(!user(false, true, true).can_mutate());
        assert!(!user(false, false, true).can_read());
        assert!(!user(true, true, false).can_read());
        assert!(!user(true, true, false).can_mutate());
    }

    #[test]
    fn issue_serialization_shape() {
        let issue = Issue {
            id: 3,
            name: "Broken login".to_string(),
            creator_id: 1,
            responsible_person_id: 2,
            description: "Login page 500s".to_string(),
            state_id: 4,
            category_id: 5,
            created_at: Utc.with_ymd_and_hms(2021, 9, 1, 12, 0, 0).unwrap(),
            finished_at: None,
        };

        let json = serde_json::to_string(&issue).unwrap();
        assert!(json.contains("\"id\":3"));
        assert!(json.contains("\"creator_id\":1"));
        assert!(json.contains("\"responsible_person_id\":2"));
        assert!(json.contains("\"state_id\":4"));
        assert!(json.contains("\"category_id\":5"));
        // absent finished_at is omitted, not null
        assert!(!json.contains("finished_at"));
    }

    #[test]
    fn issue_deserialize_defaults_finished_at() {
        let json = r#"{
            "id": 1,
            "name": "Test issue",
            "creator_id": 1,
            "responsible_person_id": 1,
            "description": "text",
            "state_id": 1,
            "category_id": 1,
            "created_at": "2021-09-01T12:00:00Z"
        }"#;
        let issue: Issue = serde_json::from_str(json).unwrap();
        assert!(issue.finished_at.is_none());
    }

    #[test]
    fn issue_display_uses_created_at() {
        let issue = Issue {
            id: 1,
            name: "Bug name".to_string(),
            creator_id: 1,
            responsible_person_id: 1,
            description: "Bug description".to_string(),
            state_id: 1,
            category_id: 1,
            created_at: Utc.with_ymd_and_hms(2021, 9, 1, 12, 12, 12).unwrap(),
            finished_at: None,
        };
        assert_eq!(issue.to_string(), "2021-09-01 12:12:12 - Bug name");
    }
}
