//! Access control gate.
//!
//! A state-free decision function over the acting identity's privilege
//! flags. Decisions are recomputed on every request; nothing is cached or
//! persisted.

use crate::error::{Result, TrackerError};
use crate::model::User;

/// A logical operation subject to authorization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    ListIssues,
    GetIssue,
    CreateIssue,
    UpdateIssue,
    DeleteIssue,
    ListUsers,
    ListStates,
    ListCategories,
    ManageUsers,
    ManageStates,
    ManageCategories,
}

impl Operation {
    /// Human-readable description used in denial messages.
    #[must_use]
    pub const fn describe(self) -> &'static str {
        match self {
            Self::ListIssues => "list issues",
            Self::GetIssue => "read issues",
            Self::CreateIssue => "create issues",
            Self::UpdateIssue => "update issues",
            Self::DeleteIssue => "delete issues",
            Self::ListUsers => "list users",
            Self::ListStates => "list states",
            Self::ListCategories => "list categories",
            Self::ManageUsers => "manage users",
            Self::ManageStates => "manage states",
            Self::ManageCategories => "manage categories",
        }
    }

    /// True for read-only operations.
    #[must_use]
    pub const fn is_read(self) -> bool {
        matches!(
            self,
            Self::ListIssues
                | Self::GetIssue
                | Self::ListUsers
                | Self::ListStates
                | Self::ListCategories
        )
    }
}

/// Authorize `actor` for `op`.
///
/// Reads require staff or superuser; mutations require superuser. Inactive
/// identities are denied everything.
///
/// # Errors
///
/// Returns `TrackerError::Forbidden` when the identity lacks the privilege.
pub fn authorize(actor: &User, op: Operation) -> Result<()> {
    let allowed = if op.is_read() {
        actor.can_read()
    } else {
        actor.can_mutate()
    };

    if allowed {
        Ok(())
    } else {
        Err(TrackerError::forbidden(
            actor.username.clone(),
            op.describe(),
        ))
    }
}
