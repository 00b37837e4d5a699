//! Issue validation engine.
//!
//! Pure resolution of a candidate payload plus the previously persisted
//! record into a fully consistent issue ready for persistence, or an
//! aggregated list of every violated rule. Nothing here touches storage
//! directly; lookups go through the `ReferenceResolver` seam.

use crate::error::{Result, TrackerError, ValidationError, ViolationKind};
use crate::model::{Category, Issue, State, User};
use crate::util::time::{now_second, to_second};
use chrono::{DateTime, Utc};

/// A candidate issue body: partial for updates, full for creates.
///
/// Absent fields fall back to the persisted record during updates; on
/// create every reference and text field is required.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
pub struct IssuePayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creator_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub responsible_person_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,
}

impl IssuePayload {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.creator_id.is_none()
            && self.responsible_person_id.is_none()
            && self.description.is_none()
            && self.state_id.is_none()
            && self.category_id.is_none()
            && self.created_at.is_none()
            && self.finished_at.is_none()
    }
}

/// A fully resolved, internally consistent issue body ready for persistence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedIssue {
    pub name: String,
    pub creator_id: i64,
    pub responsible_person_id: i64,
    pub description: String,
    pub state_id: i64,
    pub category_id: i64,
    pub created_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

/// Storage-facing reference lookups used by the engine.
pub trait ReferenceResolver {
    /// Look up a user by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage lookup fails.
    fn user(&self, id: i64) -> Result<Option<User>>;

    /// Look up a state by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage lookup fails.
    fn state(&self, id: i64) -> Result<Option<State>>;

    /// Look up a category by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage lookup fails.
    fn category(&self, id: i64) -> Result<Option<Category>>;
}

/// Reconcile the `finished_at` field against the resolved state.
///
/// `requested` is the caller-supplied value; `previous` is the persisted one
/// (None on create). A merely carried-over value is cleared silently when
/// the state does not mark finished, while an explicitly supplied one fails.
///
/// # Errors
///
/// Returns `FinishedBeforeCreated` or `FinishedAtNotAllowedForState`.
pub fn reconcile_finished_at(
    requested: Option<DateTime<Utc>>,
    previous: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    state: &State,
) -> std::result::Result<Option<DateTime<Utc>>, ValidationError> {
    if let Some(ts) = requested {
        let ts = to_second(ts);
        if ts < created_at {
            return Err(ValidationError::new(
                ViolationKind::FinishedBeforeCreated,
                "finished_at",
                "cannot be earlier than created_at",
            ));
        }
        if !state.marks_finished {
            return Err(ValidationError::new(
                ViolationKind::FinishedAtNotAllowedForState,
                "finished_at",
                format!("state '{}' does not mark issues finished", state.name),
            ));
        }
        return Ok(Some(ts));
    }

    if !state.marks_finished {
        // Clears any previously persisted value as well.
        return Ok(None);
    }

    if let Some(prev) = previous {
        if prev < created_at {
            return Err(ValidationError::new(
                ViolationKind::FinishedBeforeCreated,
                "finished_at",
                "cannot be earlier than created_at",
            ));
        }
        return Ok(Some(prev));
    }

    Ok(Some(now_second()))
}

/// Validates and resolves issue payloads.
pub struct IssueValidator;

impl IssueValidator {
    /// Resolve a payload merged with the persisted record into a consistent
    /// issue body, collecting every violation.
    ///
    /// `existing` is `None` on create. All failures are returned together,
    /// never fail-fast, so the caller can fix every problem in one round
    /// trip.
    ///
    /// # Errors
    ///
    /// Returns aggregated `ValidationErrors` (or a storage error from a
    /// reference lookup).
    pub fn resolve(
        payload: &IssuePayload,
        existing: Option<&Issue>,
        refs: &impl ReferenceResolver,
    ) -> Result<ResolvedIssue> {
        let mut errors = Vec::new();

        let name = merge_text(payload.name.as_deref(), existing.map(|i| i.name.as_str()));
        let description = merge_text(
            payload.description.as_deref(),
            existing.map(|i| i.description.as_str()),
        );

        if name.is_none() {
            errors.push(ValidationError::constraint("name", "is required"));
        }
        if description.is_none() {
            errors.push(ValidationError::constraint("description", "is required"));
        }

        let creator_id = payload.creator_id.or(existing.map(|i| i.creator_id));
        let responsible_person_id = payload
            .responsible_person_id
            .or(existing.map(|i| i.responsible_person_id));
        let state_id = payload.state_id.or(existing.map(|i| i.state_id));
        let category_id = payload.category_id.or(existing.map(|i| i.category_id));

        match creator_id {
            None => errors.push(ValidationError::constraint("creator_id", "is required")),
            Some(id) => match refs.user(id)? {
                None => errors.push(ValidationError::reference_not_found("creator_id", id)),
                Some(user) => {
                    if let Err(err) = require_superuser(&user) {
                        errors.push(err);
                    }
                }
            },
        }

        match responsible_person_id {
            None => errors.push(ValidationError::constraint(
                "responsible_person_id",
                "is required",
            )),
            Some(id) => {
                if refs.user(id)?.is_none() {
                    errors.push(ValidationError::reference_not_found(
                        "responsible_person_id",
                        id,
                    ));
                }
            }
        }

        let mut state = None;
        match state_id {
            None => errors.push(ValidationError::constraint("state_id", "is required")),
            Some(id) => match refs.state(id)? {
                None => errors.push(ValidationError::reference_not_found("state_id", id)),
                Some(record) => state = Some(record),
            },
        }

        match category_id {
            None => errors.push(ValidationError::constraint("category_id", "is required")),
            Some(id) => {
                if refs.category(id)?.is_none() {
                    errors.push(ValidationError::reference_not_found("category_id", id));
                }
            }
        }

        let created_at = payload
            .created_at
            .map(to_second)
            .or(existing.map(|i| i.created_at))
            .unwrap_or_else(now_second);

        // finished_at can only be reconciled once the state resolved; its
        // failures still aggregate with everything above.
        let finished_at = match state {
            Some(ref state) => {
                match reconcile_finished_at(
                    payload.finished_at,
                    existing.and_then(|i| i.finished_at),
                    created_at,
                    state,
                ) {
                    Ok(resolved) => resolved,
                    Err(err) => {
                        errors.push(err);
                        None
                    }
                }
            }
            None => None,
        };

        if !errors.is_empty() {
            return Err(TrackerError::from_validation_errors(errors));
        }

        // All Options are present here; the error list above is exhaustive.
        Ok(ResolvedIssue {
            name: name.unwrap_or_default(),
            creator_id: creator_id.unwrap_or_default(),
            responsible_person_id: responsible_person_id.unwrap_or_default(),
            description: description.unwrap_or_default(),
            state_id: state_id.unwrap_or_default(),
            category_id: category_id.unwrap_or_default(),
            created_at,
            finished_at,
        })
    }
}

/// Succeeds only if the identity has the superuser flag set.
fn require_superuser(user: &User) -> std::result::Result<(), ValidationError> {
    if user.is_superuser {
        Ok(())
    } else {
        Err(ValidationError::new(
            ViolationKind::NotSuperuser,
            "creator_id",
            format!("'{}' is not a superuser", user.username),
        ))
    }
}

fn merge_text(payload: Option<&str>, existing: Option<&str>) -> Option<String> {
    payload.or(existing).map(str::to_string)
}
