//! Error types and handling for `tracker_rust`.
//!
//! # Design
//!
//! - Uses `thiserror` for derive-based error types
//! - Supports `anyhow` integration for wrapped one-off failures
//! - Validation failures are aggregated, never fail-fast
//! - Provides structured JSON output with stable error codes

mod structured;

pub use structured::{ErrorCode, StructuredError};

use std::path::PathBuf;
use thiserror::Error;

/// Primary error type for `tracker_rust` operations.
#[derive(Error, Debug)]
pub enum TrackerError {
    // === Storage Errors ===
    /// Database file not found at the specified path.
    #[error("Database not found at '{path}'")]
    DatabaseNotFound { path: PathBuf },

    /// `SQLite` database error.
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    // === Record Errors ===
    /// The target entity does not exist.
    ///
    /// Distinct from validation failures: takes precedence for
    /// get/update/delete when the id does not resolve.
    #[error("{entity} not found: {id}")]
    RecordNotFound { entity: &'static str, id: i64 },

    // === Authorization ===
    /// The acting identity lacks the privilege for the operation.
    #[error("Forbidden: '{actor}' may not {action}")]
    Forbidden { actor: String, action: String },

    // === Validation Errors ===
    /// Field validation failed.
    #[error("Validation failed: {0}")]
    Validation(ValidationError),

    /// Multiple validation errors occurred.
    #[error("Validation errors: {errors:?}")]
    ValidationErrors { errors: Vec<ValidationError> },

    // === Configuration Errors ===
    /// Configuration file error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Tracker workspace not initialized.
    #[error("Tracker not initialized: run 'tkr init' first")]
    NotInitialized,

    /// Already initialized.
    #[error("Already initialized at '{path}'")]
    AlreadyInitialized { path: PathBuf },

    // === I/O Errors ===
    /// File system I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML parsing error.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Wrapped anyhow error for one-off failures.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// The rule a single validation failure violated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    /// A foreign id does not resolve to an existing record.
    ReferenceNotFound,
    /// The creator reference resolves to a non-superuser identity.
    NotSuperuser,
    /// `finished_at` is earlier than `created_at`.
    FinishedBeforeCreated,
    /// `finished_at` supplied while the state does not mark finished.
    FinishedAtNotAllowedForState,
    /// Store-level uniqueness or non-null constraint violated.
    ConstraintViolation,
}

impl ViolationKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ReferenceNotFound => "reference_not_found",
            Self::NotSuperuser => "not_superuser",
            Self::FinishedBeforeCreated => "finished_before_created",
            Self::FinishedAtNotAllowedForState => "finished_at_not_allowed_for_state",
            Self::ConstraintViolation => "constraint_violation",
        }
    }
}

/// A single field validation error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// The rule that was violated.
    pub kind: ViolationKind,
    /// The field that failed validation.
    pub field: String,
    /// The reason for the validation failure.
    pub message: String,
}

impl ValidationError {
    /// Create a new validation error.
    #[must_use]
    pub fn new(kind: ViolationKind, field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            field: field.into(),
            message: message.into(),
        }
    }

    /// Shorthand for a dangling-reference failure on `field`.
    #[must_use]
    pub fn reference_not_found(field: impl Into<String>, id: i64) -> Self {
        Self::new(
            ViolationKind::ReferenceNotFound,
            field,
            format!("no record with id {id}"),
        )
    }

    /// Shorthand for a store constraint failure.
    #[must_use]
    pub fn constraint(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ViolationKind::ConstraintViolation, field, message)
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

impl TrackerError {
    /// Can the user fix this without code changes?
    #[must_use]
    pub const fn is_user_recoverable(&self) -> bool {
        matches!(
            self,
            Self::DatabaseNotFound { .. }
                | Self::NotInitialized
                | Self::RecordNotFound { .. }
                | Self::Forbidden { .. }
                | Self::Validation { .. }
                | Self::ValidationErrors { .. }
        )
    }

    /// Human-friendly suggestion for fixing this error.
    #[must_use]
    pub const fn suggestion(&self) -> Option<&'static str> {
        match self {
            Self::NotInitialized => Some("Run: tkr init"),
            Self::DatabaseNotFound { .. } => Some("Check --db or run: tkr init"),
            Self::AlreadyInitialized { .. } => Some("Use --force to reinitialize"),
            Self::Forbidden { .. } => Some("Pass --actor with a sufficiently privileged username"),
            _ => None,
        }
    }

    /// Create a not-found error for an issue id.
    #[must_use]
    pub const fn issue_not_found(id: i64) -> Self {
        Self::RecordNotFound {
            entity: "Issue",
            id,
        }
    }

    /// Create a forbidden error.
    #[must_use]
    pub fn forbidden(actor: impl Into<String>, action: impl Into<String>) -> Self {
        Self::Forbidden {
            actor: actor.into(),
            action: action.into(),
        }
    }

    /// Create from collected validation errors.
    ///
    /// A single error collapses to the scalar variant, matching how the
    /// one-failure case reads in output.
    #[must_use]
    pub fn from_validation_errors(mut errors: Vec<ValidationError>) -> Self {
        if errors.len() == 1 {
            Self::Validation(errors.remove(0))
        } else {
            Self::ValidationErrors { errors }
        }
    }

    /// The validation errors carried by this error, if any.
    #[must_use]
    pub fn validation_errors(&self) -> Option<Vec<&ValidationError>> {
        match self {
            Self::Validation(err) => Some(vec![err]),
            Self::ValidationErrors { errors } => Some(errors.iter().collect()),
            _ => None,
        }
    }
}

/// Result type using `TrackerError`.
pub type Result<T> = std::result::Result<T, TrackerError>;
