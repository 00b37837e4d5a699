//! Structured error output for machine consumers.
//!
//! Provides machine-parseable error information with:
//! - Error codes for categorization
//! - Hints for self-correction
//! - Retryability flags
//! - Context for debugging

use crate::error::TrackerError;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// Machine-readable error codes.
///
/// These codes are stable and can be used for programmatic error handling.
/// Format: `SCREAMING_SNAKE_CASE` for easy parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCode {
    // === Database Errors (exit code 2) ===
    /// Database file not found
    DatabaseNotFound,
    /// Database operation failed
    DatabaseError,
    /// Tracker workspace not initialized
    NotInitialized,
    /// Already initialized
    AlreadyInitialized,

    // === Record Errors (exit code 3) ===
    /// Target record not found
    RecordNotFound,

    // === Validation Errors (exit code 4) ===
    /// Field validation failed (aggregated)
    ValidationFailed,

    // === Authorization Errors (exit code 5) ===
    /// Operation denied for the acting identity
    Forbidden,

    // === Config Errors (exit code 7) ===
    /// Configuration error
    ConfigError,

    // === I/O Errors (exit code 8) ===
    /// File I/O error
    IoError,
    /// JSON serialization error
    JsonError,
    /// YAML parsing error
    YamlError,

    // === Internal Errors (exit code 1) ===
    /// Unexpected internal error
    InternalError,
}

impl ErrorCode {
    /// Get the string representation for JSON output.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::DatabaseNotFound => "DATABASE_NOT_FOUND",
            Self::DatabaseError => "DATABASE_ERROR",
            Self::NotInitialized => "NOT_INITIALIZED",
            Self::AlreadyInitialized => "ALREADY_INITIALIZED",
            Self::RecordNotFound => "RECORD_NOT_FOUND",
            Self::ValidationFailed => "VALIDATION_FAILED",
            Self::Forbidden => "FORBIDDEN",
            Self::ConfigError => "CONFIG_ERROR",
            Self::IoError => "IO_ERROR",
            Self::JsonError => "JSON_ERROR",
            Self::YamlError => "YAML_ERROR",
            Self::InternalError => "INTERNAL_ERROR",
        }
    }

    /// Whether this error is potentially retryable.
    ///
    /// Retryable means the caller might succeed after fixing the input and
    /// retrying (e.g. a validation error); a denied operation is not.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::ValidationFailed)
    }

    /// Get the exit code for this error category.
    ///
    /// Exit codes are grouped by error category:
    /// - 1: Internal/unknown errors
    /// - 2: Database errors
    /// - 3: Record errors
    /// - 4: Validation errors
    /// - 5: Authorization errors
    /// - 7: Config errors
    /// - 8: I/O errors
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::DatabaseNotFound
            | Self::DatabaseError
            | Self::NotInitialized
            | Self::AlreadyInitialized => 2,
            Self::RecordNotFound => 3,
            Self::ValidationFailed => 4,
            Self::Forbidden => 5,
            Self::ConfigError => 7,
            Self::IoError | Self::JsonError | Self::YamlError => 8,
            Self::InternalError => 1,
        }
    }
}

/// Structured error for machine-parseable output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructuredError {
    /// Machine-readable error code
    pub code: ErrorCode,
    /// Human-readable error message
    pub message: String,
    /// Optional hint for fixing the error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    /// Whether the operation can be retried
    pub retryable: bool,
    /// Additional context data
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<Value>,
}

impl StructuredError {
    /// Create a new structured error from a `TrackerError`.
    #[must_use]
    pub fn from_error(err: &TrackerError) -> Self {
        let (code, context) = Self::extract_code_and_context(err);
        let hint = Self::generate_hint(err);

        Self {
            code,
            message: err.to_string(),
            hint,
            retryable: code.is_retryable(),
            context,
        }
    }

    /// Serialize to JSON value.
    #[must_use]
    pub fn to_json(&self) -> Value {
        json!({
            "error": {
                "code": self.code.as_str(),
                "message": self.message,
                "hint": self.hint,
                "retryable": self.retryable,
                "context": self.context,
            }
        })
    }

    /// Format for human-readable output.
    #[must_use]
    pub fn to_human(&self, color: bool) -> String {
        let mut output = String::new();

        if color {
            output.push_str("\x1b[31mError:\x1b[0m ");
        } else {
            output.push_str("Error: ");
        }

        output.push_str(&self.message);

        if let Some(violations) = self.context.as_ref().and_then(|ctx| ctx.get("violations")) {
            if let Some(items) = violations.as_array() {
                for item in items {
                    let field = item.get("field").and_then(Value::as_str).unwrap_or("?");
                    let message = item.get("message").and_then(Value::as_str).unwrap_or("?");
                    output.push_str(&format!("\n  - {field}: {message}"));
                }
            }
        }

        if let Some(hint) = &self.hint {
            output.push('\n');
            if color {
                output.push_str("\x1b[33mHint:\x1b[0m ");
            } else {
                output.push_str("Hint: ");
            }
            output.push_str(hint);
        }

        output
    }

    /// Extract error code and context from a `TrackerError`.
    fn extract_code_and_context(err: &TrackerError) -> (ErrorCode, Option<Value>) {
        match err {
            TrackerError::DatabaseNotFound { path } => (
                ErrorCode::DatabaseNotFound,
                Some(json!({"path": path.display().to_string()})),
            ),
            TrackerError::Database(_) => (ErrorCode::DatabaseError, None),
            TrackerError::NotInitialized => (ErrorCode::NotInitialized, None),
            TrackerError::AlreadyInitialized { path } => (
                ErrorCode::AlreadyInitialized,
                Some(json!({"path": path.display().to_string()})),
            ),
            TrackerError::RecordNotFound { entity, id } => (
                ErrorCode::RecordNotFound,
                Some(json!({"entity": entity, "id": id})),
            ),
            TrackerError::Forbidden { actor, action } => (
                ErrorCode::Forbidden,
                Some(json!({"actor": actor, "action": action})),
            ),
            TrackerError::Validation(e) => (
                ErrorCode::ValidationFailed,
                Some(json!({
                    "violations": [
                        {"kind": e.kind.as_str(), "field": e.field, "message": e.message}
                    ]
                })),
            ),
            TrackerError::ValidationErrors { errors } => (
                ErrorCode::ValidationFailed,
                Some(json!({
                    "violations": errors.iter()
                        .map(|e| json!({
                            "kind": e.kind.as_str(),
                            "field": e.field,
                            "message": e.message,
                        }))
                        .collect::<Vec<_>>()
                })),
            ),
            TrackerError::Config(_) => (ErrorCode::ConfigError, None),
            TrackerError::Io(_) => (ErrorCode::IoError, None),
            TrackerError::Json(_) => (ErrorCode::JsonError, None),
            TrackerError::Yaml(_) => (ErrorCode::YamlError, None),
            TrackerError::Other(_) => (ErrorCode::InternalError, None),
        }
    }

    /// Generate context-aware hint from error.
    fn generate_hint(err: &TrackerError) -> Option<String> {
        if let Some(suggestion) = err.suggestion() {
            return Some(suggestion.to_string());
        }

        match err {
            TrackerError::RecordNotFound { entity, .. } => match *entity {
                "Issue" => Some("Run 'tkr list' to see available issues.".to_string()),
                "State" => Some("Run 'tkr state list' to see available states.".to_string()),
                "Category" => {
                    Some("Run 'tkr category list' to see available categories.".to_string())
                }
                _ => None,
            },
            TrackerError::Validation { .. } | TrackerError::ValidationErrors { .. } => {
                Some("Fix every listed field and resubmit.".to_string())
            }
            _ => None,
        }
    }
}
