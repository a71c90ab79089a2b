//! Structured error output.
//!
//! Provides machine-parseable error information with:
//! - Error codes for categorization
//! - Field-level details for validation failures
//! - Hints for self-correction
//! - Retryability flags
//!
//! The same payload backs the CLI error output and the HTTP error bodies.
//! Internal failures are redacted before they leave the process over HTTP.

use crate::error::IssueError;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::collections::BTreeMap;

/// Message used in place of internal error details.
pub const GENERIC_INTERNAL_MESSAGE: &str = "Internal server error";

/// Machine-readable error codes.
///
/// These codes are stable and can be used for programmatic error handling.
/// Format: `SCREAMING_SNAKE_CASE` for easy parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // === Database Errors (exit code 2) ===
    /// Database operation failed
    DatabaseError,
    /// Database file cannot be opened
    DatabaseUnavailable,
    /// Stored record cannot be decoded
    CorruptRecord,
    /// Identifier generation failed
    IdGenerationFailed,

    // === Validation Errors (exit code 4) ===
    /// Field validation failed
    ValidationFailed,
    /// Request body is not a JSON object
    InvalidBody,

    // === Config Errors (exit code 7) ===
    /// Configuration error
    ConfigError,
    /// Config parse error
    ConfigParseError,

    // === I/O Errors (exit code 8) ===
    /// File I/O error
    IoError,
    /// JSON serialization error
    JsonError,

    // === Internal Errors (exit code 1) ===
    /// Unexpected internal error
    InternalError,
}

impl ErrorCode {
    /// Get the string representation for JSON output.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::DatabaseError => "DATABASE_ERROR",
            Self::DatabaseUnavailable => "DATABASE_UNAVAILABLE",
            Self::CorruptRecord => "CORRUPT_RECORD",
            Self::IdGenerationFailed => "ID_GENERATION_FAILED",
            Self::ValidationFailed => "VALIDATION_FAILED",
            Self::InvalidBody => "INVALID_BODY",
            Self::ConfigError => "CONFIG_ERROR",
            Self::ConfigParseError => "CONFIG_PARSE_ERROR",
            Self::IoError => "IO_ERROR",
            Self::JsonError => "JSON_ERROR",
            Self::InternalError => "INTERNAL_ERROR",
        }
    }

    /// Whether the caller may succeed by fixing the request and resending it.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::ValidationFailed | Self::InvalidBody)
    }

    /// Whether details of this error may be shown to an HTTP client.
    #[must_use]
    pub const fn is_public(&self) -> bool {
        matches!(self, Self::ValidationFailed | Self::InvalidBody)
    }

    /// HTTP status code for this error category.
    #[must_use]
    pub const fn http_status(&self) -> u16 {
        if self.is_public() { 400 } else { 500 }
    }

    /// Get the exit code for this error category.
    ///
    /// - 1: Internal/unknown errors
    /// - 2: Database errors
    /// - 4: Validation errors
    /// - 7: Config errors
    /// - 8: I/O errors
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::DatabaseError
            | Self::DatabaseUnavailable
            | Self::CorruptRecord
            | Self::IdGenerationFailed => 2,
            Self::ValidationFailed | Self::InvalidBody => 4,
            Self::ConfigError | Self::ConfigParseError => 7,
            Self::IoError | Self::JsonError => 8,
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
    /// Per-field reasons, keyed by field name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<BTreeMap<String, String>>,
    /// Optional hint for fixing the error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    /// Whether the operation can be retried
    pub retryable: bool,
}

impl StructuredError {
    /// Create a new structured error from an `IssueError`.
    #[must_use]
    pub fn from_error(err: &IssueError) -> Self {
        let code = Self::extract_code(err);
        let field_errors = err.field_errors();
        let (message, errors) = if field_errors.is_empty() {
            (err.to_string(), None)
        } else {
            let map = field_errors
                .into_iter()
                .map(|e| (e.field, e.message))
                .collect::<BTreeMap<_, _>>();
            ("Validation failed".to_string(), Some(map))
        };

        Self {
            code,
            message,
            errors,
            hint: err.suggestion().map(str::to_string),
            retryable: code.is_retryable(),
        }
    }

    /// Copy of this error that is safe to send to a remote client.
    ///
    /// Internal errors keep their code but lose message and hint.
    #[must_use]
    pub fn redacted(&self) -> Self {
        if self.code.is_public() {
            return self.clone();
        }
        Self {
            code: ErrorCode::InternalError,
            message: GENERIC_INTERNAL_MESSAGE.to_string(),
            errors: None,
            hint: None,
            retryable: false,
        }
    }

    /// Body for an HTTP error response.
    #[must_use]
    pub fn to_body(&self) -> Value {
        let mut body = json!({
            "code": self.code.as_str(),
            "message": self.message,
        });
        if let Some(errors) = &self.errors {
            body["errors"] = json!(errors);
        }
        body
    }

    /// Serialize to JSON value.
    #[must_use]
    pub fn to_json(&self) -> Value {
        json!({
            "error": {
                "code": self.code.as_str(),
                "message": self.message,
                "errors": self.errors,
                "hint": self.hint,
                "retryable": self.retryable,
            }
        })
    }

    /// Format for human-readable output.
    #[must_use]
    pub fn to_human(&self, color: bool) -> String {
        let mut output = String::new();

        if color {
            // Red for error
            output.push_str("\x1b[31mError:\x1b[0m ");
        } else {
            output.push_str("Error: ");
        }

        output.push_str(&self.message);

        if let Some(errors) = &self.errors {
            for (field, reason) in errors {
                output.push_str("\n  ");
                output.push_str(field);
                output.push_str(": ");
                output.push_str(reason);
            }
        }

        if let Some(hint) = &self.hint {
            output.push('\n');
            if color {
                // Yellow for hint
                output.push_str("\x1b[33mHint:\x1b[0m ");
            } else {
                output.push_str("Hint: ");
            }
            output.push_str(hint);
        }

        output
    }

    fn extract_code(err: &IssueError) -> ErrorCode {
        match err {
            IssueError::Database(_) => ErrorCode::DatabaseError,
            IssueError::DatabaseUnavailable { .. } => ErrorCode::DatabaseUnavailable,
            IssueError::CorruptRecord { .. } => ErrorCode::CorruptRecord,
            IssueError::IdGeneration(_) => ErrorCode::IdGenerationFailed,
            IssueError::Validation { .. } | IssueError::ValidationErrors { .. } => {
                ErrorCode::ValidationFailed
            }
            IssueError::InvalidBody { .. } => ErrorCode::InvalidBody,
            IssueError::Config(_) => ErrorCode::ConfigError,
            IssueError::Yaml(_) => ErrorCode::ConfigParseError,
            IssueError::Io(_) => ErrorCode::IoError,
            IssueError::Json(_) => ErrorCode::JsonError,
            IssueError::Other(_) => ErrorCode::InternalError,
        }
    }
}

/// Calculate the Levenshtein distance between two strings.
fn levenshtein_distance(a: &str, b: &str) -> usize {
    let a_len = a.chars().count();
    let b_len = b.chars().count();

    if a_len == 0 {
        return b_len;
    }
    if b_len == 0 {
        return a_len;
    }

    let mut matrix = vec![vec![0; b_len + 1]; a_len + 1];

    for (i, row) in matrix.iter_mut().enumerate().take(a_len + 1) {
        row[0] = i;
    }
    for (j, item) in matrix[0].iter_mut().enumerate().take(b_len + 1) {
        *item = j;
    }

    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();

    for (i, a_char) in a_chars.iter().enumerate() {
        for (j, b_char) in b_chars.iter().enumerate() {
            let cost = usize::from(a_char != b_char);
            matrix[i + 1][j + 1] = std::cmp::min(
                std::cmp::min(matrix[i][j + 1] + 1, matrix[i + 1][j] + 1),
                matrix[i][j] + cost,
            );
        }
    }

    matrix[a_len][b_len]
}

/// Find the known name closest to `searched`, if any is within distance 2.
///
/// Comparison is case-insensitive; ties resolve alphabetically.
#[must_use]
pub fn find_similar_name(searched: &str, known: &[&'static str]) -> Option<&'static str> {
    let lower = searched.to_lowercase();
    known
        .iter()
        .map(|name| (levenshtein_distance(&lower, name), *name))
        .filter(|(dist, _)| *dist <= 2)
        .min_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(b.1)))
        .map(|(_, name)| name)
}
