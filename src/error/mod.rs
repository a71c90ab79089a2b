//! Error types and handling for `issue_report`.
//!
//! # Design
//!
//! - Uses `thiserror` for derive-based error types
//! - Supports `anyhow` integration for startup glue
//! - Splits failures into validation (caller can fix the request) and
//!   persistence (the store could not complete the operation)
//! - Provides structured JSON output shared by the CLI and the HTTP layer

mod structured;

pub use structured::{ErrorCode, GENERIC_INTERNAL_MESSAGE, StructuredError, find_similar_name};

use std::path::PathBuf;
use thiserror::Error;

/// Primary error type for `issue_report` operations.
#[derive(Error, Debug)]
pub enum IssueError {
    // === Storage Errors ===
    /// `SQLite` database error.
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Database file could not be prepared (parent directory, permissions).
    #[error("Cannot open database at '{path}': {reason}")]
    DatabaseUnavailable { path: PathBuf, reason: String },

    /// A stored row could not be decoded into an issue.
    #[error("Corrupt issue record {id}: {reason}")]
    CorruptRecord { id: String, reason: String },

    /// The identifier generator could not produce a new id.
    #[error("Identifier generation failed: {0}")]
    IdGeneration(String),

    // === Validation Errors ===
    /// Field validation failed.
    #[error("Validation failed: {field}: {reason}")]
    Validation { field: String, reason: String },

    /// Multiple validation errors occurred.
    #[error("Validation errors: {errors:?}")]
    ValidationErrors { errors: Vec<ValidationError> },

    /// Request body could not be read as a JSON object.
    #[error("Invalid request body: {reason}")]
    InvalidBody { reason: String },

    // === Configuration Errors ===
    /// Configuration file or value error.
    #[error("Configuration error: {0}")]
    Config(String),

    // === I/O Errors ===
    /// File system or socket I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML parsing error.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Wrapped anyhow error.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// A single field validation error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// The field that failed validation.
    pub field: String,
    /// The reason for the validation failure.
    pub message: String,
}

impl ValidationError {
    /// Create a new validation error.
    #[must_use]
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

impl IssueError {
    /// Did the request itself cause this error?
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::Validation { .. } | Self::ValidationErrors { .. } | Self::InvalidBody { .. }
        )
    }

    /// Did the store fail to complete the operation?
    #[must_use]
    pub const fn is_persistence(&self) -> bool {
        matches!(
            self,
            Self::Database(_)
                | Self::DatabaseUnavailable { .. }
                | Self::CorruptRecord { .. }
                | Self::IdGeneration(_)
                | Self::Io(_)
                | Self::Json(_)
        )
    }

    /// Field-level details, in the order they were found.
    #[must_use]
    pub fn field_errors(&self) -> Vec<ValidationError> {
        match self {
            Self::Validation { field, reason } => vec![ValidationError::new(field, reason)],
            Self::ValidationErrors { errors } => errors.clone(),
            _ => Vec::new(),
        }
    }

    /// Human-friendly suggestion for fixing this error.
    #[must_use]
    pub const fn suggestion(&self) -> Option<&'static str> {
        match self {
            Self::Validation { .. } | Self::ValidationErrors { .. } => Some(
                "Send exactly: type, location, message, name, phone, email (all non-empty strings)",
            ),
            Self::InvalidBody { .. } => Some("Send a JSON object with Content-Type: application/json"),
            Self::DatabaseUnavailable { .. } => Some("Check the --db path and its permissions"),
            Self::Config(_) => Some("Check issues.yaml, ISSUES_* variables and CLI flags"),
            _ => None,
        }
    }

    /// Create from multiple validation errors.
    #[must_use]
    pub fn from_validation_errors(errors: Vec<ValidationError>) -> Self {
        if errors.len() == 1 {
            let err = &errors[0];
            Self::Validation {
                field: err.field.clone(),
                reason: err.message.clone(),
            }
        } else {
            Self::ValidationErrors { errors }
        }
    }
}

/// Result type using `IssueError`.
pub type Result<T> = std::result::Result<T, IssueError>;
