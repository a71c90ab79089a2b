//! Core data types for `issue_report`.
//!
//! - `Issue` - A persisted report, with its store-assigned id
//! - `NewIssue` - The six content fields of a report, as submitted
//! - `IssueField` - Names of the content fields

use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the six required content fields of an issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IssueField {
    Type,
    Location,
    Message,
    Name,
    Phone,
    Email,
}

impl IssueField {
    /// All content fields in canonical order.
    pub const ALL: [Self; 6] = [
        Self::Type,
        Self::Location,
        Self::Message,
        Self::Name,
        Self::Phone,
        Self::Email,
    ];

    /// All content field names in canonical order.
    pub const NAMES: [&'static str; 6] = ["type", "location", "message", "name", "phone", "email"];

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Type => "type",
            Self::Location => "location",
            Self::Message => "message",
            Self::Name => "name",
            Self::Phone => "phone",
            Self::Email => "email",
        }
    }

    /// Look up a field by its wire name (exact match).
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|field| field.as_str() == name)
    }
}

impl fmt::Display for IssueField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The content of an issue report, without an identifier.
///
/// This is both the validated create payload and the JSON blob stored in
/// the `data` column. Unknown keys are rejected when decoding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewIssue {
    #[serde(rename = "type")]
    pub issue_type: String,
    pub location: String,
    pub message: String,
    pub name: String,
    pub phone: String,
    pub email: String,
}

impl NewIssue {
    /// Value of a content field.
    #[must_use]
    pub fn get(&self, field: IssueField) -> &str {
        match field {
            IssueField::Type => &self.issue_type,
            IssueField::Location => &self.location,
            IssueField::Message => &self.message,
            IssueField::Name => &self.name,
            IssueField::Phone => &self.phone,
            IssueField::Email => &self.email,
        }
    }

    /// Attach a store-assigned identifier.
    #[must_use]
    pub fn with_id(self, id: impl Into<String>) -> Issue {
        Issue {
            id: id.into(),
            issue_type: self.issue_type,
            location: self.location,
            message: self.message,
            name: self.name,
            phone: self.phone,
            email: self.email,
        }
    }
}

/// A persisted issue report.
///
/// Serializes to the list item shape served by `GET /issues/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    /// Sortable identifier (ULID); newer issues sort after older ones.
    pub id: String,
    #[serde(rename = "type")]
    pub issue_type: String,
    pub location: String,
    pub message: String,
    pub name: String,
    pub phone: String,
    pub email: String,
}

impl Issue {
    /// Content fields without the identifier.
    #[must_use]
    pub fn content(&self) -> NewIssue {
        NewIssue {
            issue_type: self.issue_type.clone(),
            location: self.location.clone(),
            message: self.message.clone(),
            name: self.name.clone(),
            phone: self.phone.clone(),
            email: self.email.clone(),
        }
    }
}
