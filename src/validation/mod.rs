//! Validation helpers for `issue_report`.
//!
//! Create requests are parsed strictly: the body must be a JSON object that
//! carries every content field as a non-empty string and nothing else. All
//! problems are collected so the caller sees every offending field at once.

use crate::error::{ValidationError, find_similar_name};
use crate::model::{IssueField, NewIssue};
use serde_json::{Map, Value};

/// Reason reported for an absent content field.
pub const MISSING_FIELD: &str = "missing required field";
/// Reason reported for a content field that is not a JSON string.
pub const NOT_A_STRING: &str = "must be a string";
/// Reason reported for a content field that is an empty string.
pub const EMPTY_FIELD: &str = "cannot be empty";
/// Reason reported for a key that is not a content field.
pub const UNKNOWN_FIELD: &str = "unknown field";

/// Validates create payloads.
pub struct IssueValidator;

impl IssueValidator {
    /// Validate a decoded request body and build the issue content from it.
    ///
    /// # Errors
    ///
    /// Returns every validation error found: a non-object body, missing,
    /// mistyped or empty content fields, and unknown keys.
    pub fn validate_payload(payload: &Value) -> Result<NewIssue, Vec<ValidationError>> {
        let Some(object) = payload.as_object() else {
            return Err(vec![ValidationError::new(
                "body",
                format!("expected a JSON object, got {}", json_type_name(payload)),
            )]);
        };

        let mut errors = Vec::new();
        let mut values: [String; 6] = Default::default();

        for (slot, field) in values.iter_mut().zip(IssueField::ALL) {
            match Self::required_string(object, field) {
                Ok(value) => *slot = value,
                Err(err) => errors.push(err),
            }
        }

        errors.extend(Self::unknown_fields(object));

        if !errors.is_empty() {
            return Err(errors);
        }

        let [issue_type, location, message, name, phone, email] = values;
        Ok(NewIssue {
            issue_type,
            location,
            message,
            name,
            phone,
            email,
        })
    }

    /// Re-check the invariants of already-built issue content.
    ///
    /// # Errors
    ///
    /// Returns a `Vec<ValidationError>` naming each empty field.
    pub fn validate(issue: &NewIssue) -> Result<(), Vec<ValidationError>> {
        let errors: Vec<ValidationError> = IssueField::ALL
            .into_iter()
            .filter(|field| issue.get(*field).is_empty())
            .map(|field| ValidationError::new(field.as_str(), EMPTY_FIELD))
            .collect();

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    fn required_string(
        object: &Map<String, Value>,
        field: IssueField,
    ) -> Result<String, ValidationError> {
        match object.get(field.as_str()) {
            None => Err(ValidationError::new(field.as_str(), MISSING_FIELD)),
            Some(Value::String(value)) if value.is_empty() => {
                Err(ValidationError::new(field.as_str(), EMPTY_FIELD))
            }
            Some(Value::String(value)) => Ok(value.clone()),
            Some(other) => Err(ValidationError::new(
                field.as_str(),
                format!("{NOT_A_STRING}, got {}", json_type_name(other)),
            )),
        }
    }

    fn unknown_fields(object: &Map<String, Value>) -> Vec<ValidationError> {
        object
            .keys()
            .filter(|key| IssueField::from_name(key).is_none())
            .map(|key| {
                let reason = find_similar_name(key, &IssueField::NAMES).map_or_else(
                    || UNKNOWN_FIELD.to_string(),
                    |similar| format!("{UNKNOWN_FIELD} (did you mean '{similar}'?)"),
                );
                ValidationError::new(key.clone(), reason)
            })
            .collect()
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
