//! Form payloads accepted by the HTML pages and the JSON API.
//!
//! Every form validates with `validator`, sanitizes free text and converts
//! itself into the matching domain payload.

use std::fmt::Display;
use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer, Serialize, de};
use thiserror::Error;
use validator::{ValidationErrors, ValidationErrorsKind};

pub mod directory;
pub mod inventory;
pub mod materials;
pub mod production;
pub mod quality;
pub mod sales;

/// Result type returned by the form helpers.
pub type FormResult<T> = Result<T, FormError>;

/// Errors that can occur while processing any form.
#[derive(Debug, Error)]
pub enum FormError {
    /// Validation failures from the `validator` crate.
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationErrors),
    /// A required text field is empty after sanitization.
    #[error("{field} cannot be empty")]
    Blank { field: &'static str },
    /// A field holds a value that is well formed but not allowed.
    #[error("{field}: {message}")]
    Invalid {
        field: &'static str,
        message: String,
    },
    /// The uploaded CSV is missing required columns.
    #[error("upload is missing the required columns: {0}")]
    MissingHeaders(String),
    /// A CSV row could not be turned into a record.
    #[error("row {row}: {message}")]
    UploadRow { row: usize, message: String },
    /// The uploaded CSV did not contain any rows.
    #[error("upload contains no rows")]
    EmptyUpload,
    /// CSV parsing failures.
    #[error("failed to parse CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("failed to read upload: {0}")]
    Io(#[from] std::io::Error),
}

/// One validation message addressed to a form field.
///
/// Nested fields use dotted paths with list indexes, e.g. `items[1].quantity`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl FormError {
    /// Field-level messages for errors that point at a single field.
    pub fn field_errors(&self) -> Option<Vec<FieldError>> {
        match self {
            FormError::Validation(errors) => Some(field_errors(errors)),
            FormError::Blank { field } => Some(vec![FieldError::new(*field, "must not be blank")]),
            FormError::Invalid { field, message } => {
                Some(vec![FieldError::new(*field, message.clone())])
            }
            _ => None,
        }
    }
}

/// Flatten nested `validator` errors into a sorted list of field messages.
pub fn field_errors(errors: &ValidationErrors) -> Vec<FieldError> {
    let mut collected = Vec::new();
    collect_field_errors("", errors, &mut collected);
    collected.sort_by(|a, b| a.field.cmp(&b.field));
    collected
}

fn collect_field_errors(prefix: &str, errors: &ValidationErrors, out: &mut Vec<FieldError>) {
    for (field, kind) in errors.errors() {
        let path = if prefix.is_empty() {
            field.to_string()
        } else {
            format!("{prefix}.{field}")
        };

        match kind {
            ValidationErrorsKind::Field(field_errors) => {
                for error in field_errors {
                    let message = error
                        .message
                        .as_ref()
                        .map(|message| message.to_string())
                        .unwrap_or_else(|| default_message(&error.code));
                    out.push(FieldError::new(path.clone(), message));
                }
            }
            ValidationErrorsKind::Struct(nested) => collect_field_errors(&path, nested, out),
            ValidationErrorsKind::List(items) => {
                for (index, nested) in items {
                    collect_field_errors(&format!("{path}[{index}]"), nested, out);
                }
            }
        }
    }
}

fn default_message(code: &str) -> String {
    match code {
        "length" => "has an invalid length".to_string(),
        "range" => "is out of range".to_string(),
        "email" => "must be a valid email address".to_string(),
        "url" => "must be a valid URL".to_string(),
        other => format!("is invalid ({other})"),
    }
}

/// Deserialize an optional value, treating blank strings as absent.
///
/// HTML selects and date inputs submit `""` when nothing is chosen, while
/// JSON callers send `null` or a typed value; both end up here.
pub fn empty_string_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: Display,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    let raw = match value {
        None | Some(serde_json::Value::Null) => return Ok(None),
        Some(serde_json::Value::String(text)) => text,
        Some(other) => other.to_string(),
    };

    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    trimmed.parse::<T>().map(Some).map_err(de::Error::custom)
}

/// Parse the value of an `<input type="datetime-local">`.
pub fn parse_datetime_local(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M")
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S"))
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S"))
        .ok()
}

/// Collapse whitespace runs and drop control characters.
pub fn sanitize_inline_text(input: &str) -> String {
    let mut sanitized = String::with_capacity(input.len());
    let mut previous_whitespace = false;

    for ch in input.trim().chars() {
        if ch.is_whitespace() {
            if !previous_whitespace {
                sanitized.push(' ');
                previous_whitespace = true;
            }
        } else if ch.is_control() {
            continue;
        } else {
            sanitized.push(ch);
            previous_whitespace = false;
        }
    }

    sanitized
}

/// Sanitize every line and squash repeated blank lines.
pub fn sanitize_multiline_text(input: &str) -> String {
    let mut lines: Vec<String> = input.lines().map(sanitize_inline_text).collect();

    while matches!(lines.first(), Some(line) if line.is_empty()) {
        lines.remove(0);
    }

    while matches!(lines.last(), Some(line) if line.is_empty()) {
        lines.pop();
    }

    let mut result = Vec::with_capacity(lines.len());
    let mut previous_empty = false;
    for line in lines {
        if line.is_empty() {
            if previous_empty {
                continue;
            }
            previous_empty = true;
        } else {
            previous_empty = false;
        }
        result.push(line);
    }

    result.join("\n")
}

/// Sanitize a required single-line field, failing when nothing is left.
pub(crate) fn required_text(value: &str, field: &'static str) -> FormResult<String> {
    let sanitized = sanitize_inline_text(value);
    if sanitized.is_empty() {
        return Err(FormError::Blank { field });
    }
    Ok(sanitized)
}

/// Reject `NaN`, which passes `range` checks unnoticed.
pub(crate) fn finite_number(value: f64, field: &'static str) -> FormResult<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(FormError::Invalid {
            field,
            message: "must be a finite number".to_string(),
        })
    }
}

/// Sanitize an optional single-line field, dropping it when blank.
pub(crate) fn optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(sanitize_inline_text)
        .filter(|value| !value.is_empty())
}

/// Sanitize an optional multi-line field, dropping it when blank.
pub(crate) fn optional_multiline(value: Option<&str>) -> Option<String> {
    value
        .map(sanitize_multiline_text)
        .filter(|value| !value.is_empty())
}
