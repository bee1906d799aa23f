//! HTML form and JSON body validation for task input.
//!
//! Validation here is pure: the caller supplies "now", so the same input
//! always produces the same field errors.

use crate::task::{
    domain::{OwnerId, TaskDomainError, TaskTitle},
    services::{CreateTaskRequest, EditTaskRequest},
};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Message for a required field left empty.
pub const REQUIRED_MESSAGE: &str = "This field is required.";
/// Message for a `do_before` value that cannot be parsed.
pub const INVALID_DATE_MESSAGE: &str = "Enter a valid date/time.";
/// Message for a `do_before` value earlier than now.
pub const PAST_DATE_MESSAGE: &str = "\"do before\" date can not be in the past";
/// Message for a JSON text field holding a non-string value.
pub const NOT_A_STRING_MESSAGE: &str = "Not a valid string.";
/// Message for a JSON body that is not an object.
pub const NOT_AN_OBJECT_MESSAGE: &str = "Invalid data. Expected a dictionary.";
/// Key for errors that concern the submission as a whole.
pub const NON_FIELD_KEY: &str = "__all__";

const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
];

/// Field name to messages, in field order.
pub type FieldErrors = BTreeMap<&'static str, Vec<String>>;

/// Raw task input as submitted by a browser form or a JSON client.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaskForm {
    /// Submitted title.
    pub title: String,
    /// Submitted description.
    pub description: String,
    /// Submitted deadline text.
    pub do_before: String,
}

/// Task input that passed form validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidTaskForm {
    title: String,
    description: String,
    do_before: DateTime<Utc>,
}

impl ValidTaskForm {
    /// Returns the trimmed title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the parsed deadline in UTC.
    #[must_use]
    pub const fn do_before(&self) -> DateTime<Utc> {
        self.do_before
    }

    /// Builds a creation request for `owner`.
    #[must_use]
    pub fn into_create_request(self, owner: OwnerId) -> CreateTaskRequest {
        CreateTaskRequest::new(owner, self.title)
            .with_description(self.description)
            .with_do_before(self.do_before)
    }

    /// Builds an edit request.
    #[must_use]
    pub fn into_edit_request(self) -> EditTaskRequest {
        EditTaskRequest::new(self.title)
            .with_description(self.description)
            .with_do_before(self.do_before)
    }
}

impl TaskForm {
    /// Validates the submitted fields against `now`.
    ///
    /// # Errors
    ///
    /// Returns every failing field with its messages.
    pub fn validate(&self, now: DateTime<Utc>) -> Result<ValidTaskForm, FieldErrors> {
        let mut errors = FieldErrors::new();

        let title = self.title.trim();
        if let Err(err) = TaskTitle::new(title) {
            errors
                .entry("title")
                .or_default()
                .push(title_message(&err));
        }

        let do_before = match parse_do_before(&self.do_before) {
            Ok(deadline) if deadline < now => {
                errors
                    .entry("do_before")
                    .or_default()
                    .push(PAST_DATE_MESSAGE.to_owned());
                None
            }
            Ok(deadline) => Some(deadline),
            Err(message) => {
                errors
                    .entry("do_before")
                    .or_default()
                    .push(message.to_owned());
                None
            }
        };

        match do_before {
            Some(deadline) if errors.is_empty() => Ok(ValidTaskForm {
                title: title.to_owned(),
                description: self.description.trim().to_owned(),
                do_before: deadline,
            }),
            _ => Err(errors),
        }
    }

    /// Reads a JSON object body field by field.
    ///
    /// Absent and `null` fields read as empty and are left to
    /// [`TaskForm::validate`]; any other non-string value is reported against
    /// its field.
    ///
    /// # Errors
    ///
    /// Returns field errors for mistyped fields, or a non-field error when
    /// `body` is not an object.
    pub fn from_json(body: &Value) -> Result<Self, FieldErrors> {
        let Some(object) = body.as_object() else {
            return Err(non_field_errors(NOT_AN_OBJECT_MESSAGE.to_owned()));
        };

        let mut errors = FieldErrors::new();
        let mut read = |field: &'static str, mistyped: &str| match object.get(field) {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(text)) => text.clone(),
            Some(_) => {
                errors.entry(field).or_default().push(mistyped.to_owned());
                String::new()
            }
        };
        let form = Self {
            title: read("title", NOT_A_STRING_MESSAGE),
            description: read("description", NOT_A_STRING_MESSAGE),
            do_before: read("do_before", INVALID_DATE_MESSAGE),
        };

        if errors.is_empty() {
            Ok(form)
        } else {
            Err(errors)
        }
    }

    /// Pre-fills the form from stored values.
    #[must_use]
    pub fn from_values(title: &str, description: &str, do_before: DateTime<Utc>) -> Self {
        Self {
            title: title.to_owned(),
            description: description.to_owned(),
            do_before: format_do_before(do_before),
        }
    }
}

/// Maps a domain validation failure onto the form field it concerns.
#[must_use]
pub fn domain_field_errors(err: &TaskDomainError) -> FieldErrors {
    let (field, message) = match err {
        TaskDomainError::EmptyTitle | TaskDomainError::TitleTooLong { .. } => {
            ("title", title_message(err))
        }
        TaskDomainError::MissingDueDate => ("do_before", REQUIRED_MESSAGE.to_owned()),
        TaskDomainError::DueDateInPast { .. } => ("do_before", PAST_DATE_MESSAGE.to_owned()),
        TaskDomainError::InvalidOwnerId(_) | TaskDomainError::InconsistentCompletion(_) => {
            (NON_FIELD_KEY, err.to_string())
        }
    };
    FieldErrors::from([(field, vec![message])])
}

/// Wraps a message that concerns the whole submission.
#[must_use]
pub fn non_field_errors(message: String) -> FieldErrors {
    FieldErrors::from([(NON_FIELD_KEY, vec![message])])
}

/// Formats a deadline the way the form accepts it back.
#[must_use]
pub fn format_do_before(value: DateTime<Utc>) -> String {
    value.format("%Y-%m-%d %H:%M:%S").to_string()
}

fn title_message(err: &TaskDomainError) -> String {
    match err {
        TaskDomainError::TitleTooLong { max, actual } => {
            format!("Ensure this value has at most {max} characters (it has {actual}).")
        }
        _ => REQUIRED_MESSAGE.to_owned(),
    }
}

fn parse_do_before(raw: &str) -> Result<DateTime<Utc>, &'static str> {
    let value = raw.trim();
    if value.is_empty() {
        return Err(REQUIRED_MESSAGE);
    }
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Ok(parsed.with_timezone(&Utc));
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
        .map(|naive| naive.and_utc())
        .ok_or(INVALID_DATE_MESSAGE)
}
