//! Error types for task domain validation and parsing.

use super::TaskId;
use chrono::{DateTime, Utc};
use thiserror::Error;

/// Errors returned while constructing or mutating domain task values.
///
/// Input variants are surfaced as field-level messages.
/// [`TaskDomainError::InconsistentCompletion`] only arises while rebuilding a
/// stored row and reaches callers wrapped as a persistence failure.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TaskDomainError {
    /// The task title is empty after trimming.
    #[error("task title must not be empty")]
    EmptyTitle,

    /// The task title exceeds the persisted column width.
    #[error("task title has {actual} characters, at most {max} are allowed")]
    TitleTooLong {
        /// Maximum number of characters.
        max: usize,
        /// Number of characters supplied.
        actual: usize,
    },

    /// No `do_before` deadline was supplied.
    #[error("a \"do before\" date is required")]
    MissingDueDate,

    /// The `do_before` deadline lies before the current time.
    #[error("\"do before\" date can not be in the past")]
    DueDateInPast {
        /// Rejected deadline.
        do_before: DateTime<Utc>,
        /// Clock reading the deadline was compared against.
        now: DateTime<Utc>,
    },

    /// The owner identifier is not a valid UUID.
    #[error("invalid owner identifier '{0}'")]
    InvalidOwnerId(String),

    /// A persisted record disagrees about its completion state.
    #[error("task {0} has inconsistent done/finished_on columns")]
    InconsistentCompletion(TaskId),
}

/// Error returned while parsing a slug policy from configuration.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown slug policy: {0}, expected 'unicode' or 'ascii'")]
pub struct ParseSlugPolicyError(pub String);
