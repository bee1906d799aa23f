//! Task aggregate root and related lifecycle types.

use super::{OwnerId, TaskDomainError, TaskId, TaskSlug, TaskTitle};
use chrono::{DateTime, Utc};
use mockable::Clock;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Bytes escaped when a slug is placed in a path segment. Unicode slugs
/// are emitted as percent-encoded UTF-8 so locations stay valid URIs.
const SEGMENT_ESCAPES: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Task lifecycle state.
///
/// Transitions are reversible; there is no terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskState {
    /// Task still has to be done.
    Active,
    /// Task has been marked as done.
    Done,
}

impl TaskState {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Done => "done",
        }
    }
}

/// Checks a `do_before` deadline against the current time.
///
/// The boundary is inclusive: a deadline equal to `now` is accepted.
///
/// # Errors
///
/// Returns [`TaskDomainError::MissingDueDate`] when no deadline is given and
/// [`TaskDomainError::DueDateInPast`] when it lies before `now`.
pub fn validate_do_before(
    do_before: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> Result<DateTime<Utc>, TaskDomainError> {
    let deadline = do_before.ok_or(TaskDomainError::MissingDueDate)?;
    if deadline < now {
        return Err(TaskDomainError::DueDateInPast {
            do_before: deadline,
            now,
        });
    }
    Ok(deadline)
}

/// Task aggregate root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    id: TaskId,
    owner: OwnerId,
    title: TaskTitle,
    slug: TaskSlug,
    description: String,
    do_before: DateTime<Utc>,
    finished_on: Option<DateTime<Utc>>,
    created_on: DateTime<Utc>,
    updated_on: DateTime<Utc>,
}

/// Validated input for a task that has not been stored yet.
///
/// The repository turns this into a [`Task`] by assigning an identifier and a
/// slug.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    owner: OwnerId,
    title: TaskTitle,
    description: String,
    do_before: DateTime<Utc>,
    created_on: DateTime<Utc>,
}

impl NewTask {
    /// Creates a new-task value stamped with the current clock time.
    #[must_use]
    pub fn new(
        owner: OwnerId,
        title: TaskTitle,
        do_before: DateTime<Utc>,
        clock: &impl Clock,
    ) -> Self {
        Self {
            owner,
            title,
            description: String::new(),
            do_before,
            created_on: clock.utc(),
        }
    }

    /// Sets the task description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Returns the owning user.
    #[must_use]
    pub const fn owner(&self) -> OwnerId {
        self.owner
    }

    /// Returns the title.
    #[must_use]
    pub const fn title(&self) -> &TaskTitle {
        &self.title
    }

    /// Returns the description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the deadline.
    #[must_use]
    pub const fn do_before(&self) -> DateTime<Utc> {
        self.do_before
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_on(&self) -> DateTime<Utc> {
        self.created_on
    }

    /// Materializes the stored task once the repository has allocated its
    /// identifier and slug.
    #[must_use]
    pub fn into_task(self, id: TaskId, slug: TaskSlug) -> Task {
        Task {
            id,
            owner: self.owner,
            title: self.title,
            slug,
            description: self.description,
            do_before: self.do_before,
            finished_on: None,
            created_on: self.created_on,
            updated_on: self.created_on,
        }
    }
}

/// Parameter object for reconstructing a persisted task aggregate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedTaskData {
    /// Persisted task identifier.
    pub id: TaskId,
    /// Persisted owner.
    pub owner: OwnerId,
    /// Persisted title.
    pub title: TaskTitle,
    /// Persisted slug.
    pub slug: TaskSlug,
    /// Persisted description.
    pub description: String,
    /// Persisted deadline.
    pub do_before: DateTime<Utc>,
    /// Persisted completion timestamp, if done.
    pub finished_on: Option<DateTime<Utc>>,
    /// Persisted creation timestamp.
    pub created_on: DateTime<Utc>,
    /// Persisted latest mutation timestamp.
    pub updated_on: DateTime<Utc>,
}

/// Editable task fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskChanges {
    /// Replacement title.
    pub title: TaskTitle,
    /// Replacement description.
    pub description: String,
    /// Replacement deadline.
    pub do_before: DateTime<Utc>,
}

impl Task {
    /// Reconstructs a task from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedTaskData) -> Self {
        Self {
            id: data.id,
            owner: data.owner,
            title: data.title,
            slug: data.slug,
            description: data.description,
            do_before: data.do_before,
            finished_on: data.finished_on,
            created_on: data.created_on,
            updated_on: data.updated_on,
        }
    }

    /// Returns the task identifier.
    #[must_use]
    pub const fn id(&self) -> TaskId {
        self.id
    }

    /// Returns the owning user.
    #[must_use]
    pub const fn owner(&self) -> OwnerId {
        self.owner
    }

    /// Returns `true` when `owner` owns this task.
    #[must_use]
    pub fn is_owned_by(&self, owner: OwnerId) -> bool {
        self.owner == owner
    }

    /// Returns the title.
    #[must_use]
    pub const fn title(&self) -> &TaskTitle {
        &self.title
    }

    /// Returns the slug.
    #[must_use]
    pub const fn slug(&self) -> &TaskSlug {
        &self.slug
    }

    /// Returns the description, empty when none was given.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the deadline.
    #[must_use]
    pub const fn do_before(&self) -> DateTime<Utc> {
        self.do_before
    }

    /// Returns when the task was marked done, if it is done.
    #[must_use]
    pub const fn finished_on(&self) -> Option<DateTime<Utc>> {
        self.finished_on
    }

    /// Returns `true` when the task is done.
    #[must_use]
    pub const fn is_done(&self) -> bool {
        self.finished_on.is_some()
    }

    /// Returns the lifecycle state.
    #[must_use]
    pub const fn state(&self) -> TaskState {
        if self.is_done() {
            TaskState::Done
        } else {
            TaskState::Active
        }
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_on(&self) -> DateTime<Utc> {
        self.created_on
    }

    /// Returns the latest mutation timestamp.
    #[must_use]
    pub const fn updated_on(&self) -> DateTime<Utc> {
        self.updated_on
    }

    /// Marks the task as done at the current clock time.
    ///
    /// Calling this on a task that is already done moves `finished_on`
    /// forward.
    pub fn mark_done(&mut self, clock: &impl Clock) {
        let now = clock.utc();
        self.finished_on = Some(now);
        self.updated_on = now;
    }

    /// Returns the task to the active state.
    pub fn mark_undone(&mut self, clock: &impl Clock) {
        self.finished_on = None;
        self.touch(clock);
    }

    /// Replaces the editable fields.
    ///
    /// Deadline validation against the clock is the caller's responsibility;
    /// see [`validate_do_before`].
    pub fn apply_changes(&mut self, changes: TaskChanges, clock: &impl Clock) {
        self.title = changes.title;
        self.description = changes.description;
        self.do_before = changes.do_before;
        self.touch(clock);
    }

    /// Returns the canonical detail location, `/{slug}/detail/`, with the
    /// slug percent-encoded.
    #[must_use]
    pub fn absolute_url(&self) -> String {
        self.action_url("detail")
    }

    /// Returns the edit location.
    #[must_use]
    pub fn update_url(&self) -> String {
        self.action_url("update")
    }

    /// Returns the delete location.
    #[must_use]
    pub fn delete_url(&self) -> String {
        self.action_url("delete")
    }

    /// Returns the mark-done location.
    #[must_use]
    pub fn do_url(&self) -> String {
        self.action_url("do")
    }

    /// Returns the mark-undone location.
    #[must_use]
    pub fn undo_url(&self) -> String {
        self.action_url("undo")
    }

    fn action_url(&self, action: &str) -> String {
        let segment = utf8_percent_encode(self.slug.as_str(), SEGMENT_ESCAPES);
        format!("/{segment}/{action}/")
    }

    fn touch(&mut self, clock: &impl Clock) {
        self.updated_on = clock.utc();
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.title, f)
    }
}
