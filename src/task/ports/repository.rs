//! Repository port for owner-scoped task persistence.

use crate::task::domain::{NewTask, OwnerId, Task, TaskSlug};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for task repository operations.
pub type TaskRepositoryResult<T> = Result<T, TaskRepositoryError>;

/// Task persistence contract.
///
/// Every lookup is scoped by owner. A task that exists but belongs to someone
/// else is reported exactly like a task that does not exist.
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Stores a new task, allocating its identifier and slug.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::DuplicateSlug`] when the derived slug is
    /// already taken, which only happens when two creations race.
    async fn create(&self, new_task: &NewTask) -> TaskRepositoryResult<Task>;

    /// Finds an owner's task by slug, ignoring case.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::NotFound`] when no task with that slug
    /// belongs to `owner`.
    async fn find_by_slug(&self, owner: OwnerId, slug: &str) -> TaskRepositoryResult<Task>;

    /// Returns the owner's tasks that are not done, earliest deadline first.
    async fn list_active(&self, owner: OwnerId) -> TaskRepositoryResult<Vec<Task>>;

    /// Returns the owner's done tasks, earliest deadline first.
    async fn list_done(&self, owner: OwnerId) -> TaskRepositoryResult<Vec<Task>>;

    /// Returns every stored task regardless of owner, earliest deadline first.
    async fn list_all(&self) -> TaskRepositoryResult<Vec<Task>>;

    /// Persists title, description, deadline, completion state, and
    /// `updated_on` of an existing task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::NotFound`] when the task no longer
    /// exists and [`TaskRepositoryError::ImmutableField`] when the slug or
    /// owner differs from the stored record.
    async fn update(&self, task: &Task) -> TaskRepositoryResult<()>;

    /// Permanently removes a task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::NotFound`] when the task was already
    /// removed.
    async fn delete(&self, task: &Task) -> TaskRepositoryResult<()>;
}

/// Errors returned by task repository implementations.
#[derive(Debug, Clone, Error)]
pub enum TaskRepositoryError {
    /// No task matched within the caller's scope.
    #[error("task not found")]
    NotFound,

    /// The derived slug collides with an existing task.
    #[error("duplicate task slug: {0}")]
    DuplicateSlug(TaskSlug),

    /// An update attempted to change a field fixed at creation.
    #[error("task field '{0}' can not be changed")]
    ImmutableField(&'static str),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl TaskRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
