//! Service layer for task creation, editing, completion, and removal.

use crate::task::{
    domain::{
        NewTask, OwnerId, Task, TaskChanges, TaskDomainError, TaskTitle, validate_do_before,
    },
    ports::{TaskRepository, TaskRepositoryError},
};
use chrono::{DateTime, Utc};
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;

/// Request payload for creating a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateTaskRequest {
    owner: OwnerId,
    title: String,
    description: String,
    do_before: Option<DateTime<Utc>>,
}

impl CreateTaskRequest {
    /// Creates a request with the required owner and title.
    #[must_use]
    pub fn new(owner: OwnerId, title: impl Into<String>) -> Self {
        Self {
            owner,
            title: title.into(),
            description: String::new(),
            do_before: None,
        }
    }

    /// Sets the task description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Sets the task deadline.
    #[must_use]
    pub const fn with_do_before(mut self, do_before: DateTime<Utc>) -> Self {
        self.do_before = Some(do_before);
        self
    }
}

/// Request payload for editing a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditTaskRequest {
    title: String,
    description: String,
    do_before: Option<DateTime<Utc>>,
}

impl EditTaskRequest {
    /// Creates an edit request with the replacement title.
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: String::new(),
            do_before: None,
        }
    }

    /// Sets the replacement description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Sets the replacement deadline.
    #[must_use]
    pub const fn with_do_before(mut self, do_before: DateTime<Utc>) -> Self {
        self.do_before = Some(do_before);
        self
    }
}

/// Service-level errors for task lifecycle operations.
#[derive(Debug, Error)]
pub enum TaskLifecycleError {
    /// Input validation failed.
    #[error(transparent)]
    Domain(#[from] TaskDomainError),
    /// Repository operation failed.
    #[error(transparent)]
    Repository(#[from] TaskRepositoryError),
}

impl TaskLifecycleError {
    /// Returns `true` when the task is missing or belongs to another owner.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::Repository(TaskRepositoryError::NotFound))
    }

    /// Returns `true` for input the caller can correct.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::Domain(_))
    }
}

/// Result type for task lifecycle service operations.
pub type TaskLifecycleResult<T> = Result<T, TaskLifecycleError>;

/// Task lifecycle orchestration service.
///
/// Every operation takes the acting owner explicitly; lookups outside that
/// owner's scope fail with [`TaskRepositoryError::NotFound`].
pub struct TaskLifecycleService<R, C>
where
    R: TaskRepository,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    clock: Arc<C>,
}

impl<R, C> Clone for TaskLifecycleService<R, C>
where
    R: TaskRepository,
    C: Clock + Send + Sync,
{
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<R, C> TaskLifecycleService<R, C>
where
    R: TaskRepository,
    C: Clock + Send + Sync,
{
    /// Creates a new task lifecycle service.
    #[must_use]
    pub const fn new(repository: Arc<R>, clock: Arc<C>) -> Self {
        Self { repository, clock }
    }

    /// Returns the current time according to the service clock.
    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.utc()
    }

    /// Creates a new active task.
    ///
    /// A slug collision caused by a concurrent creation is retried once with
    /// a freshly computed sequence number.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Domain`] when the title is blank or the
    /// deadline is missing or in the past, and
    /// [`TaskLifecycleError::Repository`] when persistence fails.
    pub async fn create(&self, request: CreateTaskRequest) -> TaskLifecycleResult<Task> {
        let title = TaskTitle::new(request.title)?;
        let do_before = validate_do_before(request.do_before, self.clock.utc())?;
        let new_task = NewTask::new(request.owner, title, do_before, &*self.clock)
            .with_description(request.description);

        let task = match self.repository.create(&new_task).await {
            Err(TaskRepositoryError::DuplicateSlug(slug)) => {
                tracing::warn!(
                    owner = %new_task.owner(),
                    %slug,
                    "slug collision while creating task, retrying"
                );
                self.repository.create(&new_task).await?
            }
            result => result?,
        };

        tracing::info!(owner = %task.owner(), slug = %task.slug(), "task created");
        Ok(task)
    }

    /// Finds one of the owner's tasks by slug.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Repository`] with
    /// [`TaskRepositoryError::NotFound`] when the owner has no such task.
    pub async fn find(&self, owner: OwnerId, slug: &str) -> TaskLifecycleResult<Task> {
        Ok(self.repository.find_by_slug(owner, slug).await?)
    }

    /// Lists the owner's active tasks, earliest deadline first.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Repository`] when the lookup fails.
    pub async fn list_active(&self, owner: OwnerId) -> TaskLifecycleResult<Vec<Task>> {
        Ok(self.repository.list_active(owner).await?)
    }

    /// Lists the owner's done tasks, earliest deadline first.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Repository`] when the lookup fails.
    pub async fn list_done(&self, owner: OwnerId) -> TaskLifecycleResult<Vec<Task>> {
        Ok(self.repository.list_done(owner).await?)
    }

    /// Lists every task of every owner.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Repository`] when the lookup fails.
    pub async fn list_all(&self) -> TaskLifecycleResult<Vec<Task>> {
        Ok(self.repository.list_all().await?)
    }

    /// Marks one of the owner's tasks as done.
    ///
    /// Marking a task that is already done refreshes `finished_on`.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Repository`] when the task is not found
    /// or persistence fails.
    pub async fn mark_done(&self, owner: OwnerId, slug: &str) -> TaskLifecycleResult<Task> {
        let mut task = self.find(owner, slug).await?;
        task.mark_done(&*self.clock);
        self.repository.update(&task).await?;
        tracing::info!(%owner, slug = %task.slug(), "task marked done");
        Ok(task)
    }

    /// Returns one of the owner's tasks to the active state.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Repository`] when the task is not found
    /// or persistence fails.
    pub async fn mark_undone(&self, owner: OwnerId, slug: &str) -> TaskLifecycleResult<Task> {
        let mut task = self.find(owner, slug).await?;
        task.mark_undone(&*self.clock);
        self.repository.update(&task).await?;
        tracing::info!(%owner, slug = %task.slug(), "task marked undone");
        Ok(task)
    }

    /// Replaces the title, description, and deadline of one of the owner's
    /// tasks.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Repository`] when the task is not found
    /// or persistence fails, and [`TaskLifecycleError::Domain`] for a blank
    /// title or a missing or past deadline on a task the owner holds.
    pub async fn edit(
        &self,
        owner: OwnerId,
        slug: &str,
        request: EditTaskRequest,
    ) -> TaskLifecycleResult<Task> {
        let mut task = self.find(owner, slug).await?;
        let changes = TaskChanges {
            title: TaskTitle::new(request.title)?,
            description: request.description,
            do_before: validate_do_before(request.do_before, self.clock.utc())?,
        };
        task.apply_changes(changes, &*self.clock);
        self.repository.update(&task).await?;
        tracing::info!(%owner, slug = %task.slug(), "task edited");
        Ok(task)
    }

    /// Permanently removes one of the owner's tasks.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Repository`] when the task is not found
    /// or persistence fails.
    pub async fn remove(&self, owner: OwnerId, slug: &str) -> TaskLifecycleResult<Task> {
        let task = self.find(owner, slug).await?;
        self.repository.delete(&task).await?;
        tracing::info!(%owner, slug = %task.slug(), "task removed");
        Ok(task)
    }
}
