//! In-memory task repository.

use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::task::{
    domain::{NewTask, OwnerId, SlugPolicy, Task, TaskId, fold_slug, generate_slug, next_sequence},
    ports::{TaskRepository, TaskRepositoryError, TaskRepositoryResult},
};

/// Thread-safe in-memory task repository.
///
/// Identifier allocation and slug derivation happen under one write lock, so
/// concurrent creations through the same instance never collide.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTaskRepository {
    state: Arc<RwLock<InMemoryTaskState>>,
    slug_policy: SlugPolicy,
}

#[derive(Debug, Default)]
struct InMemoryTaskState {
    tasks: BTreeMap<TaskId, Task>,
    slug_index: HashMap<String, TaskId>,
    last_issued_id: i64,
}

impl InMemoryTaskRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the normalization policy used for new slugs.
    #[must_use]
    pub const fn with_slug_policy(mut self, slug_policy: SlugPolicy) -> Self {
        self.slug_policy = slug_policy;
        self
    }

    fn read(&self) -> TaskRepositoryResult<RwLockReadGuard<'_, InMemoryTaskState>> {
        self.state.read().map_err(|err| {
            TaskRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })
    }

    fn write(&self) -> TaskRepositoryResult<RwLockWriteGuard<'_, InMemoryTaskState>> {
        self.state.write().map_err(|err| {
            TaskRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })
    }
}

/// Collects matching tasks ordered by deadline, then creation order.
fn collect_sorted<'a>(tasks: impl Iterator<Item = &'a Task>) -> Vec<Task> {
    let mut selected: Vec<Task> = tasks.cloned().collect();
    selected.sort_by_key(|task| (task.do_before(), task.id()));
    selected
}

#[async_trait]
impl TaskRepository for InMemoryTaskRepository {
    async fn create(&self, new_task: &NewTask) -> TaskRepositoryResult<Task> {
        let mut state = self.write()?;

        let latest = state.tasks.keys().next_back().copied();
        let slug = generate_slug(
            new_task.title().as_str(),
            next_sequence(latest),
            self.slug_policy,
        );
        let slug_key = slug.lookup_key();
        if state.slug_index.contains_key(&slug_key) {
            return Err(TaskRepositoryError::DuplicateSlug(slug));
        }

        state.last_issued_id = state.last_issued_id.saturating_add(1);
        let id = TaskId::new(state.last_issued_id);
        let task = new_task.clone().into_task(id, slug);
        state.slug_index.insert(slug_key, id);
        state.tasks.insert(id, task.clone());
        Ok(task)
    }

    async fn find_by_slug(&self, owner: OwnerId, slug: &str) -> TaskRepositoryResult<Task> {
        let state = self.read()?;
        state
            .slug_index
            .get(&fold_slug(slug))
            .and_then(|id| state.tasks.get(id))
            .filter(|task| task.is_owned_by(owner))
            .cloned()
            .ok_or(TaskRepositoryError::NotFound)
    }

    async fn list_active(&self, owner: OwnerId) -> TaskRepositoryResult<Vec<Task>> {
        let state = self.read()?;
        Ok(collect_sorted(
            state
                .tasks
                .values()
                .filter(|task| task.is_owned_by(owner) && !task.is_done()),
        ))
    }

    async fn list_done(&self, owner: OwnerId) -> TaskRepositoryResult<Vec<Task>> {
        let state = self.read()?;
        Ok(collect_sorted(
            state
                .tasks
                .values()
                .filter(|task| task.is_owned_by(owner) && task.is_done()),
        ))
    }

    async fn list_all(&self) -> TaskRepositoryResult<Vec<Task>> {
        let state = self.read()?;
        Ok(collect_sorted(state.tasks.values()))
    }

    async fn update(&self, task: &Task) -> TaskRepositoryResult<()> {
        let mut state = self.write()?;
        let stored = state
            .tasks
            .get_mut(&task.id())
            .ok_or(TaskRepositoryError::NotFound)?;

        if stored.owner() != task.owner() {
            return Err(TaskRepositoryError::ImmutableField("owner"));
        }
        if stored.slug() != task.slug() {
            return Err(TaskRepositoryError::ImmutableField("slug"));
        }

        *stored = task.clone();
        Ok(())
    }

    async fn delete(&self, task: &Task) -> TaskRepositoryResult<()> {
        let mut state = self.write()?;
        let removed = state
            .tasks
            .remove(&task.id())
            .ok_or(TaskRepositoryError::NotFound)?;
        state.slug_index.remove(&removed.slug().lookup_key());
        Ok(())
    }
}
