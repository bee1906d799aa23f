//! `PostgreSQL` repository implementation for task storage.

use super::{
    models::{NewTaskRow, TaskChangeset, TaskRow},
    schema::tasks,
};
use crate::task::{
    domain::{
        NewTask, OwnerId, PersistedTaskData, SlugPolicy, Task, TaskDomainError, TaskId, TaskSlug,
        TaskTitle, generate_slug, next_sequence,
    },
    ports::{TaskRepository, TaskRepositoryError, TaskRepositoryResult},
};
use async_trait::async_trait;
use diesel::connection::SimpleConnection;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::result::{DatabaseErrorInformation, DatabaseErrorKind, Error as DieselError};
use diesel::sql_types::Text;

/// `PostgreSQL` connection pool type used by task adapters.
pub type TaskPgPool = Pool<ConnectionManager<PgConnection>>;

/// Schema for the `tasks` table.
const CREATE_TASKS_SQL: &str =
    include_str!("../../../../migrations/2026-10-19-000000_create_tasks/up.sql");

const SLUG_UNIQUE_INDEX: &str = "idx_tasks_slug_unique";

diesel::define_sql_function! {
    /// `PostgreSQL` `lower()` for case-insensitive slug matching.
    fn lower(value: Text) -> Text;
}

/// `PostgreSQL`-backed task repository.
#[derive(Debug, Clone)]
pub struct PostgresTaskRepository {
    pool: TaskPgPool,
    slug_policy: SlugPolicy,
}

impl PostgresTaskRepository {
    /// Creates a new repository from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: TaskPgPool) -> Self {
        Self {
            pool,
            slug_policy: SlugPolicy::Unicode,
        }
    }

    /// Sets the normalization policy used for new slugs.
    #[must_use]
    pub const fn with_slug_policy(mut self, slug_policy: SlugPolicy) -> Self {
        self.slug_policy = slug_policy;
        self
    }

    /// Creates the `tasks` table and its indexes when they are missing.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::Persistence`] when the DDL fails.
    pub async fn apply_schema(&self) -> TaskRepositoryResult<()> {
        self.run_blocking(|connection| {
            connection
                .batch_execute(CREATE_TASKS_SQL)
                .map_err(TaskRepositoryError::persistence)
        })
        .await
    }

    async fn run_blocking<F, T>(&self, f: F) -> TaskRepositoryResult<T>
    where
        F: FnOnce(&mut PgConnection) -> TaskRepositoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(TaskRepositoryError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(TaskRepositoryError::persistence)?
    }
}

#[async_trait]
impl TaskRepository for PostgresTaskRepository {
    async fn create(&self, new_task: &NewTask) -> TaskRepositoryResult<Task> {
        let pending = new_task.clone();
        let slug_policy = self.slug_policy;

        self.run_blocking(move |connection| {
            // The unique index on lower(slug) settles races between this read
            // and the insert below.
            let latest = tasks::table
                .select(tasks::id)
                .order(tasks::id.desc())
                .first::<i64>(connection)
                .optional()
                .map_err(TaskRepositoryError::persistence)?;
            let slug = generate_slug(
                pending.title().as_str(),
                next_sequence(latest.map(TaskId::new)),
                slug_policy,
            );

            let row = to_new_row(&pending, &slug);
            let inserted = diesel::insert_into(tasks::table)
                .values(&row)
                .returning(TaskRow::as_returning())
                .get_result::<TaskRow>(connection)
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, ref info)
                        if is_slug_unique_violation(info.as_ref()) =>
                    {
                        TaskRepositoryError::DuplicateSlug(slug.clone())
                    }
                    _ => TaskRepositoryError::persistence(err),
                })?;

            row_to_task(inserted)
        })
        .await
    }

    async fn find_by_slug(&self, owner: OwnerId, slug: &str) -> TaskRepositoryResult<Task> {
        let lookup = slug.to_owned();
        self.run_blocking(move |connection| {
            let row = tasks::table
                .filter(tasks::owner_id.eq(owner.into_inner()))
                .filter(lower(tasks::slug).eq(lower(lookup)))
                .select(TaskRow::as_select())
                .first::<TaskRow>(connection)
                .optional()
                .map_err(TaskRepositoryError::persistence)?;
            row.map_or(Err(TaskRepositoryError::NotFound), row_to_task)
        })
        .await
    }

    async fn list_active(&self, owner: OwnerId) -> TaskRepositoryResult<Vec<Task>> {
        self.run_blocking(move |connection| load_owned(connection, owner, false))
            .await
    }

    async fn list_done(&self, owner: OwnerId) -> TaskRepositoryResult<Vec<Task>> {
        self.run_blocking(move |connection| load_owned(connection, owner, true))
            .await
    }

    async fn list_all(&self) -> TaskRepositoryResult<Vec<Task>> {
        self.run_blocking(|connection| {
            let rows = tasks::table
                .order((tasks::do_before.asc(), tasks::id.asc()))
                .select(TaskRow::as_select())
                .load::<TaskRow>(connection)
                .map_err(TaskRepositoryError::persistence)?;
            rows.into_iter().map(row_to_task).collect()
        })
        .await
    }

    async fn update(&self, task: &Task) -> TaskRepositoryResult<()> {
        let task_id = task.id().value();
        let owner = task.owner().into_inner();
        let slug = task.slug().as_str().to_owned();
        let changeset = to_changeset(task);

        self.run_blocking(move |connection| {
            let (stored_owner, stored_slug) = tasks::table
                .filter(tasks::id.eq(task_id))
                .select((tasks::owner_id, tasks::slug))
                .first::<(uuid::Uuid, String)>(connection)
                .optional()
                .map_err(TaskRepositoryError::persistence)?
                .ok_or(TaskRepositoryError::NotFound)?;

            if stored_owner != owner {
                return Err(TaskRepositoryError::ImmutableField("owner"));
            }
            if stored_slug != slug {
                return Err(TaskRepositoryError::ImmutableField("slug"));
            }

            let updated = diesel::update(tasks::table.filter(tasks::id.eq(task_id)))
                .set(&changeset)
                .execute(connection)
                .map_err(TaskRepositoryError::persistence)?;
            if updated == 0 {
                return Err(TaskRepositoryError::NotFound);
            }
            Ok(())
        })
        .await
    }

    async fn delete(&self, task: &Task) -> TaskRepositoryResult<()> {
        let task_id = task.id().value();
        let owner = task.owner().into_inner();
        self.run_blocking(move |connection| {
            let deleted = diesel::delete(
                tasks::table
                    .filter(tasks::id.eq(task_id))
                    .filter(tasks::owner_id.eq(owner)),
            )
            .execute(connection)
            .map_err(TaskRepositoryError::persistence)?;
            if deleted == 0 {
                return Err(TaskRepositoryError::NotFound);
            }
            Ok(())
        })
        .await
    }
}

fn load_owned(
    connection: &mut PgConnection,
    owner: OwnerId,
    done: bool,
) -> TaskRepositoryResult<Vec<Task>> {
    let rows = tasks::table
        .filter(tasks::owner_id.eq(owner.into_inner()))
        .filter(tasks::done.eq(done))
        .order((tasks::do_before.asc(), tasks::id.asc()))
        .select(TaskRow::as_select())
        .load::<TaskRow>(connection)
        .map_err(TaskRepositoryError::persistence)?;
    rows.into_iter().map(row_to_task).collect()
}

fn to_new_row(new_task: &NewTask, slug: &TaskSlug) -> NewTaskRow {
    NewTaskRow {
        owner_id: new_task.owner().into_inner(),
        title: new_task.title().as_str().to_owned(),
        slug: slug.as_str().to_owned(),
        description: new_task.description().to_owned(),
        created_on: new_task.created_on(),
        updated_on: new_task.created_on(),
        do_before: new_task.do_before(),
        finished_on: None,
        done: false,
    }
}

fn to_changeset(task: &Task) -> TaskChangeset {
    TaskChangeset {
        title: task.title().as_str().to_owned(),
        description: task.description().to_owned(),
        updated_on: task.updated_on(),
        do_before: task.do_before(),
        finished_on: task.finished_on(),
        done: task.is_done(),
    }
}

fn row_to_task(row: TaskRow) -> TaskRepositoryResult<Task> {
    let TaskRow {
        id,
        owner_id,
        title: persisted_title,
        slug,
        description,
        created_on,
        updated_on,
        do_before,
        finished_on,
        done,
    } = row;

    let task_id = TaskId::new(id);
    if done != finished_on.is_some() {
        return Err(TaskRepositoryError::persistence(
            TaskDomainError::InconsistentCompletion(task_id),
        ));
    }
    let title = TaskTitle::new(persisted_title).map_err(TaskRepositoryError::persistence)?;

    Ok(Task::from_persisted(PersistedTaskData {
        id: task_id,
        owner: OwnerId::from_uuid(owner_id),
        title,
        slug: TaskSlug::from_persisted(slug),
        description,
        do_before,
        finished_on,
        created_on,
        updated_on,
    }))
}

fn is_slug_unique_violation(info: &dyn DatabaseErrorInformation) -> bool {
    info.constraint_name()
        .is_some_and(|name| name == SLUG_UNIQUE_INDEX)
}
