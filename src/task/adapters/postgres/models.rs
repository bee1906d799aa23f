//! Diesel row models for task persistence.

use super::schema::tasks;
use chrono::{DateTime, Utc};
use diesel::prelude::*;

/// Query result row for task records.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = tasks)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TaskRow {
    /// Task identifier.
    pub id: i64,
    /// Owning user account.
    pub owner_id: uuid::Uuid,
    /// Task title.
    pub title: String,
    /// Unique slug.
    pub slug: String,
    /// Free-text description.
    pub description: String,
    /// Creation timestamp.
    pub created_on: DateTime<Utc>,
    /// Last mutation timestamp.
    pub updated_on: DateTime<Utc>,
    /// Deadline.
    pub do_before: DateTime<Utc>,
    /// Completion timestamp.
    pub finished_on: Option<DateTime<Utc>>,
    /// Completion flag.
    pub done: bool,
}

/// Insert model for task records; the identifier comes from the sequence.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = tasks)]
pub struct NewTaskRow {
    /// Owning user account.
    pub owner_id: uuid::Uuid,
    /// Task title.
    pub title: String,
    /// Unique slug.
    pub slug: String,
    /// Free-text description.
    pub description: String,
    /// Creation timestamp.
    pub created_on: DateTime<Utc>,
    /// Last mutation timestamp.
    pub updated_on: DateTime<Utc>,
    /// Deadline.
    pub do_before: DateTime<Utc>,
    /// Completion timestamp.
    pub finished_on: Option<DateTime<Utc>>,
    /// Completion flag.
    pub done: bool,
}

/// Changeset for the mutable task columns.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = tasks)]
#[diesel(treat_none_as_null = true)]
pub struct TaskChangeset {
    /// Task title.
    pub title: String,
    /// Free-text description.
    pub description: String,
    /// Last mutation timestamp.
    pub updated_on: DateTime<Utc>,
    /// Deadline.
    pub do_before: DateTime<Utc>,
    /// Completion timestamp; `None` clears the column.
    pub finished_on: Option<DateTime<Utc>>,
    /// Completion flag.
    pub done: bool,
}
