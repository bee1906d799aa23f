//! JSON API handlers.

use super::{
    auth::CurrentOwner,
    error::WebError,
    forms::{TaskForm, non_field_errors},
    state::AppState,
};
use crate::task::{domain::Task, ports::TaskRepository};
use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Serialized task representation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskDto {
    /// Task title.
    pub title: String,
    /// Free-form description, empty when none was given.
    pub description: String,
    /// Public slug.
    pub slug: String,
    /// Creation timestamp.
    pub created_on: DateTime<Utc>,
    /// Latest mutation timestamp.
    pub updated_on: DateTime<Utc>,
    /// Deadline.
    pub do_before: DateTime<Utc>,
    /// Whether the task is done.
    pub done: bool,
    /// Completion timestamp, if done.
    pub finished_on: Option<DateTime<Utc>>,
}

impl From<&Task> for TaskDto {
    fn from(task: &Task) -> Self {
        Self {
            title: task.title().to_string(),
            description: task.description().to_owned(),
            slug: task.slug().to_string(),
            created_on: task.created_on(),
            updated_on: task.updated_on(),
            do_before: task.do_before(),
            done: task.is_done(),
            finished_on: task.finished_on(),
        }
    }
}

/// `GET /api/`
///
/// Lists every stored task, not only the requester's.
pub(super) async fn list_tasks<R>(
    State(state): State<AppState<R>>,
) -> Result<Json<Vec<TaskDto>>, WebError>
where
    R: TaskRepository + 'static,
{
    let tasks = state.service().list_all().await?;
    Ok(Json(tasks.iter().map(TaskDto::from).collect()))
}

/// `POST /api/`
///
/// Every unusable body, including a wrong content type or malformed JSON,
/// is answered with 400 and an `errors` object.
pub(super) async fn create_task<R>(
    State(state): State<AppState<R>>,
    CurrentOwner(owner): CurrentOwner,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<TaskDto>), WebError>
where
    R: TaskRepository + 'static,
{
    let Json(body) = payload.map_err(|rejection| {
        tracing::debug!(status = %rejection.status(), "rejected task payload");
        WebError::InvalidInput(non_field_errors(rejection.body_text()))
    })?;
    let form = TaskForm::from_json(&body).map_err(WebError::InvalidInput)?;
    let valid = form
        .validate(state.service().now())
        .map_err(WebError::InvalidInput)?;
    let task = state
        .service()
        .create(valid.into_create_request(owner))
        .await?;
    Ok((StatusCode::CREATED, Json(TaskDto::from(&task))))
}
