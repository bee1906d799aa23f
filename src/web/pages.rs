//! HTML page handlers.

use super::{
    auth::CurrentOwner,
    error::WebError,
    forms::{FieldErrors, TaskForm, domain_field_errors},
    state::AppState,
};
use crate::task::{domain::Task, ports::TaskRepository, services::TaskLifecycleError};
use axum::{
    Form,
    extract::{Path, State},
    response::{Html, IntoResponse, Redirect, Response},
};
use chrono::{DateTime, Utc};
use minijinja::context;
use serde::Serialize;

const DISPLAY_FORMAT: &str = "%b %-d, %Y, %H:%M";

/// Template view of a task.
///
/// Slugs hold only alphanumerics and `-`, so templates emit the URLs
/// unescaped.
#[derive(Debug, Serialize)]
struct TaskView {
    title: String,
    description: String,
    slug: String,
    done: bool,
    do_before: String,
    do_before_display: String,
    created_on: String,
    created_on_display: String,
    finished_on: Option<String>,
    finished_on_display: Option<String>,
    detail_url: String,
    do_url: String,
    undo_url: String,
    update_url: String,
    delete_url: String,
}

impl From<&Task> for TaskView {
    fn from(task: &Task) -> Self {
        Self {
            title: task.title().to_string(),
            description: task.description().to_owned(),
            slug: task.slug().to_string(),
            done: task.is_done(),
            do_before: task.do_before().to_rfc3339(),
            do_before_display: display(task.do_before()),
            created_on: task.created_on().to_rfc3339(),
            created_on_display: display(task.created_on()),
            finished_on: task.finished_on().map(|at| at.to_rfc3339()),
            finished_on_display: task.finished_on().map(display),
            detail_url: task.absolute_url(),
            do_url: task.do_url(),
            undo_url: task.undo_url(),
            update_url: task.update_url(),
            delete_url: task.delete_url(),
        }
    }
}

fn display(at: DateTime<Utc>) -> String {
    at.format(DISPLAY_FORMAT).to_string()
}

/// Template view of a bound form.
#[derive(Debug, Serialize)]
struct FormView<'a> {
    title: &'a str,
    description: &'a str,
    do_before: &'a str,
    errors: &'a FieldErrors,
}

fn render_tasks<R>(
    state: &AppState<R>,
    template: &str,
    tasks: &[Task],
) -> Result<Html<String>, WebError>
where
    R: TaskRepository,
{
    let views: Vec<TaskView> = tasks.iter().map(TaskView::from).collect();
    let page = state.templates().render(template, context! { tasks => views })?;
    Ok(Html(page))
}

fn render_form<R>(
    state: &AppState<R>,
    template: &str,
    action: &str,
    form: &TaskForm,
    errors: &FieldErrors,
) -> Result<Response, WebError>
where
    R: TaskRepository,
{
    let view = FormView {
        title: &form.title,
        description: &form.description,
        do_before: &form.do_before,
        errors,
    };
    let page = state
        .templates()
        .render(template, context! { action => action, form => view })?;
    Ok(Html(page).into_response())
}

fn not_found_page<R>(state: &AppState<R>) -> WebError
where
    R: TaskRepository,
{
    state
        .templates()
        .render("not_found.html", context! {})
        .map_or_else(|error| error, WebError::PageNotFound)
}

/// Turns lookup misses into the not-found page.
fn page_error<R>(state: &AppState<R>, error: TaskLifecycleError) -> WebError
where
    R: TaskRepository,
{
    if error.is_not_found() {
        not_found_page(state)
    } else {
        WebError::Lifecycle(error)
    }
}

/// `GET /`
pub(super) async fn task_list<R>(
    State(state): State<AppState<R>>,
    CurrentOwner(owner): CurrentOwner,
) -> Result<Html<String>, WebError>
where
    R: TaskRepository + 'static,
{
    let tasks = state.service().list_active(owner).await?;
    render_tasks(&state, "task_list.html", &tasks)
}

/// `GET /done-tasks/`
pub(super) async fn done_task_list<R>(
    State(state): State<AppState<R>>,
    CurrentOwner(owner): CurrentOwner,
) -> Result<Html<String>, WebError>
where
    R: TaskRepository + 'static,
{
    let tasks = state.service().list_done(owner).await?;
    render_tasks(&state, "done_task_list.html", &tasks)
}

/// `GET /{slug}/detail/`
pub(super) async fn task_detail<R>(
    State(state): State<AppState<R>>,
    CurrentOwner(owner): CurrentOwner,
    Path(slug): Path<String>,
) -> Result<Html<String>, WebError>
where
    R: TaskRepository + 'static,
{
    let task = state
        .service()
        .find(owner, &slug)
        .await
        .map_err(|error| page_error(&state, error))?;
    let page = state
        .templates()
        .render("task_detail.html", context! { task => TaskView::from(&task) })?;
    Ok(Html(page))
}

/// `GET /add/`
#[expect(clippy::unused_async, reason = "axum handlers are async functions")]
pub(super) async fn task_create_form<R>(
    State(state): State<AppState<R>>,
    CurrentOwner(_): CurrentOwner,
) -> Result<Response, WebError>
where
    R: TaskRepository + 'static,
{
    render_form(
        &state,
        "task_create.html",
        "/add/",
        &TaskForm::default(),
        &FieldErrors::new(),
    )
}

/// `POST /add/`
pub(super) async fn task_create<R>(
    State(state): State<AppState<R>>,
    CurrentOwner(owner): CurrentOwner,
    Form(form): Form<TaskForm>,
) -> Result<Response, WebError>
where
    R: TaskRepository + 'static,
{
    let valid = match form.validate(state.service().now()) {
        Ok(valid) => valid,
        Err(errors) => return render_form(&state, "task_create.html", "/add/", &form, &errors),
    };

    match state.service().create(valid.into_create_request(owner)).await {
        Ok(task) => Ok(Redirect::to(&task.absolute_url()).into_response()),
        Err(TaskLifecycleError::Domain(error)) => render_form(
            &state,
            "task_create.html",
            "/add/",
            &form,
            &domain_field_errors(&error),
        ),
        Err(error) => Err(error.into()),
    }
}

/// `GET /{slug}/update/`
pub(super) async fn task_update_form<R>(
    State(state): State<AppState<R>>,
    CurrentOwner(owner): CurrentOwner,
    Path(slug): Path<String>,
) -> Result<Response, WebError>
where
    R: TaskRepository + 'static,
{
    let task = state
        .service()
        .find(owner, &slug)
        .await
        .map_err(|error| page_error(&state, error))?;
    let form = TaskForm::from_values(task.title().as_str(), task.description(), task.do_before());
    render_form(
        &state,
        "task_update.html",
        &task.update_url(),
        &form,
        &FieldErrors::new(),
    )
}

/// `POST /{slug}/update/`
pub(super) async fn task_update<R>(
    State(state): State<AppState<R>>,
    CurrentOwner(owner): CurrentOwner,
    Path(slug): Path<String>,
    Form(form): Form<TaskForm>,
) -> Result<Response, WebError>
where
    R: TaskRepository + 'static,
{
    let task = state
        .service()
        .find(owner, &slug)
        .await
        .map_err(|error| page_error(&state, error))?;
    let action = task.update_url();
    let valid = match form.validate(state.service().now()) {
        Ok(valid) => valid,
        Err(errors) => return render_form(&state, "task_update.html", &action, &form, &errors),
    };

    match state
        .service()
        .edit(owner, task.slug().as_str(), valid.into_edit_request())
        .await
    {
        Ok(edited) => Ok(Redirect::to(&edited.absolute_url()).into_response()),
        Err(TaskLifecycleError::Domain(error)) => render_form(
            &state,
            "task_update.html",
            &action,
            &form,
            &domain_field_errors(&error),
        ),
        Err(error) => Err(page_error(&state, error)),
    }
}

/// `GET /{slug}/delete/`
pub(super) async fn task_delete<R>(
    State(state): State<AppState<R>>,
    CurrentOwner(owner): CurrentOwner,
    Path(slug): Path<String>,
) -> Result<Redirect, WebError>
where
    R: TaskRepository + 'static,
{
    state
        .service()
        .remove(owner, &slug)
        .await
        .map_err(|error| page_error(&state, error))?;
    Ok(Redirect::to("/"))
}

/// `GET /{slug}/do/`
pub(super) async fn task_do<R>(
    State(state): State<AppState<R>>,
    CurrentOwner(owner): CurrentOwner,
    Path(slug): Path<String>,
) -> Result<Redirect, WebError>
where
    R: TaskRepository + 'static,
{
    let task = state
        .service()
        .mark_done(owner, &slug)
        .await
        .map_err(|error| page_error(&state, error))?;
    Ok(Redirect::to(&task.absolute_url()))
}

/// `GET /{slug}/undo/`
pub(super) async fn task_undo<R>(
    State(state): State<AppState<R>>,
    CurrentOwner(owner): CurrentOwner,
    Path(slug): Path<String>,
) -> Result<Redirect, WebError>
where
    R: TaskRepository + 'static,
{
    let task = state
        .service()
        .mark_undone(owner, &slug)
        .await
        .map_err(|error| page_error(&state, error))?;
    Ok(Redirect::to(&task.absolute_url()))
}

/// Fallback for unknown locations.
#[expect(clippy::unused_async, reason = "axum handlers are async functions")]
pub(super) async fn not_found<R>(State(state): State<AppState<R>>) -> WebError
where
    R: TaskRepository + 'static,
{
    not_found_page(&state)
}
