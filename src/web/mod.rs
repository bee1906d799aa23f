//! HTTP surface: server-rendered pages and the JSON API.
//!
//! Every page is scoped to the owner named by the authentication header;
//! see [`auth`] for how anonymous requests are handled.

mod api;
pub mod auth;
mod error;
pub mod forms;
mod pages;
mod state;
mod templates;

pub use api::TaskDto;
pub use auth::{AuthRejection, AuthSettings, CurrentOwner};
pub use error::WebError;
pub use state::{AppState, WebTaskService};
pub use templates::Templates;

use crate::task::ports::TaskRepository;
use axum::{Router, routing::get};
use tower_http::trace::TraceLayer;

/// Builds the application router over `state`.
#[must_use]
pub fn router<R>(state: AppState<R>) -> Router
where
    R: TaskRepository + 'static,
{
    Router::new()
        .route("/", get(pages::task_list::<R>))
        .route("/done-tasks/", get(pages::done_task_list::<R>))
        .route(
            "/add/",
            get(pages::task_create_form::<R>).post(pages::task_create::<R>),
        )
        .route("/api/", get(api::list_tasks::<R>).post(api::create_task::<R>))
        .route("/{slug}/detail/", get(pages::task_detail::<R>))
        .route(
            "/{slug}/update/",
            get(pages::task_update_form::<R>).post(pages::task_update::<R>),
        )
        .route("/{slug}/delete/", get(pages::task_delete::<R>))
        .route("/{slug}/do/", get(pages::task_do::<R>))
        .route("/{slug}/undo/", get(pages::task_undo::<R>))
        .fallback(pages::not_found::<R>)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
