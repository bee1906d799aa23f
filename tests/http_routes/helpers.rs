//! Shared helpers for HTTP integration tests.

use axum::{
    Router,
    body::Body,
    http::{Method, Request, Response, StatusCode, header},
};
use chrono::{Duration, Utc};
use http_body_util::BodyExt;
use mockable::DefaultClock;
use rstest::fixture;
use std::sync::Arc;
use taskly::{
    config::AppConfig,
    task::{
        adapters::memory::InMemoryTaskRepository,
        domain::{OwnerId, Task},
        services::{CreateTaskRequest, TaskLifecycleService},
    },
    web::{self, AppState},
};
use tower::ServiceExt;

/// Header the default configuration reads the owner from.
pub const OWNER_HEADER: &str = "x-owner-id";

/// Router plus direct access to the repository behind it.
pub struct TestApp {
    router: Router,
    service: TaskLifecycleService<InMemoryTaskRepository, DefaultClock>,
}

/// Provides an application over an empty in-memory repository.
#[fixture]
pub fn app() -> TestApp {
    let repository = Arc::new(InMemoryTaskRepository::new());
    let state = AppState::new(Arc::clone(&repository), &AppConfig::default())
        .expect("default configuration should build");
    TestApp {
        router: web::router(state),
        service: TaskLifecycleService::new(repository, Arc::new(DefaultClock)),
    }
}

/// Provides a fresh owner.
#[fixture]
pub fn owner() -> OwnerId {
    OwnerId::new()
}

impl TestApp {
    /// Stores a task due in `days` days, bypassing HTTP.
    pub async fn seed(&self, owner: OwnerId, title: &str, days: i64) -> Task {
        self.service
            .create(
                CreateTaskRequest::new(owner, title)
                    .with_do_before(Utc::now() + Duration::days(days)),
            )
            .await
            .expect("seeding should succeed")
    }

    /// Returns the service sharing this application's repository.
    pub const fn service(&self) -> &TaskLifecycleService<InMemoryTaskRepository, DefaultClock> {
        &self.service
    }

    /// Sends `request` through the router.
    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible")
    }

    /// Sends a `GET` as `owner`, or anonymously.
    pub async fn get(&self, path: &str, owner: Option<OwnerId>) -> Response<Body> {
        self.send(request(Method::GET, path, owner, None, Body::empty()))
            .await
    }

    /// Sends a URL-encoded form `POST`.
    pub async fn post_form(
        &self,
        path: &str,
        owner: Option<OwnerId>,
        body: &str,
    ) -> Response<Body> {
        self.send(request(
            Method::POST,
            path,
            owner,
            Some("application/x-www-form-urlencoded"),
            Body::from(body.to_owned()),
        ))
        .await
    }

    /// Sends a `POST` with a raw body and an optional content type.
    pub async fn post_raw(
        &self,
        path: &str,
        owner: Option<OwnerId>,
        content_type: Option<&str>,
        body: &str,
    ) -> Response<Body> {
        self.send(request(
            Method::POST,
            path,
            owner,
            content_type,
            Body::from(body.to_owned()),
        ))
        .await
    }

    /// Sends a JSON `POST`.
    pub async fn post_json(
        &self,
        path: &str,
        owner: Option<OwnerId>,
        body: &serde_json::Value,
    ) -> Response<Body> {
        self.send(request(
            Method::POST,
            path,
            owner,
            Some("application/json"),
            Body::from(body.to_string()),
        ))
        .await
    }
}

fn request(
    method: Method,
    path: &str,
    owner: Option<OwnerId>,
    content_type: Option<&str>,
    body: Body,
) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(path);
    if let Some(id) = owner {
        builder = builder.header(OWNER_HEADER, id.to_string());
    }
    if let Some(value) = content_type {
        builder = builder.header(header::CONTENT_TYPE, value);
    }
    builder.body(body).expect("request should build")
}

/// Reads the whole body as UTF-8.
pub async fn body_text(response: Response<Body>) -> String {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body should be readable")
        .to_bytes();
    String::from_utf8(bytes.to_vec()).expect("body should be UTF-8")
}

/// Reads the whole body as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    serde_json::from_str(&body_text(response).await).expect("body should be JSON")
}

/// Asserts a 303 redirect and returns its location.
pub fn redirect_location(response: &Response<Body>) -> String {
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|value| value.to_str().ok())
        .expect("redirect should carry a location")
        .to_owned()
}

/// Form-encodes a deadline `days` from now in the primary accepted format.
pub fn form_deadline(days: i64) -> String {
    (Utc::now() + Duration::days(days))
        .format("%Y-%m-%d+%H%%3A%M%%3A%S")
        .to_string()
}
