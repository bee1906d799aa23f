//! Shared handler state.

use super::{auth::AuthSettings, error::WebError, templates::Templates};
use crate::{
    config::AppConfig,
    task::{ports::TaskRepository, services::TaskLifecycleService},
};
use mockable::DefaultClock;
use std::sync::Arc;

/// Lifecycle service type used by the HTTP layer.
pub type WebTaskService<R> = TaskLifecycleService<R, DefaultClock>;

/// State shared by every route, generic over the task repository.
pub struct AppState<R>
where
    R: TaskRepository,
{
    service: WebTaskService<R>,
    templates: Arc<Templates>,
    auth: Arc<AuthSettings>,
}

impl<R> Clone for AppState<R>
where
    R: TaskRepository,
{
    fn clone(&self) -> Self {
        Self {
            service: self.service.clone(),
            templates: Arc::clone(&self.templates),
            auth: Arc::clone(&self.auth),
        }
    }
}

impl<R> AppState<R>
where
    R: TaskRepository,
{
    /// Builds state around `repository` using the wall clock.
    ///
    /// # Errors
    ///
    /// Returns [`WebError::Template`] when an embedded template fails to
    /// compile, and [`WebError::InvalidOwnerHeader`] when the configured
    /// header name is not a valid HTTP header.
    pub fn new(repository: Arc<R>, config: &AppConfig) -> Result<Self, WebError> {
        let auth = AuthSettings::new(&config.owner_header, &config.login_url)?;
        Ok(Self {
            service: TaskLifecycleService::new(repository, Arc::new(DefaultClock)),
            templates: Arc::new(Templates::load()?),
            auth: Arc::new(auth),
        })
    }

    /// Returns the lifecycle service.
    #[must_use]
    pub const fn service(&self) -> &WebTaskService<R> {
        &self.service
    }

    /// Returns the compiled templates.
    #[must_use]
    pub fn templates(&self) -> &Templates {
        &self.templates
    }

    /// Returns the authentication settings.
    #[must_use]
    pub fn auth(&self) -> &AuthSettings {
        &self.auth
    }
}
